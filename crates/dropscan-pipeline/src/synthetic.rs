//! Deterministic placeholder listings for categories that real sources
//! under-deliver.
//!
//! Listing `i` of a category is a pure function of `(category slug, i)`:
//! its generator is seeded from `"{slug}:{i}"` and dropped when the listing
//! is built.

use std::collections::HashMap;

use dropscan_core::{Category, RawListing, SYNTHETIC_TIER};
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::seed::seeded_rng;

struct Marketplace {
    id: &'static str,
    adjectives: &'static [&'static str],
}

const MARKETPLACES: &[Marketplace] = &[
    Marketplace {
        id: "temu",
        adjectives: &["Trending", "Viral", "Budget", "Bestselling"],
    },
    Marketplace {
        id: "aliexpress",
        adjectives: &["Upgraded", "Portable", "Multifunctional", "Smart"],
    },
    Marketplace {
        id: "shein",
        adjectives: &["Aesthetic", "Cute", "Minimalist", "Chic"],
    },
    Marketplace {
        id: "amazon",
        adjectives: &["Premium", "Professional", "Heavy-Duty", "Top-Rated"],
    },
    Marketplace {
        id: "walmart",
        adjectives: &["Everyday", "Value", "Family-Size", "Essential"],
    },
    Marketplace {
        id: "etsy",
        adjectives: &["Handmade", "Custom", "Vintage-Style", "Personalized"],
    },
];

/// Vocabulary for slugs with no registered category.
const FALLBACK_KEYWORDS: &[&str] = &[
    "Gadget",
    "Organizer",
    "Accessory Kit",
    "Storage Set",
    "Multi-Tool",
    "Travel Case",
];

const MIN_PRICE_DOLLARS: u32 = 4;
const MAX_PRICE_DOLLARS: u32 = 89;
const YEARS: std::ops::RangeInclusive<u16> = 2024..=2026;

#[derive(Debug, Clone, Default)]
pub struct SyntheticGenerator {
    vocabularies: HashMap<String, Vec<String>>,
}

impl SyntheticGenerator {
    /// Indexes each category's keyword vocabulary by slug.
    #[must_use]
    pub fn new(categories: &[Category]) -> Self {
        let vocabularies = categories
            .iter()
            .filter(|c| !c.keywords.is_empty())
            .map(|c| (c.slug.clone(), c.keywords.clone()))
            .collect();
        Self { vocabularies }
    }

    /// Listings `start..start + n` for `category`.
    ///
    /// Every listing has `tier = "synthetic"` and
    /// `source = "synthetic:{marketplace}"`.
    #[must_use]
    pub fn generate(&self, category: &str, start: usize, n: usize) -> Vec<RawListing> {
        (start..start + n)
            .filter_map(|i| self.listing_at(category, i))
            .collect()
    }

    fn listing_at(&self, category: &str, index: usize) -> Option<RawListing> {
        let mut rng = seeded_rng(&format!("{category}:{index}"));

        let marketplace = MARKETPLACES.choose(&mut rng)?;
        let adjective = marketplace.adjectives.choose(&mut rng)?;
        let keyword = match self.vocabularies.get(category) {
            Some(words) => words.choose(&mut rng)?.as_str(),
            None => *FALLBACK_KEYWORDS.choose(&mut rng)?,
        };
        let dollars = rng.random_range(MIN_PRICE_DOLLARS..=MAX_PRICE_DOLLARS);
        let year = rng.random_range(YEARS);

        let name = format!("{adjective} {keyword} {year}");
        let price = f64::from(dollars * 100 + 99) / 100.0;

        RawListing::new(
            name,
            price,
            None,
            format!("synthetic:{}", marketplace.id),
            category,
        )
        .map(|l| l.with_tier(SYNTHETIC_TIER))
    }
}
