//! Name-seeded market signals.
//!
//! Every field is drawn from one generator seeded by the product name, in the
//! order the fields are declared below. Reordering or inserting a draw
//! changes every field after it, so new fields go at the end.
//!
//! Draw order:
//! 1. velocity score
//! 2. saturation score
//! 3. weekly growth
//! 4. reddit mentions
//! 5. sentiment score
//! 6. themes
//! 7. social signals
//! 8. FAQs
//! 9. competitors
//! 10. reddit threads

use dropscan_core::{
    identity_key, normalized_name, Competitor, DemandSignal, EnrichedProduct, Faq, MarketSignals,
    RawListing, RedditComment, RedditThread, SocialSignal,
};
use rand::seq::IndexedRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::seed::seeded_rng;

/// Price multipliers of the four synthetic comparables, cheapest first.
pub const COMPETITOR_PRICE_RATIOS: [f64; 4] = [0.75, 0.95, 1.10, 1.35];

const THEMES: &[&str] = &[
    "Great value for money",
    "Fast shipping",
    "Build quality",
    "Easy to use",
    "Giftable",
    "Compact design",
    "Battery life",
    "Looks premium",
    "Sizing runs small",
    "Instructions unclear",
];

const FAQ_TEMPLATES: &[(&str, &str)] = &[
    (
        "How long does shipping take for {name}?",
        "Most orders arrive within {days} business days.",
    ),
    (
        "Is {name} covered by a return policy?",
        "Returns are accepted within {window} days of delivery.",
    ),
    (
        "Does {name} come with a warranty?",
        "A limited warranty covers manufacturing defects.",
    ),
    (
        "Can {name} be shipped internationally?",
        "Yes, most suppliers ship worldwide with tracking.",
    ),
    (
        "Is {name} suitable as a gift?",
        "It ships in retail packaging that works well for gifting.",
    ),
    (
        "What is included with {name}?",
        "The listing includes the main unit and basic accessories.",
    ),
];

const RETURN_WINDOWS: &[u32] = &[14, 30, 60];

const COMPETITOR_BRANDS: &[&str] = &[
    "ProChoice", "Nexa", "Lumio", "Vanta", "Orbi", "Kivo", "Zenly", "Aurix",
];

const COMPETITOR_MARKETPLACES: &[&str] = &[
    "Amazon",
    "Temu",
    "AliExpress",
    "Walmart",
    "eBay",
    "Etsy",
    "Shein",
];

const SUBREDDITS: &[&str] = &[
    "r/dropship",
    "r/ecommerce",
    "r/shopify",
    "r/BuyItForLife",
    "r/gadgets",
    "r/AmazonFBA",
    "r/Entrepreneur",
];

const THREAD_TITLES: &[&str] = &[
    "Anyone tried selling {name}?",
    "Is {name} worth it or just hype?",
    "{name} keeps showing up in my feed",
    "Margins on {name} after ad spend",
    "Honest review: {name} after a month",
];

const COMMENT_BODIES: &[&str] = &[
    "Sold a few hundred last quarter, returns were low.",
    "Ad costs ate most of the margin for me.",
    "Quality varies a lot between suppliers, order samples first.",
    "Works fine, but shipping took almost three weeks.",
    "Saw it go viral on TikTok, demand dropped after a month.",
];

const HANDLE_PREFIXES: &[&str] = &[
    "shopper", "dropdad", "fba_grind", "cartqueen", "dealhunter", "storeowner",
];

/// Maps listings to [`EnrichedProduct`]s.
///
/// Holds no state; every call builds and drops its own generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnrichmentEngine;

impl EnrichmentEngine {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn enrich(&self, listing: &RawListing) -> EnrichedProduct {
        EnrichedProduct {
            identity_key: identity_key(&listing.name),
            listing: listing.clone(),
            signals: self.signals(&listing.name, listing.price),
        }
    }

    /// Market signals for `name`. `price` only scales competitor prices.
    #[must_use]
    pub fn signals(&self, name: &str, price: f64) -> MarketSignals {
        let name = normalized_name(name);
        let mut rng = seeded_rng(name);

        let velocity_score: u8 = rng.random_range(50..=99);
        let saturation_score: u8 = rng.random_range(10..=60);
        let weekly_growth = f64::from(rng.random_range(5_u32..=450)) / 10.0;
        let reddit_mentions: u32 = rng.random_range(20..=2_400);
        let sentiment_score: u8 = rng.random_range(60..=95);
        let themes = draw_themes(&mut rng);
        let social_signals = draw_social_signals(&mut rng);
        let faqs = draw_faqs(&mut rng, name);
        let competitors = draw_competitors(&mut rng, name, price);
        let reddit_threads = draw_threads(&mut rng, name);

        MarketSignals {
            velocity_score,
            saturation_score,
            demand_signal: demand_signal(velocity_score, saturation_score),
            weekly_growth,
            reddit_mentions,
            sentiment_score,
            themes,
            social_signals,
            faqs,
            competitors,
            reddit_threads,
        }
    }
}

/// Fast-moving and not yet crowded.
#[must_use]
pub fn demand_signal(velocity_score: u8, saturation_score: u8) -> DemandSignal {
    if velocity_score >= 70 && saturation_score <= 40 {
        DemandSignal::Bullish
    } else {
        DemandSignal::Caution
    }
}

fn pick<'a>(rng: &mut ChaCha8Rng, items: &'a [&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

fn draw_themes(rng: &mut ChaCha8Rng) -> Vec<String> {
    THEMES
        .choose_multiple(rng, 3)
        .map(|t| (*t).to_string())
        .collect()
}

fn draw_social_signals(rng: &mut ChaCha8Rng) -> Vec<SocialSignal> {
    let count = rng.random_range(2..=4);
    SocialSignal::ALL.choose_multiple(rng, count).copied().collect()
}

fn draw_faqs(rng: &mut ChaCha8Rng, name: &str) -> Vec<Faq> {
    let templates: Vec<(&str, &str)> = FAQ_TEMPLATES.choose_multiple(rng, 3).copied().collect();
    let days: u32 = rng.random_range(5..=14);
    let window = RETURN_WINDOWS.choose(rng).copied().unwrap_or(30);

    templates
        .into_iter()
        .map(|(q, a)| Faq {
            question: q.replace("{name}", name),
            answer: a
                .replace("{days}", &days.to_string())
                .replace("{window}", &window.to_string()),
        })
        .collect()
}

fn draw_competitors(rng: &mut ChaCha8Rng, name: &str, price: f64) -> Vec<Competitor> {
    COMPETITOR_PRICE_RATIOS
        .iter()
        .map(|&ratio| {
            let brand = pick(rng, COMPETITOR_BRANDS);
            let marketplace = pick(rng, COMPETITOR_MARKETPLACES);
            let rating = f64::from(rng.random_range(35_u32..=49)) / 10.0;
            let reviews = rng.random_range(50..=12_000);
            Competitor {
                name: format!("{brand} {name}"),
                marketplace: marketplace.to_string(),
                price_ratio: ratio,
                price: round_cents(price * ratio),
                rating,
                reviews,
            }
        })
        .collect()
}

fn draw_threads(rng: &mut ChaCha8Rng, name: &str) -> Vec<RedditThread> {
    let count = rng.random_range(3..=5);
    (0..count)
        .map(|_| {
            let subreddit = pick(rng, SUBREDDITS).to_string();
            let title = pick(rng, THREAD_TITLES).replace("{name}", name);
            let author = handle(rng);
            let upvotes = rng.random_range(5..=2_500);
            let comment_count = rng.random_range(2..=340);
            let top_comment = RedditComment {
                author: handle(rng),
                body: pick(rng, COMMENT_BODIES).to_string(),
                upvotes: rng.random_range(1..=upvotes),
            };
            RedditThread {
                subreddit,
                title,
                author,
                upvotes,
                comment_count,
                top_comment,
            }
        })
        .collect()
}

fn handle(rng: &mut ChaCha8Rng) -> String {
    let prefix = pick(rng, HANDLE_PREFIXES);
    let suffix: u32 = rng.random_range(10..=9_999);
    format!("u/{prefix}_{suffix}")
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
#[path = "enrich_test.rs"]
mod tests;
