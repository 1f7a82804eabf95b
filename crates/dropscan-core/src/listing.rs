use serde::{Deserialize, Serialize};

/// Tier name stamped on listings fabricated by the synthetic generator.
pub const SYNTHETIC_TIER: &str = "synthetic";

/// Smallest price that survives rounding to cents.
pub const MIN_PRICE: f64 = 0.01;

/// Largest price a `NUMERIC(12,2)` snapshot column holds.
pub const MAX_PRICE: f64 = 9_999_999_999.99;

/// Whether `price` can be stored on a snapshot unchanged in meaning.
#[must_use]
pub fn is_storable_price(price: f64) -> bool {
    price.is_finite() && (MIN_PRICE..=MAX_PRICE).contains(&price)
}

/// One search to run against the cascade.
///
/// `target_count` is the number of listings wanted; `hard_cap` is the
/// ceiling that is never exceeded, real or synthetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub text: String,
    pub category: String,
    pub target_count: usize,
    pub hard_cap: usize,
}

impl Query {
    /// Builds a query, raising `hard_cap` to `target_count` if it was set lower.
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        category: impl Into<String>,
        target_count: usize,
        hard_cap: usize,
    ) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
            target_count,
            hard_cap: hard_cap.max(target_count),
        }
    }
}

/// A product listing as returned by a source adapter or the synthetic generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    pub name: String,
    pub price: f64,
    pub image_url: Option<String>,
    /// Marketplace or store the listing came from (e.g. `shopify:example.com`).
    pub source: String,
    /// Cascade tier that produced the listing. Set by the resolver.
    pub tier: String,
    pub category: String,
}

impl RawListing {
    /// Builds a listing, returning `None` when the name is blank or the price
    /// falls outside [`MIN_PRICE`]..=[`MAX_PRICE`].
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        price: f64,
        image_url: Option<String>,
        source: impl Into<String>,
        category: impl Into<String>,
    ) -> Option<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() || !is_storable_price(price) {
            return None;
        }
        Some(Self {
            name,
            price,
            image_url: image_url.filter(|u| !u.trim().is_empty()),
            source: source.into(),
            tier: String::new(),
            category: category.into(),
        })
    }

    #[must_use]
    pub fn is_acceptable(&self) -> bool {
        !self.name.trim().is_empty() && is_storable_price(self.price)
    }

    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.tier == SYNTHETIC_TIER
    }

    #[must_use]
    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = tier.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_raises_hard_cap_to_target() {
        let q = Query::new("desk lamp", "home-kitchen", 40, 10);
        assert_eq!(q.hard_cap, 40);
    }

    #[test]
    fn listing_rejects_non_positive_price() {
        assert!(RawListing::new("Lamp", 0.0, None, "shop", "home").is_none());
        assert!(RawListing::new("Lamp", -3.0, None, "shop", "home").is_none());
        assert!(RawListing::new("Lamp", f64::NAN, None, "shop", "home").is_none());
    }

    #[test]
    fn listing_rejects_prices_that_round_to_zero_or_overflow_cents() {
        assert!(RawListing::new("Penny Sticker", 0.004, None, "shop", "home").is_none());
        assert!(RawListing::new("Yacht", 1e10, None, "shop", "home").is_none());
        assert!(RawListing::new("Sticker", MIN_PRICE, None, "shop", "home").is_some());
        assert!(RawListing::new("Island", MAX_PRICE, None, "shop", "home").is_some());
    }

    #[test]
    fn hand_built_listing_with_sub_cent_price_is_not_acceptable() {
        let mut listing = RawListing::new("Sticker", 1.0, None, "shop", "home").unwrap();
        listing.price = 0.004;
        assert!(!listing.is_acceptable());
    }

    #[test]
    fn listing_rejects_blank_name() {
        assert!(RawListing::new("   ", 9.99, None, "shop", "home").is_none());
    }

    #[test]
    fn listing_trims_name_and_drops_blank_image() {
        let listing =
            RawListing::new("  Lamp  ", 9.99, Some(" ".to_string()), "shop", "home").unwrap();
        assert_eq!(listing.name, "Lamp");
        assert!(listing.image_url.is_none());
        assert!(!listing.is_synthetic());
    }

    #[test]
    fn with_tier_marks_synthetic() {
        let listing = RawListing::new("Lamp", 9.99, None, "synthetic:temu", "home")
            .unwrap()
            .with_tier(SYNTHETIC_TIER);
        assert!(listing.is_synthetic());
    }
}
