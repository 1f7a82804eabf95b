//! Enriched product model.
//!
//! An [`EnrichedProduct`] is a [`RawListing`] plus a block of market signals
//! derived from the product name alone. The identity key is the first
//! 16 bytes of the SHA-256 of the normalized name, hex encoded.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::listing::RawListing;

/// Identity substituted for blank product names before hashing.
pub const PLACEHOLDER_NAME: &str = "unnamed-product";

/// Trim a product name, substituting [`PLACEHOLDER_NAME`] when nothing is left.
#[must_use]
pub fn normalized_name(name: &str) -> &str {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        PLACEHOLDER_NAME
    } else {
        trimmed
    }
}

/// Stable identity key for a product name.
#[must_use]
pub fn identity_key(name: &str) -> String {
    let digest = Sha256::digest(normalized_name(name).as_bytes());
    digest[..16].iter().map(|b| format!("{b:02x}")).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemandSignal {
    Bullish,
    Caution,
}

impl DemandSignal {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DemandSignal::Bullish => "bullish",
            DemandSignal::Caution => "caution",
        }
    }
}

impl std::fmt::Display for DemandSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed vocabulary of social-platform signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialSignal {
    TiktokViral,
    InstagramReels,
    YoutubeReviews,
    PinterestSaves,
    RedditBuzz,
    FacebookAds,
}

impl SocialSignal {
    pub const ALL: [SocialSignal; 6] = [
        SocialSignal::TiktokViral,
        SocialSignal::InstagramReels,
        SocialSignal::YoutubeReviews,
        SocialSignal::PinterestSaves,
        SocialSignal::RedditBuzz,
        SocialSignal::FacebookAds,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SocialSignal::TiktokViral => "Trending on TikTok",
            SocialSignal::InstagramReels => "Featured in Instagram Reels",
            SocialSignal::YoutubeReviews => "YouTube review coverage",
            SocialSignal::PinterestSaves => "High Pinterest saves",
            SocialSignal::RedditBuzz => "Active Reddit discussion",
            SocialSignal::FacebookAds => "Running Facebook ads",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

/// A synthetic comparable listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,
    pub marketplace: String,
    /// Multiplier applied to the listing price (one of 0.75, 0.95, 1.10, 1.35).
    pub price_ratio: f64,
    pub price: f64,
    pub rating: f64,
    pub reviews: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedditComment {
    pub author: String,
    pub body: String,
    pub upvotes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedditThread {
    pub subreddit: String,
    pub title: String,
    pub author: String,
    pub upvotes: u32,
    pub comment_count: u32,
    pub top_comment: RedditComment,
}

/// Market signals derived deterministically from a product name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSignals {
    /// In `[50, 99]`.
    pub velocity_score: u8,
    /// In `[10, 60]`.
    pub saturation_score: u8,
    pub demand_signal: DemandSignal,
    /// Percent, one decimal place.
    pub weekly_growth: f64,
    pub reddit_mentions: u32,
    /// In `[60, 95]`.
    pub sentiment_score: u8,
    pub themes: Vec<String>,
    pub social_signals: Vec<SocialSignal>,
    pub faqs: Vec<Faq>,
    pub competitors: Vec<Competitor>,
    pub reddit_threads: Vec<RedditThread>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedProduct {
    pub identity_key: String,
    #[serde(flatten)]
    pub listing: RawListing,
    #[serde(flatten)]
    pub signals: MarketSignals,
}
