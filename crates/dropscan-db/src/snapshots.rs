//! Append-only `product_snapshots` history.
//!
//! Every sweep inserts one row per enriched product. Nothing here updates
//! an existing row; the only removal path is [`delete_snapshots_older_than`].

use chrono::{DateTime, Utc};
use dropscan_core::{
    is_storable_price, Competitor, EnrichedProduct, Faq, RedditThread, SocialSignal,
};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::DbError;

/// A row from the `product_snapshots` table.
///
/// The list-valued signal columns are JSONB and come back as raw JSON.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductSnapshotRow {
    pub id: i64,
    pub scan_id: Uuid,
    pub identity_key: String,
    pub name: String,
    pub category: String,
    pub source: String,
    pub tier: String,
    pub is_synthetic: bool,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub velocity_score: i16,
    pub saturation_score: i16,
    pub demand_signal: String,
    pub weekly_growth: f64,
    pub reddit_mentions: i32,
    pub sentiment_score: i16,
    pub themes: serde_json::Value,
    pub social_signals: serde_json::Value,
    pub faqs: serde_json::Value,
    pub competitors: serde_json::Value,
    pub reddit_threads: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

const SNAPSHOT_COLUMNS: &str = "id, scan_id, identity_key, name, category, source, tier, \
     is_synthetic, price, image_url, velocity_score, saturation_score, demand_signal, \
     weekly_growth, reddit_mentions, sentiment_score, themes, social_signals, faqs, \
     competitors, reddit_threads, created_at";

/// Column values for one insert row.
struct NewSnapshot {
    identity_key: String,
    name: String,
    category: String,
    source: String,
    tier: String,
    is_synthetic: bool,
    price: Decimal,
    image_url: Option<String>,
    velocity_score: i16,
    saturation_score: i16,
    demand_signal: &'static str,
    weekly_growth: f64,
    reddit_mentions: i32,
    sentiment_score: i16,
    themes: Vec<String>,
    social_signals: Vec<SocialSignal>,
    faqs: Vec<Faq>,
    competitors: Vec<Competitor>,
    reddit_threads: Vec<RedditThread>,
}

impl NewSnapshot {
    fn from_product(product: &EnrichedProduct) -> Result<Self, DbError> {
        let listing = &product.listing;
        let signals = &product.signals;
        if !is_storable_price(listing.price) {
            return Err(DbError::InvalidPrice(listing.price));
        }
        let price = Decimal::try_from(listing.price)
            .map_err(|_| DbError::InvalidPrice(listing.price))?
            .round_dp(2);

        Ok(Self {
            identity_key: product.identity_key.clone(),
            name: listing.name.clone(),
            category: listing.category.clone(),
            source: listing.source.clone(),
            tier: listing.tier.clone(),
            is_synthetic: listing.is_synthetic(),
            price,
            image_url: listing.image_url.clone(),
            velocity_score: i16::from(signals.velocity_score),
            saturation_score: i16::from(signals.saturation_score),
            demand_signal: signals.demand_signal.as_str(),
            weekly_growth: signals.weekly_growth,
            reddit_mentions: i32::try_from(signals.reddit_mentions).unwrap_or(i32::MAX),
            sentiment_score: i16::from(signals.sentiment_score),
            themes: signals.themes.clone(),
            social_signals: signals.social_signals.clone(),
            faqs: signals.faqs.clone(),
            competitors: signals.competitors.clone(),
            reddit_threads: signals.reddit_threads.clone(),
        })
    }
}

/// Appends one snapshot row per product, all tagged with `scan_id`.
///
/// Products whose price cannot be stored as `NUMERIC(12,2)` are skipped and
/// logged; the rest go out as a single multi-row `INSERT`. Returns the
/// number of rows written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_product_snapshots(
    pool: &PgPool,
    scan_id: Uuid,
    products: &[EnrichedProduct],
) -> Result<u64, DbError> {
    let rows: Vec<NewSnapshot> = products
        .iter()
        .filter_map(|product| match NewSnapshot::from_product(product) {
            Ok(row) => Some(row),
            Err(e) => {
                tracing::warn!(
                    %scan_id,
                    identity_key = %product.identity_key,
                    error = %e,
                    "skipping snapshot with unstorable price"
                );
                None
            }
        })
        .collect();
    if rows.is_empty() {
        return Ok(0);
    }

    let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(
        "INSERT INTO product_snapshots (scan_id, identity_key, name, category, source, tier, \
         is_synthetic, price, image_url, velocity_score, saturation_score, demand_signal, \
         weekly_growth, reddit_mentions, sentiment_score, themes, social_signals, faqs, \
         competitors, reddit_threads) ",
    );
    qb.push_values(rows, |mut b, row| {
        b.push_bind(scan_id)
            .push_bind(row.identity_key)
            .push_bind(row.name)
            .push_bind(row.category)
            .push_bind(row.source)
            .push_bind(row.tier)
            .push_bind(row.is_synthetic)
            .push_bind(row.price)
            .push_bind(row.image_url)
            .push_bind(row.velocity_score)
            .push_bind(row.saturation_score)
            .push_bind(row.demand_signal)
            .push_bind(row.weekly_growth)
            .push_bind(row.reddit_mentions)
            .push_bind(row.sentiment_score)
            .push_bind(Json(row.themes))
            .push_bind(Json(row.social_signals))
            .push_bind(Json(row.faqs))
            .push_bind(Json(row.competitors))
            .push_bind(Json(row.reddit_threads));
    });

    let result = qb.build().execute(pool).await?;
    Ok(result.rows_affected())
}

/// The newest snapshot of each identity key, newest first.
///
/// `category` narrows the result to one category slug when given.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_latest_snapshots(
    pool: &PgPool,
    category: Option<&str>,
    limit: i64,
) -> Result<Vec<ProductSnapshotRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductSnapshotRow>(&format!(
        "SELECT {SNAPSHOT_COLUMNS} FROM ( \
             SELECT DISTINCT ON (identity_key) {SNAPSHOT_COLUMNS} \
             FROM product_snapshots \
             WHERE ($1::TEXT IS NULL OR category = $1) \
             ORDER BY identity_key, created_at DESC, id DESC \
         ) latest \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2"
    ))
    .bind(category)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Every stored snapshot of one identity key, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_snapshot_history(
    pool: &PgPool,
    identity_key: &str,
    limit: i64,
) -> Result<Vec<ProductSnapshotRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductSnapshotRow>(&format!(
        "SELECT {SNAPSHOT_COLUMNS} FROM product_snapshots \
         WHERE identity_key = $1 \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2"
    ))
    .bind(identity_key)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Deletes snapshots created more than `days` days ago. Returns rows removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_snapshots_older_than(pool: &PgPool, days: u32) -> Result<u64, DbError> {
    let days = i32::try_from(days).unwrap_or(i32::MAX);
    let result = sqlx::query(
        "DELETE FROM product_snapshots \
         WHERE created_at < NOW() - make_interval(days => $1)",
    )
    .bind(days)
    .execute(pool)
    .await?;

    let deleted = result.rows_affected();
    tracing::info!(days, deleted, "retention cleanup finished");
    Ok(deleted)
}
