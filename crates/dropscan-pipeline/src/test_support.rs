//! Fake adapters and stores shared by the pipeline's unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use dropscan_core::{EnrichedProduct, RawListing, SnapshotStore, StoreError};
use dropscan_scraper::{AdapterFailure, SourceAdapter, Tier, TrendingSource};
use uuid::Uuid;

pub(crate) fn listing(name: &str, price: f64, source: &str, category: &str) -> RawListing {
    RawListing::new(name, price, None, source, category).expect("valid test listing")
}

/// Returns `per_call` fresh listings per search, named after the query.
pub(crate) struct FixedAdapter {
    id: String,
    per_call: usize,
    pub(crate) calls: AtomicUsize,
    pub(crate) limits: Mutex<Vec<usize>>,
}

impl FixedAdapter {
    pub(crate) fn new(id: &str, per_call: usize) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            per_call,
            calls: AtomicUsize::new(0),
            limits: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl SourceAdapter for FixedAdapter {
    fn source_id(&self) -> &str {
        &self.id
    }

    async fn search(
        &self,
        query: &str,
        category: &str,
        limit: usize,
    ) -> Result<Vec<RawListing>, AdapterFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.limits.lock().unwrap().push(limit);
        Ok((0..self.per_call.min(limit))
            .map(|i| listing(&format!("{} {query} #{i}", self.id), 10.0 + i as f64, &self.id, category))
            .collect())
    }
}

/// Returns a fixed list regardless of query or limit.
pub(crate) struct ListAdapter {
    id: String,
    listings: Vec<RawListing>,
    delay: Duration,
}

impl ListAdapter {
    pub(crate) fn new(id: &str, listings: Vec<RawListing>) -> Arc<Self> {
        Self::delayed(id, listings, Duration::ZERO)
    }

    pub(crate) fn delayed(id: &str, listings: Vec<RawListing>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            listings,
            delay,
        })
    }
}

#[async_trait]
impl SourceAdapter for ListAdapter {
    fn source_id(&self) -> &str {
        &self.id
    }

    async fn search(
        &self,
        _query: &str,
        _category: &str,
        _limit: usize,
    ) -> Result<Vec<RawListing>, AdapterFailure> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.listings.clone())
    }
}

pub(crate) struct FailingAdapter {
    failure: AdapterFailure,
    pub(crate) calls: AtomicUsize,
}

impl FailingAdapter {
    pub(crate) fn new(failure: AdapterFailure) -> Arc<Self> {
        Arc::new(Self {
            failure,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl SourceAdapter for FailingAdapter {
    fn source_id(&self) -> &str {
        "failing"
    }

    async fn search(
        &self,
        _query: &str,
        _category: &str,
        _limit: usize,
    ) -> Result<Vec<RawListing>, AdapterFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.failure.clone())
    }
}

pub(crate) fn tier(name: &str, adapter: Arc<dyn SourceAdapter>) -> Tier {
    Tier::new(name, adapter, Duration::from_secs(5))
}

/// Records every batch; optionally rejects the batches at the given call indices.
#[derive(Default)]
pub(crate) struct RecordingStore {
    pub(crate) batches: Mutex<Vec<(Uuid, Vec<EnrichedProduct>)>>,
    reject_calls: Vec<usize>,
    calls: AtomicUsize,
}

impl RecordingStore {
    pub(crate) fn rejecting(reject_calls: Vec<usize>) -> Self {
        Self {
            reject_calls,
            ..Self::default()
        }
    }

    pub(crate) fn stored(&self) -> Vec<EnrichedProduct> {
        self.batches
            .lock()
            .unwrap()
            .iter()
            .flat_map(|(_, b)| b.iter().cloned())
            .collect()
    }

    pub(crate) fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().iter().map(|(_, b)| b.len()).collect()
    }
}

#[async_trait]
impl SnapshotStore for RecordingStore {
    async fn insert_batch(
        &self,
        scan_id: Uuid,
        products: &[EnrichedProduct],
    ) -> Result<usize, StoreError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_calls.contains(&call) {
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }
        self.batches
            .lock()
            .unwrap()
            .push((scan_id, products.to_vec()));
        Ok(products.len())
    }
}

pub(crate) struct FixedTrends(pub(crate) Vec<String>);

#[async_trait]
impl TrendingSource for FixedTrends {
    async fn trending_keywords(&self, limit: usize) -> Vec<String> {
        self.0.iter().take(limit).cloned().collect()
    }
}
