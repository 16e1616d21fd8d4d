use anyhow::Result;
use async_trait::async_trait;
use std::time::Instant;

use crate::db::{Database, RecordSource};
use crate::metrics::registry::{DATABASE_QUERIES_TOTAL, DATABASE_QUERY_DURATION_SECONDS};
use crate::models::{Record, RecordField};
use crate::query::{Predicate, Window};

/// A thin wrapper around a RecordSource that records Prometheus metrics
/// for query counts and durations.
pub struct InstrumentedSource {
    inner: Database,
}

impl InstrumentedSource {
    pub fn new(inner: Database) -> Self {
        Self { inner }
    }

    fn observe(&self, query_type: &'static str, start: Instant) {
        let seconds = start.elapsed().as_secs_f64();
        DATABASE_QUERIES_TOTAL
            .with_label_values(&[query_type])
            .inc();
        DATABASE_QUERY_DURATION_SECONDS
            .with_label_values(&[query_type])
            .observe(seconds);
    }
}

#[async_trait]
impl RecordSource for InstrumentedSource {
    async fn count_all(&self) -> Result<u64> {
        let start = Instant::now();
        let res = self.inner.count_all().await;
        self.observe("count_all", start);
        res
    }

    async fn count_matching(&self, predicate: &Predicate) -> Result<u64> {
        let start = Instant::now();
        let res = self.inner.count_matching(predicate).await;
        self.observe("count", start);
        res
    }

    async fn distinct_count(&self, predicate: &Predicate, field: RecordField) -> Result<u64> {
        let start = Instant::now();
        let res = self.inner.distinct_count(predicate, field).await;
        self.observe("distinct_count", start);
        res
    }

    async fn query_filtered(&self, predicate: &Predicate, window: Window) -> Result<Vec<Record>> {
        let start = Instant::now();
        let res = self.inner.query_filtered(predicate, window).await;
        self.observe("select", start);
        res
    }

    async fn test_connection(&self) -> Result<()> {
        let start = Instant::now();
        let res = self.inner.test_connection().await;
        self.observe("ping", start);
        res
    }

    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }
}
