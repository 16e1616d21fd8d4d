use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Record, RecordField};
use crate::query::{Predicate, Window};

/// Read-only store of beneficiary records
///
/// Implementations own their connection handling; failures are returned as-is,
/// never retried here.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Count every record, ignoring filters
    async fn count_all(&self) -> Result<u64>;

    /// Count records matching the predicate
    async fn count_matching(&self, predicate: &Predicate) -> Result<u64>;

    /// Count distinct non-empty values of `field` among matching records
    async fn distinct_count(&self, predicate: &Predicate, field: RecordField) -> Result<u64>;

    /// Fetch one window of matching records, ordered by member id then family id
    async fn query_filtered(&self, predicate: &Predicate, window: Window) -> Result<Vec<Record>>;

    /// Test database connection
    async fn test_connection(&self) -> Result<()>;

    /// Short backend identifier for health reporting
    fn backend_name(&self) -> &'static str;
}
