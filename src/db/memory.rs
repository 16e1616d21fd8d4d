use anyhow::Result;
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use crate::db::backend::RecordSource;
use crate::models::{Record, RecordField};
use crate::query::{Predicate, Window};

/// Immutable in-process record snapshot
///
/// Records are sorted once on construction so every read sees the same order
/// the SQL backends produce.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    records: Arc<Vec<Record>>,
}

impl MemoryBackend {
    pub fn new(mut records: Vec<Record>) -> Self {
        records.sort_by(compare_records);
        Self {
            records: Arc::new(records),
        }
    }

    fn matching<'a>(&'a self, predicate: &'a Predicate) -> impl Iterator<Item = &'a Record> {
        self.records.iter().filter(move |r| predicate.matches(r))
    }
}

/// Member id then family id, byte-wise, with missing values last
fn compare_records(a: &Record, b: &Record) -> Ordering {
    compare_key(a.member_id.as_deref(), b.member_id.as_deref())
        .then_with(|| compare_key(a.family_id.as_deref(), b.family_id.as_deref()))
}

fn compare_key(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.as_bytes().cmp(b.as_bytes()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[async_trait]
impl RecordSource for MemoryBackend {
    async fn count_all(&self) -> Result<u64> {
        Ok(self.records.len() as u64)
    }

    async fn count_matching(&self, predicate: &Predicate) -> Result<u64> {
        Ok(self.matching(predicate).count() as u64)
    }

    async fn distinct_count(&self, predicate: &Predicate, field: RecordField) -> Result<u64> {
        let distinct: HashSet<&str> = self
            .matching(predicate)
            .filter_map(|r| r.get(field))
            .filter(|v| !v.is_empty())
            .collect();
        Ok(distinct.len() as u64)
    }

    async fn query_filtered(&self, predicate: &Predicate, window: Window) -> Result<Vec<Record>> {
        let matching: Vec<&Record> = self.matching(predicate).collect();
        let range = window.range(matching.len());
        Ok(matching[range].iter().map(|r| (*r).clone()).collect())
    }

    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
