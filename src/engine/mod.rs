//! Filtered query engine.
//!
//! Every read goes through the same [`Predicate`] built from a [`FilterSet`], so a
//! summary always describes exactly the rows a caller can page through.

pub mod error;

pub use error::EngineError;

use tracing::{debug, error, info};

use crate::db::Database;
use crate::metrics::registry::{ENGINE_REQUESTS_TOTAL, RECORDS_TOTAL};
use crate::models::{FieldMap, Record, RecordField, Summary};
use crate::query::{FilterSet, Predicate, QueryLimits, QueryValidator};

pub struct QueryEngine {
    db: Database,
    validator: QueryValidator,
}

impl QueryEngine {
    pub fn new(db: Database, limits: QueryLimits) -> Self {
        Self {
            db,
            validator: QueryValidator::new(limits),
        }
    }

    pub fn limits(&self) -> &QueryLimits {
        self.validator.limits()
    }

    pub fn backend_name(&self) -> &'static str {
        self.db.backend_name()
    }

    pub async fn test_connection(&self) -> Result<(), EngineError> {
        self.db.test_connection().await.map_err(EngineError::from)
    }

    /// Unfiltered record count
    pub async fn get_total(&self) -> Result<u64, EngineError> {
        let result = self.db.count_all().await.map_err(EngineError::from);
        if let Ok(total) = &result {
            RECORDS_TOTAL.set(i64::try_from(*total).unwrap_or(i64::MAX));
        }
        record_outcome("total", result)
    }

    /// One page of matching records as column-keyed field maps
    pub async fn get_page(
        &self,
        filters: &FilterSet,
        page: u64,
        page_size: u64,
    ) -> Result<Vec<FieldMap>, EngineError> {
        let result = self
            .fetch_page(filters, page, page_size, Record::into_field_map)
            .await;
        record_outcome("page", result)
    }

    /// One page of matching records as typed entities
    pub async fn get_records(
        &self,
        filters: &FilterSet,
        page: u64,
        page_size: u64,
    ) -> Result<Vec<Record>, EngineError> {
        let result = self.fetch_page(filters, page, page_size, |r| r).await;
        record_outcome("records", result)
    }

    /// Member and family counts over the filtered set
    pub async fn get_summary(&self, filters: &FilterSet) -> Result<Summary, EngineError> {
        let result = self.summarize(filters).await;
        record_outcome("summary", result)
    }

    async fn fetch_page<T>(
        &self,
        filters: &FilterSet,
        page: u64,
        page_size: u64,
        shape: impl Fn(Record) -> T,
    ) -> Result<Vec<T>, EngineError> {
        let predicate = self.predicate(filters)?;
        let request = self.validator.page_request(page, page_size)?;

        debug!(
            "Fetching page {} (page_size={}) with {} conditions",
            request.page(),
            request.page_size(),
            predicate.conditions().len()
        );

        let records = self
            .db
            .query_filtered(&predicate, request.window())
            .await
            .map_err(|e| {
                error!("Paged read failed: {:#}", e);
                EngineError::Source(e)
            })?;

        debug!("Page {} returned {} records", request.page(), records.len());
        Ok(records.into_iter().map(shape).collect())
    }

    async fn summarize(&self, filters: &FilterSet) -> Result<Summary, EngineError> {
        let predicate = self.predicate(filters)?;
        let approved = predicate.clone().approved();

        let (total_members, total_families, covered_members, covered_families) = tokio::try_join!(
            self.db.count_matching(&predicate),
            self.db.distinct_count(&predicate, RecordField::FamilyId),
            self.db.count_matching(&approved),
            self.db.distinct_count(&approved, RecordField::FamilyId),
        )
        .map_err(|e| {
            error!("Summary query failed: {:#}", e);
            EngineError::Source(e)
        })?;

        let summary = Summary {
            total_members,
            total_families,
            covered_members,
            covered_families,
        };
        info!("Summary computed: {:?}", summary);
        Ok(summary)
    }

    fn predicate(&self, filters: &FilterSet) -> Result<Predicate, EngineError> {
        self.validator
            .validate_filters(filters)
            .map_err(|e| EngineError::Validation(e.to_string()))?;
        Ok(filters.predicate())
    }
}

fn record_outcome<T>(operation: &str, result: Result<T, EngineError>) -> Result<T, EngineError> {
    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) if e.is_validation() => "invalid",
        Err(_) => "error",
    };
    ENGINE_REQUESTS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryBackend;
    use anyhow::bail;
    use async_trait::async_trait;
    use std::sync::Arc;

    fn member(family: &str, member: &str, status: &str) -> Record {
        Record {
            family_id: Some(family.to_string()),
            member_id: Some(member.to_string()),
            name: Some(format!("Member {}", member)),
            member_card_status: Some(status.to_string()),
            ..Default::default()
        }
    }

    fn engine(records: Vec<Record>) -> QueryEngine {
        let db = Arc::new(MemoryBackend::new(records)) as Database;
        QueryEngine::new(db, QueryLimits::default())
    }

    fn three_member_engine() -> QueryEngine {
        engine(vec![
            member("F1", "M1", "Approved"),
            member("F1", "M2", "Pending"),
            member("F2", "M3", "Approved"),
        ])
    }

    #[tokio::test]
    async fn test_unfiltered_summary() {
        let summary = three_member_engine()
            .get_summary(&FilterSet::default())
            .await
            .unwrap();

        assert_eq!(
            summary,
            Summary {
                total_members: 3,
                total_families: 2,
                covered_members: 2,
                covered_families: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_member_status_filter_applies_to_page_and_summary() {
        let engine = three_member_engine();
        let filters = FilterSet {
            member_status: Some("Approved".to_string()),
            ..Default::default()
        };

        let page = engine.get_records(&filters, 1, 10).await.unwrap();
        let ids: Vec<&str> = page.iter().filter_map(|r| r.member_id.as_deref()).collect();
        assert_eq!(ids, vec!["M1", "M3"]);

        let summary = engine.get_summary(&filters).await.unwrap();
        assert_eq!(
            summary,
            Summary {
                total_members: 2,
                total_families: 2,
                covered_members: 2,
                covered_families: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_second_page_holds_remaining_record() {
        let page = three_member_engine()
            .get_records(&FilterSet::default(), 2, 2)
            .await
            .unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(page[0].member_id.as_deref(), Some("M3"));
    }

    #[tokio::test]
    async fn test_page_past_end_is_empty() {
        let engine = three_member_engine();
        assert!(engine
            .get_page(&FilterSet::default(), 5, 10)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_invalid_paging_is_rejected() {
        let engine = three_member_engine();

        let err = engine
            .get_page(&FilterSet::default(), 0, 10)
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let err = engine
            .get_records(&FilterSet::default(), 1, 0)
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let too_large = engine.limits().max_page_size + 1;
        let err = engine
            .get_page(&FilterSet::default(), 1, too_large)
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_field_maps_and_records_describe_same_rows() {
        let engine = three_member_engine();
        let filters = FilterSet {
            search: Some("member".to_string()),
            ..Default::default()
        };

        let maps = engine.get_page(&filters, 1, 2).await.unwrap();
        let records = engine.get_records(&filters, 1, 2).await.unwrap();

        let expected: Vec<FieldMap> = records.into_iter().map(Record::into_field_map).collect();
        assert_eq!(maps, expected);
    }

    #[tokio::test]
    async fn test_covered_family_counts_only_filtered_members() {
        let engine = engine(vec![
            Record {
                block: Some("Agra".to_string()),
                ..member("F1", "M1", "Pending")
            },
            Record {
                block: Some("Bah".to_string()),
                ..member("F1", "M2", "Approved")
            },
        ]);
        let filters = FilterSet {
            block: Some("agra".to_string()),
            ..Default::default()
        };

        let summary = engine.get_summary(&filters).await.unwrap();
        assert_eq!(summary.total_families, 1);
        assert_eq!(summary.covered_families, 0);
    }

    #[tokio::test]
    async fn test_get_total_ignores_filters_and_counts_all() {
        assert_eq!(three_member_engine().get_total().await.unwrap(), 3);
    }

    struct FailingSource;

    #[async_trait]
    impl crate::db::RecordSource for FailingSource {
        async fn count_all(&self) -> anyhow::Result<u64> {
            bail!("connection refused")
        }

        async fn count_matching(&self, _predicate: &Predicate) -> anyhow::Result<u64> {
            bail!("connection refused")
        }

        async fn distinct_count(
            &self,
            _predicate: &Predicate,
            _field: RecordField,
        ) -> anyhow::Result<u64> {
            bail!("connection refused")
        }

        async fn query_filtered(
            &self,
            _predicate: &Predicate,
            _window: crate::query::Window,
        ) -> anyhow::Result<Vec<Record>> {
            bail!("connection refused")
        }

        async fn test_connection(&self) -> anyhow::Result<()> {
            bail!("connection refused")
        }

        fn backend_name(&self) -> &'static str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_source_failures_propagate() {
        let engine = QueryEngine::new(Arc::new(FailingSource), QueryLimits::default());

        let err = engine.get_summary(&FilterSet::default()).await.unwrap_err();
        assert!(matches!(err, EngineError::Source(_)));
        assert!(err.to_string().contains("connection refused"));

        assert!(matches!(
            engine.get_total().await,
            Err(EngineError::Source(_))
        ));
    }

    #[tokio::test]
    async fn test_validation_runs_before_source_is_touched() {
        let engine = QueryEngine::new(Arc::new(FailingSource), QueryLimits::default());
        let err = engine
            .get_page(&FilterSet::default(), 0, 10)
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }
}
