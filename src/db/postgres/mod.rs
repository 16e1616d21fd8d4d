pub mod connection;
pub mod queries;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::backend::RecordSource;
use crate::models::{Record, RecordField};
use crate::query::{Predicate, Window};

pub struct PostgresBackend {
    pool: PgPool,
    table: String,
}

impl PostgresBackend {
    pub fn new(pool: PgPool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }
}

#[async_trait]
impl RecordSource for PostgresBackend {
    async fn count_all(&self) -> Result<u64> {
        queries::count_all(&self.pool, &self.table).await
    }

    async fn count_matching(&self, predicate: &Predicate) -> Result<u64> {
        queries::count_matching(&self.pool, &self.table, predicate).await
    }

    async fn distinct_count(&self, predicate: &Predicate, field: RecordField) -> Result<u64> {
        queries::distinct_count(&self.pool, &self.table, predicate, field).await
    }

    async fn query_filtered(&self, predicate: &Predicate, window: Window) -> Result<Vec<Record>> {
        queries::query_filtered(&self.pool, &self.table, predicate, window).await
    }

    async fn test_connection(&self) -> Result<()> {
        connection::test_connection(&self.pool).await
    }

    fn backend_name(&self) -> &'static str {
        "postgresql"
    }
}
