pub mod connection;
pub mod queries;

use anyhow::Result;
use async_trait::async_trait;

use crate::db::backend::RecordSource;
use crate::db::sqlite::connection::SqlitePool;
use crate::models::{Record, RecordField};
use crate::query::{Predicate, Window};

pub struct SqliteBackend {
    pool: SqlitePool,
    table: String,
}

impl SqliteBackend {
    pub fn new(pool: SqlitePool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }
}

#[async_trait]
impl RecordSource for SqliteBackend {
    async fn count_all(&self) -> Result<u64> {
        let pool = self.pool.clone();
        let table = self.table.clone();
        tokio::task::spawn_blocking(move || queries::count_all(&pool, &table)).await?
    }

    async fn count_matching(&self, predicate: &Predicate) -> Result<u64> {
        let pool = self.pool.clone();
        let table = self.table.clone();
        let predicate = predicate.clone(); // Clone to move into spawn_blocking
        tokio::task::spawn_blocking(move || queries::count_matching(&pool, &table, &predicate))
            .await?
    }

    async fn distinct_count(&self, predicate: &Predicate, field: RecordField) -> Result<u64> {
        let pool = self.pool.clone();
        let table = self.table.clone();
        let predicate = predicate.clone();
        tokio::task::spawn_blocking(move || {
            queries::distinct_count(&pool, &table, &predicate, field)
        })
        .await?
    }

    async fn query_filtered(&self, predicate: &Predicate, window: Window) -> Result<Vec<Record>> {
        let pool = self.pool.clone();
        let table = self.table.clone();
        let predicate = predicate.clone();
        tokio::task::spawn_blocking(move || {
            queries::query_filtered(&pool, &table, &predicate, window)
        })
        .await?
    }

    async fn test_connection(&self) -> Result<()> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || connection::test_connection(&pool)).await?
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
