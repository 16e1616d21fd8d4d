use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::debug;

use crate::models::{Record, RecordField};
use crate::query::sql::{self, Dialect};
use crate::query::{Predicate, Window};

/// Execute a scalar COUNT statement with text parameters
async fn fetch_count(pool: &PgPool, statement: &str, params: &[String]) -> Result<u64> {
    debug!("Generated COUNT SQL: {}", statement);

    let mut query = sqlx::query_scalar::<_, i64>(statement);
    for param in params {
        query = query.bind(param);
    }

    let count = query
        .fetch_one(pool)
        .await
        .context("Failed to execute COUNT query")?;

    Ok(count.max(0) as u64)
}

/// Count every row in the records table
pub async fn count_all(pool: &PgPool, table: &str) -> Result<u64> {
    fetch_count(pool, &sql::count_all_sql(table), &[])
        .await
        .context("Failed to count records")
}

/// Count rows matching the predicate
pub async fn count_matching(pool: &PgPool, table: &str, predicate: &Predicate) -> Result<u64> {
    let clause = sql::build_where_clause(predicate, Dialect::Postgres);
    fetch_count(pool, &sql::count_matching_sql(table, &clause), &clause.params)
        .await
        .context("Failed to count matching records")
}

/// Count distinct non-empty values of one column among matching rows
pub async fn distinct_count(
    pool: &PgPool,
    table: &str,
    predicate: &Predicate,
    field: RecordField,
) -> Result<u64> {
    let clause = sql::build_where_clause(predicate, Dialect::Postgres);
    fetch_count(
        pool,
        &sql::distinct_count_sql(table, &clause, field),
        &clause.params,
    )
    .await
    .with_context(|| format!("Failed to count distinct {}", field.column()))
}

/// Fetch one ordered window of matching rows
pub async fn query_filtered(
    pool: &PgPool,
    table: &str,
    predicate: &Predicate,
    window: Window,
) -> Result<Vec<Record>> {
    let clause = sql::build_where_clause(predicate, Dialect::Postgres);
    let statement = sql::page_sql(table, &clause, window, Dialect::Postgres);
    debug!("Generated paginated SQL: {}", statement);

    let mut query = sqlx::query_as::<_, Record>(&statement);
    for param in &clause.params {
        query = query.bind(param);
    }

    let records = query
        .fetch_all(pool)
        .await
        .context("Failed to execute paginated query")?;

    Ok(records)
}
