use anyhow::{Context, Result};
use tracing::debug;

use crate::db::sqlite::connection::SqlitePool;
use crate::models::{Record, RecordField};
use crate::query::sql::{self, Dialect};
use crate::query::{Predicate, Window};

/// Execute a scalar COUNT statement with text parameters
fn fetch_count(pool: &SqlitePool, statement: &str, params: &[String]) -> Result<u64> {
    debug!("Generated COUNT SQL: {}", statement);

    let conn = pool.get().context("Failed to get connection from pool")?;
    let mut stmt = conn
        .prepare(statement)
        .context("Failed to prepare COUNT statement")?;

    let count: i64 = stmt
        .query_row(rusqlite::params_from_iter(params.iter()), |row| row.get(0))
        .context("Failed to execute COUNT query")?;

    Ok(count.max(0) as u64)
}

/// Count every row in the records table
pub fn count_all(pool: &SqlitePool, table: &str) -> Result<u64> {
    fetch_count(pool, &sql::count_all_sql(table), &[]).context("Failed to count records")
}

/// Count rows matching the predicate
pub fn count_matching(pool: &SqlitePool, table: &str, predicate: &Predicate) -> Result<u64> {
    let clause = sql::build_where_clause(predicate, Dialect::Sqlite);
    fetch_count(pool, &sql::count_matching_sql(table, &clause), &clause.params)
        .context("Failed to count matching records")
}

/// Count distinct non-empty values of one column among matching rows
pub fn distinct_count(
    pool: &SqlitePool,
    table: &str,
    predicate: &Predicate,
    field: RecordField,
) -> Result<u64> {
    let clause = sql::build_where_clause(predicate, Dialect::Sqlite);
    fetch_count(
        pool,
        &sql::distinct_count_sql(table, &clause, field),
        &clause.params,
    )
    .with_context(|| format!("Failed to count distinct {}", field.column()))
}

/// Fetch one ordered window of matching rows
pub fn query_filtered(
    pool: &SqlitePool,
    table: &str,
    predicate: &Predicate,
    window: Window,
) -> Result<Vec<Record>> {
    let clause = sql::build_where_clause(predicate, Dialect::Sqlite);
    let statement = sql::page_sql(table, &clause, window, Dialect::Sqlite);
    debug!("Generated paginated SQL: {}", statement);

    let conn = pool.get().context("Failed to get connection from pool")?;
    let mut stmt = conn
        .prepare(&statement)
        .context("Failed to prepare SQL statement")?;

    let records = stmt
        .query_map(rusqlite::params_from_iter(clause.params.iter()), row_to_record)
        .context("Failed to execute paginated query")?
        .collect::<Result<Vec<Record>, _>>()
        .context("Failed to parse query results")?;

    Ok(records)
}

/// Helper function to convert a SQLite row to a Record
fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<Record> {
    let text = |field: RecordField| row.get::<_, Option<String>>(field.column());

    Ok(Record {
        family_id: text(RecordField::FamilyId)?,
        member_id: text(RecordField::MemberId)?,
        name: text(RecordField::Name)?,
        relation: text(RecordField::Relation)?,
        guardian_name: text(RecordField::GuardianName)?,
        rural_urban: text(RecordField::RuralUrban)?,
        district: text(RecordField::District)?,
        block: text(RecordField::Block)?,
        source_address: text(RecordField::SourceAddress)?,
        approved_address: text(RecordField::ApprovedAddress)?,
        village_code: text(RecordField::VillageCode)?,
        source_type: text(RecordField::SourceType)?,
        member_card_status: text(RecordField::MemberCardStatus)?,
        family_card_status: text(RecordField::FamilyCardStatus)?,
        zero_poverty_member: text(RecordField::ZeroPovertyMember)?,
    })
}
