use anyhow::{Context, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags};
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::query::fold_case;
use crate::query::sql::SQLITE_FOLD_FUNCTION;

pub type SqlitePool = Pool<SqliteConnectionManager>;

/// Open a read-only pool over an existing SQLite database file
pub fn create_pool(database_path: &str, config: &DatabaseConfig) -> Result<SqlitePool> {
    if !std::path::Path::new(database_path).exists() {
        anyhow::bail!("SQLite database not found at {}", database_path);
    }

    let manager = SqliteConnectionManager::file(database_path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX)
        .with_init(register_functions);

    Pool::builder()
        .max_size(config.max_connections.min(15)) // SQLite doesn't handle as many connections as Postgres
        .connection_timeout(Duration::from_millis(config.acquire_timeout_ms))
        .build(manager)
        .context("Failed to create SQLite connection pool")
}

/// Register the Unicode case folding used by filter predicates
pub fn register_functions(conn: &mut Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        SQLITE_FOLD_FUNCTION,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let folded = match ctx.get_raw(0) {
                ValueRef::Null | ValueRef::Blob(_) => None,
                ValueRef::Text(bytes) => Some(fold_case(&String::from_utf8_lossy(bytes))),
                ValueRef::Integer(i) => Some(i.to_string()),
                ValueRef::Real(f) => Some(f.to_string()),
            };
            Ok(folded)
        },
    )
}

pub fn test_connection(pool: &SqlitePool) -> Result<()> {
    let conn = pool.get().context("Failed to get connection from pool")?;
    conn.query_row("SELECT 1", params![], |_| Ok(()))
        .context("Failed to test database connection")?;
    Ok(())
}
