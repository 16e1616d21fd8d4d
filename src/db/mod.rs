pub mod backend;
pub mod instrumented;
pub mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "sqlite")]
pub mod sqlite;

use anyhow::{bail, Result};
use std::sync::Arc;

#[cfg(feature = "postgres")]
pub use postgres::PostgresBackend;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBackend;

pub use backend::RecordSource;
pub use instrumented::InstrumentedSource;
pub use memory::MemoryBackend;

/// Record source handle - polymorphic over backends
pub type Database = Arc<dyn RecordSource>;

/// Initialize the record source selected by the database URL scheme
pub async fn init_database(config: &crate::config::DatabaseConfig) -> Result<Database> {
    let url = config.url.as_str();

    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        return init_postgres(config).await;
    }

    if let Some(path) = url.strip_prefix("sqlite://") {
        return init_sqlite(config, path);
    }

    bail!(
        "Unsupported DATABASE_URL scheme in '{}': expected postgres:// or sqlite://",
        redact_url(url)
    )
}

#[cfg(feature = "postgres")]
async fn init_postgres(config: &crate::config::DatabaseConfig) -> Result<Database> {
    tracing::info!("Initializing PostgreSQL backend");
    let pool = postgres::connection::create_pool(config).await?;
    postgres::connection::test_connection(&pool).await?;
    let backend = PostgresBackend::new(pool, config.table.clone());
    Ok(Arc::new(InstrumentedSource::new(Arc::new(backend))) as Database)
}

#[cfg(not(feature = "postgres"))]
async fn init_postgres(_config: &crate::config::DatabaseConfig) -> Result<Database> {
    bail!("PostgreSQL support is not compiled in; rebuild with the 'postgres' feature")
}

#[cfg(feature = "sqlite")]
fn init_sqlite(config: &crate::config::DatabaseConfig, path: &str) -> Result<Database> {
    tracing::info!("Initializing SQLite backend at {}", path);
    let pool = sqlite::connection::create_pool(path, config)?;
    let backend = SqliteBackend::new(pool, config.table.clone());
    Ok(Arc::new(InstrumentedSource::new(Arc::new(backend))) as Database)
}

#[cfg(not(feature = "sqlite"))]
fn init_sqlite(_config: &crate::config::DatabaseConfig, _path: &str) -> Result<Database> {
    bail!("SQLite support is not compiled in; rebuild with the 'sqlite' feature")
}

/// Strip credentials from a connection URL before it reaches logs or errors
pub fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
