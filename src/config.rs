use anyhow::{bail, Context, Result};
use std::env;

use crate::query::sql::is_valid_table_name;
use crate::query::QueryLimits;

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub query: QueryLimits,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `postgres://...` or `sqlite://<path>`
    pub url: String,
    /// Table (optionally schema-qualified) holding the beneficiary records
    pub table: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_ms: u64,
    pub idle_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            table: "agra1".to_string(),
            max_connections: 10,
            min_connections: 0,
            acquire_timeout_ms: 30_000,
            idle_timeout_seconds: 600,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub instance_id: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let defaults = DatabaseConfig::default();
        let database = DatabaseConfig {
            url: env::var("DATABASE_URL")
                .or_else(|_| env::var("SQLITE_PATH").map(|path| format!("sqlite://{}", path)))
                .context("DATABASE_URL (or SQLITE_PATH) must be set")?,
            table: env::var("RECORDS_TABLE").unwrap_or(defaults.table),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| defaults.max_connections.to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                .unwrap_or_else(|_| defaults.min_connections.to_string())
                .parse()
                .context("DATABASE_MIN_CONNECTIONS must be a valid number")?,
            acquire_timeout_ms: env::var("DATABASE_ACQUIRE_TIMEOUT_MS")
                .unwrap_or_else(|_| defaults.acquire_timeout_ms.to_string())
                .parse()
                .context("DATABASE_ACQUIRE_TIMEOUT_MS must be a valid number")?,
            idle_timeout_seconds: env::var("DATABASE_IDLE_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| defaults.idle_timeout_seconds.to_string())
                .parse()
                .context("DATABASE_IDLE_TIMEOUT_SECONDS must be a valid number")?,
        };

        let config = Config {
            database,
            server: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("API_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .context("API_PORT must be a valid port number")?,
                // Used only for debugging/observability. If unset, fall back to HOSTNAME if
                // present (e.g. Docker/Kubernetes), otherwise "unknown".
                instance_id: env::var("INSTANCE_ID")
                    .or_else(|_| env::var("HOSTNAME"))
                    .unwrap_or_else(|_| "unknown".to_string()),
            },
            query: QueryLimits::from_env(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would only fail later, on first use
    pub fn validate(&self) -> Result<()> {
        if self.database.url.trim().is_empty() {
            bail!("DATABASE_URL must not be empty");
        }
        if !is_valid_table_name(&self.database.table) {
            bail!(
                "RECORDS_TABLE '{}' is not a valid table identifier",
                self.database.table
            );
        }
        if self.database.max_connections == 0 {
            bail!("DATABASE_MAX_CONNECTIONS must be at least 1");
        }
        if self.query.max_page_size == 0 {
            bail!("QUERY_MAX_PAGE_SIZE must be at least 1");
        }
        if self.query.default_page_size == 0
            || self.query.default_page_size > self.query.max_page_size
        {
            bail!(
                "QUERY_DEFAULT_PAGE_SIZE must be between 1 and {}",
                self.query.max_page_size
            );
        }
        Ok(())
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
