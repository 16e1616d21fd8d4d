use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use beneficiary_registry::api::handlers::AppStateInner;
use beneficiary_registry::api::routes::create_router;
use beneficiary_registry::config::Config;
use beneficiary_registry::engine::QueryEngine;
use beneficiary_registry::{db, metrics};

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Starting graceful shutdown...");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,beneficiary_registry=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Beneficiary Registry v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Initialize metrics
    metrics::registry::init_metrics();
    info!("Metrics registry initialized");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "Configuration loaded: database={}, table={}",
        db::redact_url(&config.database.url),
        config.database.table
    );

    // Initialize record source; an unreachable store is fatal at startup
    info!("Connecting to database...");
    let database = db::init_database(&config.database)
        .await
        .context("Failed to initialize database")?;

    database
        .test_connection()
        .await
        .context("Failed to test database connection")?;
    info!("Database connection established ({})", database.backend_name());

    let engine = QueryEngine::new(database, config.query.clone());

    let total = engine
        .get_total()
        .await
        .context("Failed to count records")?;
    info!("Record source holds {} records", total);

    // Create application state
    let state = Arc::new(AppStateInner {
        engine,
        instance_id: config.server.instance_id.clone(),
    });

    // Create router
    let app = create_router(state);

    // Start server
    let addr = config.server_address();
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind server")?;

    info!("Server listening on {}", addr);

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");

    Ok(())
}
