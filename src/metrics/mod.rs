pub mod middleware;
pub mod registry;

use anyhow::{Context, Result};
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use prometheus::{Encoder, TextEncoder};

use crate::errors::ErrorResponse;

pub use registry::{
    DATABASE_QUERIES_TOTAL, DATABASE_QUERY_DURATION_SECONDS, ENGINE_REQUESTS_TOTAL,
    HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS, RECORDS_TOTAL,
};

/// Encode every registered metric in Prometheus text exposition format
pub fn render() -> Result<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&prometheus::gather(), &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics output is not UTF-8")
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> Response {
    match render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, TextEncoder::new().format_type().to_string())],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("{:#}", e);
            ErrorResponse::internal_error(format!("{:#}", e)).into_response()
        }
    }
}
