use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::engine::QueryEngine;
use crate::errors::{ApiResult, ErrorResponse};
use crate::models::{FieldMap, Record, Summary};
use crate::query::FilterSet;

lazy_static::lazy_static! {
    static ref START_TIME: Instant = Instant::now();
}

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub engine: QueryEngine,
    pub instance_id: String,
}

/// Generic API response wrapper
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data (present if success is true)
    pub data: Option<T>,
    /// Error details (present if success is false)
    pub error: Option<crate::errors::response::ErrorDetail>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Paging query parameters
#[derive(Debug, Default, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Page number (starts at 1, default 1)
    pub page: Option<i64>,
    /// Number of rows per page (default and maximum are configurable)
    pub page_size: Option<i64>,
}

impl PageParams {
    /// Resolve defaults; negative values are reported rather than coerced
    fn resolve(&self, default_page_size: u64) -> ApiResult<(u64, u64)> {
        let page = non_negative("page", self.page.unwrap_or(1))?;
        let page_size = match self.page_size {
            Some(size) => non_negative("page_size", size)?,
            None => default_page_size,
        };
        Ok((page, page_size))
    }
}

fn non_negative(name: &str, value: i64) -> ApiResult<u64> {
    u64::try_from(value).map_err(|_| {
        ErrorResponse::validation_error(format!("{} must be at least 1, got {}", name, value))
    })
}

/// One page of rows
#[derive(Debug, Serialize, ToSchema)]
pub struct PageData<T> {
    /// Rows for the requested page, in member id order
    pub data: Vec<T>,
    /// Requested page number
    pub page: u64,
    /// Requested page size
    pub page_size: u64,
    /// Number of rows returned
    pub returned: usize,
}

impl<T> PageData<T> {
    fn new(data: Vec<T>, page: u64, page_size: u64) -> Self {
        let returned = data.len();
        Self {
            data,
            page,
            page_size,
            returned,
        }
    }
}

// Concrete response types for OpenAPI generation
/// Field-map page response
#[derive(Debug, Serialize, ToSchema)]
pub struct FieldMapPageResponse {
    pub success: bool,
    /// Rows keyed by storage column name
    #[schema(value_type = Option<Object>)]
    pub data: Option<PageData<FieldMap>>,
    pub error: Option<crate::errors::response::ErrorDetail>,
}

/// Typed record page response
#[derive(Debug, Serialize, ToSchema)]
pub struct RecordPageResponse {
    pub success: bool,
    #[schema(value_type = Option<Object>)]
    pub data: Option<PageData<Record>>,
    pub error: Option<crate::errors::response::ErrorDetail>,
}

/// Summary response
#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryResponse {
    pub success: bool,
    pub data: Option<Summary>,
    pub error: Option<crate::errors::response::ErrorDetail>,
}

/// Total record count
#[derive(Debug, Serialize, ToSchema)]
pub struct TotalData {
    /// Number of records in the source, ignoring filters
    pub total: u64,
}

/// Total count response
#[derive(Debug, Serialize, ToSchema)]
pub struct TotalResponse {
    pub success: bool,
    pub data: Option<TotalData>,
    pub error: Option<crate::errors::response::ErrorDetail>,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = serde_json::Value)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "beneficiary-registry",
        "version": env!("CARGO_PKG_VERSION"),
        "instance_id": state.instance_id,
        "build": {
            "profile": if cfg!(debug_assertions) { "debug" } else { "release" },
        },
        "database": state.engine.backend_name(),
        "uptime_seconds": START_TIME.elapsed().as_secs(),
    }))
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "health",
    responses(
        (status = 200, description = "Process is running", body = serde_json::Value)
    )
)]
pub async fn health_live(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "alive",
        "service": "beneficiary-registry",
        "instance_id": state.instance_id,
    }))
}

/// Readiness check: the record source must answer
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Ready to serve reads", body = serde_json::Value),
        (status = 503, description = "Record source unavailable", body = serde_json::Value)
    )
)]
pub async fn health_ready(State(state): State<AppState>) -> impl IntoResponse {
    let (status, database) = match state.engine.test_connection().await {
        Ok(()) => (StatusCode::OK, "ok".to_string()),
        Err(e) => {
            error!("Readiness check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
    };

    (
        status,
        Json(serde_json::json!({
            "status": if status.is_success() { "ready" } else { "not_ready" },
            "service": "beneficiary-registry",
            "instance_id": state.instance_id,
            "checks": { "database": database },
        })),
    )
}

/// Count all records
#[utoipa::path(
    get,
    path = "/records/total",
    tag = "records",
    responses(
        (status = 200, description = "Unfiltered record count", body = TotalResponse),
        (status = 503, description = "Record source unavailable", body = ErrorResponse)
    )
)]
pub async fn get_total(State(state): State<AppState>) -> impl IntoResponse {
    match state.engine.get_total().await {
        Ok(total) => {
            info!("Total records: {}", total);
            (StatusCode::OK, Json(ApiResponse::success(TotalData { total }))).into_response()
        }
        Err(e) => {
            error!("Total count failed: {}", e);
            ErrorResponse::from(e).into_response()
        }
    }
}

/// Page through filtered records as column-keyed rows
#[utoipa::path(
    get,
    path = "/records",
    tag = "records",
    params(FilterSet, PageParams),
    responses(
        (status = 200, description = "Page of rows", body = FieldMapPageResponse),
        (status = 400, description = "Invalid filter or paging input", body = ErrorResponse),
        (status = 503, description = "Record source unavailable", body = ErrorResponse)
    )
)]
pub async fn list_records(
    State(state): State<AppState>,
    Query(filters): Query<FilterSet>,
    Query(paging): Query<PageParams>,
) -> impl IntoResponse {
    info!(
        "Records request: filters={:?}, paging={:?}",
        filters.supplied_names(),
        paging
    );

    let (page, page_size) = match paging.resolve(state.engine.limits().default_page_size) {
        Ok(resolved) => resolved,
        Err(e) => return e.into_response(),
    };

    match state.engine.get_page(&filters, page, page_size).await {
        Ok(rows) => {
            info!("Records page {} returned {} rows", page, rows.len());
            let body = PageData::new(rows, page, page_size);
            (StatusCode::OK, Json(ApiResponse::success(body))).into_response()
        }
        Err(e) => {
            error!("Records request failed: {}", e);
            ErrorResponse::from(e).into_response()
        }
    }
}

/// Page through filtered records as typed entities
#[utoipa::path(
    get,
    path = "/records/typed",
    tag = "records",
    params(FilterSet, PageParams),
    responses(
        (status = 200, description = "Page of records", body = RecordPageResponse),
        (status = 400, description = "Invalid filter or paging input", body = ErrorResponse),
        (status = 503, description = "Record source unavailable", body = ErrorResponse)
    )
)]
pub async fn list_typed_records(
    State(state): State<AppState>,
    Query(filters): Query<FilterSet>,
    Query(paging): Query<PageParams>,
) -> impl IntoResponse {
    info!(
        "Typed records request: filters={:?}, paging={:?}",
        filters.supplied_names(),
        paging
    );

    let (page, page_size) = match paging.resolve(state.engine.limits().default_page_size) {
        Ok(resolved) => resolved,
        Err(e) => return e.into_response(),
    };

    match state.engine.get_records(&filters, page, page_size).await {
        Ok(records) => {
            info!("Typed records page {} returned {} rows", page, records.len());
            let body = PageData::new(records, page, page_size);
            (StatusCode::OK, Json(ApiResponse::success(body))).into_response()
        }
        Err(e) => {
            error!("Typed records request failed: {}", e);
            ErrorResponse::from(e).into_response()
        }
    }
}

/// Member and family coverage counts for a filter set
#[utoipa::path(
    get,
    path = "/records/summary",
    tag = "records",
    params(FilterSet),
    responses(
        (status = 200, description = "Filtered summary", body = SummaryResponse),
        (status = 400, description = "Invalid filter input", body = ErrorResponse),
        (status = 503, description = "Record source unavailable", body = ErrorResponse)
    )
)]
pub async fn get_summary(
    State(state): State<AppState>,
    Query(filters): Query<FilterSet>,
) -> impl IntoResponse {
    info!("Summary request: filters={:?}", filters.supplied_names());

    match state.engine.get_summary(&filters).await {
        Ok(summary) => (StatusCode::OK, Json(ApiResponse::success(summary))).into_response(),
        Err(e) => {
            error!("Summary request failed: {}", e);
            ErrorResponse::from(e).into_response()
        }
    }
}
