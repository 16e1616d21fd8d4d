use utoipa::OpenApi;

use crate::api::handlers::{
    FieldMapPageResponse, PageParams, RecordPageResponse, SummaryResponse, TotalData,
    TotalResponse,
};
use crate::errors::{ErrorCode, ErrorDetail, ErrorResponse};
use crate::models::{Record, Summary};
use crate::query::FilterSet;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Beneficiary Registry",
        version = "0.1.0",
        description = "Read-only access to member/family beneficiary records: filtered paging and coverage summaries computed over the same filter set.",
        contact(
            name = "Beneficiary Registry API",
        )
    ),
    paths(
        crate::api::handlers::health,
        crate::api::handlers::health_live,
        crate::api::handlers::health_ready,
        crate::api::handlers::get_total,
        crate::api::handlers::list_records,
        crate::api::handlers::list_typed_records,
        crate::api::handlers::get_summary,
    ),
    components(
        schemas(
            Record,
            Summary,
            FilterSet,
            PageParams,
            TotalData,
            TotalResponse,
            FieldMapPageResponse,
            RecordPageResponse,
            SummaryResponse,
            ErrorResponse,
            ErrorDetail,
            ErrorCode,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "records", description = "Filtered record reads and summaries"),
    )
)]
pub struct ApiDoc;
