//! Error envelope returned by the HTTP layer

pub mod codes;
pub mod response;

pub use codes::ErrorCode;
pub use response::{ErrorDetail, ErrorResponse};

/// Result of request-level checks that short-circuit into an error envelope
pub type ApiResult<T> = Result<T, ErrorResponse>;
