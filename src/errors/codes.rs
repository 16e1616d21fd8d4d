use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Error codes for structured API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ErrorCode {
    /// Filter or paging input rejected
    #[serde(rename = "VALIDATION_ERROR")]
    ValidationError,

    /// Record source unreachable or query failed
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError,

    /// Internal server error
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationError => write!(f, "VALIDATION_ERROR"),
            Self::DatabaseError => write!(f, "DATABASE_ERROR"),
            Self::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

impl ErrorCode {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ValidationError => 400,
            Self::DatabaseError => 503,
            Self::InternalError => 500,
        }
    }
}
