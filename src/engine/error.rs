use thiserror::Error;

use crate::query::PageError;

/// Failure of a query engine operation
#[derive(Debug, Error)]
pub enum EngineError {
    /// Caller input was rejected before reaching the record source
    #[error("{0}")]
    Validation(String),

    /// The record source failed; propagated without retry
    #[error("record source failure: {0:#}")]
    Source(#[from] anyhow::Error),
}

impl From<PageError> for EngineError {
    fn from(err: PageError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl EngineError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
