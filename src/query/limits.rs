use serde::{Deserialize, Serialize};

/// Bounds applied to caller-supplied paging and filter input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLimits {
    /// Largest page size a caller may request
    pub max_page_size: u64,

    /// Page size used when the caller does not supply one
    pub default_page_size: u64,

    /// Maximum length of any single filter value (characters)
    pub max_filter_length: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            max_page_size: 500,
            default_page_size: 50,
            max_filter_length: 256,
        }
    }
}

impl QueryLimits {
    /// Create limits from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_page_size: std::env::var("QUERY_MAX_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_page_size),
            default_page_size: std::env::var("QUERY_DEFAULT_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_page_size),
            max_filter_length: std::env::var("QUERY_MAX_FILTER_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_filter_length),
        }
    }
}
