use anyhow::{anyhow, Result};

use super::filter::FilterSet;
use super::limits::QueryLimits;
use super::page::{PageError, PageRequest};

pub struct QueryValidator {
    limits: QueryLimits,
}

impl QueryValidator {
    pub fn new(limits: QueryLimits) -> Self {
        Self { limits }
    }

    /// Get reference to query limits
    pub fn limits(&self) -> &QueryLimits {
        &self.limits
    }

    /// Validate raw filter values before a predicate is built
    pub fn validate_filters(&self, filters: &FilterSet) -> Result<()> {
        for (name, value) in filters.supplied() {
            let length = value.chars().count();
            if length > self.limits.max_filter_length {
                return Err(anyhow!(
                    "Filter '{}' too long: maximum {} characters allowed, got {}",
                    name,
                    self.limits.max_filter_length,
                    length
                ));
            }

            // Surrounding whitespace is trimmed later, control characters included
            if value.trim().chars().any(char::is_control) {
                return Err(anyhow!(
                    "Filter '{}' contains control characters",
                    name
                ));
            }
        }

        Ok(())
    }

    /// Check paging input against the configured maximum page size
    pub fn page_request(&self, page: u64, page_size: u64) -> Result<PageRequest, PageError> {
        PageRequest::new(page, page_size, self.limits.max_page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> QueryValidator {
        QueryValidator::new(QueryLimits {
            max_page_size: 100,
            default_page_size: 20,
            max_filter_length: 10,
        })
    }

    #[test]
    fn test_filter_too_long() {
        let filters = FilterSet {
            search: Some("a".repeat(11)),
            ..Default::default()
        };
        let err = validator().validate_filters(&filters).unwrap_err();
        assert!(err.to_string().contains("'search' too long"));
    }

    #[test]
    fn test_control_characters_rejected() {
        let filters = FilterSet {
            block: Some("Agra\u{0}".to_string()),
            ..Default::default()
        };
        assert!(validator().validate_filters(&filters).is_err());
    }

    #[test]
    fn test_whitespace_only_filter_allowed() {
        let filters = FilterSet {
            village: Some(" \t ".to_string()),
            ..Default::default()
        };
        assert!(validator().validate_filters(&filters).is_ok());
    }

    #[test]
    fn test_valid_filters() {
        let filters = FilterSet {
            block: Some("Agra".to_string()),
            member_status: Some("Approved".to_string()),
            ..Default::default()
        };
        assert!(validator().validate_filters(&filters).is_ok());
    }

    #[test]
    fn test_trailing_control_whitespace_is_trimmed_like_spaces() {
        for value in ["Agra\n", "Agra\r\n", "\tAgra", "Agra "] {
            let filters = FilterSet {
                block: Some(value.to_string()),
                ..Default::default()
            };
            assert!(validator().validate_filters(&filters).is_ok(), "{:?}", value);
        }

        let embedded = FilterSet {
            block: Some("Ag\nra".to_string()),
            ..Default::default()
        };
        assert!(validator().validate_filters(&embedded).is_err());
    }

    #[test]
    fn test_page_request_uses_configured_maximum() {
        let request = validator().page_request(2, 100).unwrap();
        assert_eq!(request.page(), 2);
        assert_eq!(request.page_size(), 100);

        assert_eq!(
            validator().page_request(1, 101),
            Err(PageError::PageSizeTooLarge {
                requested: 101,
                max: 100
            })
        );
        assert_eq!(
            validator().page_request(0, 10),
            Err(PageError::InvalidPage(0))
        );
    }
}
