use thiserror::Error;

/// Rejected paging input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("page must be at least 1, got {0}")]
    InvalidPage(u64),
    #[error("page_size must be at least 1, got {0}")]
    InvalidPageSize(u64),
    #[error("page_size {requested} exceeds the maximum of {max}")]
    PageSizeTooLarge { requested: u64, max: u64 },
    #[error("page {page} with page_size {page_size} is out of addressable range")]
    OffsetOverflow { page: u64, page_size: u64 },
}

/// Validated 1-based page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    page_size: u64,
}

/// Row window derived from a page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: u64, page_size: u64, max_page_size: u64) -> Result<Self, PageError> {
        if page < 1 {
            return Err(PageError::InvalidPage(page));
        }
        if page_size < 1 {
            return Err(PageError::InvalidPageSize(page_size));
        }
        if page_size > max_page_size {
            return Err(PageError::PageSizeTooLarge {
                requested: page_size,
                max: max_page_size,
            });
        }
        // Backends bind offsets as signed 64-bit integers
        let offset = (page - 1)
            .checked_mul(page_size)
            .filter(|offset| i64::try_from(*offset).is_ok());
        if offset.is_none() {
            return Err(PageError::OffsetOverflow { page, page_size });
        }

        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn window(&self) -> Window {
        Window {
            offset: (self.page - 1) * self.page_size,
            limit: self.page_size,
        }
    }
}

impl Window {
    /// Slice bounds for an in-memory sequence of `len` items
    pub fn range(&self, len: usize) -> std::ops::Range<usize> {
        let start = usize::try_from(self.offset).unwrap_or(usize::MAX).min(len);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        let end = start.saturating_add(limit).min(len);
        start..end
    }
}
