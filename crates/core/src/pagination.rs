//! Offset pagination primitives shared by repositories and the HTTP layer.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Upper bound on `page_size`.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Default `page_size` when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// A 1-indexed page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl ValueObject for PageRequest {}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a page window.
    ///
    /// `page` starts at 1; `page_size` must be in `1..=MAX_PAGE_SIZE`.
    pub fn new(page: u32, page_size: u32) -> DomainResult<Self> {
        if page == 0 {
            return Err(DomainError::validation("page must be at least 1"));
        }
        if page_size == 0 {
            return Err(DomainError::validation("page_size must be at least 1"));
        }
        if page_size > MAX_PAGE_SIZE {
            return Err(DomainError::validation(format!(
                "page_size must be at most {MAX_PAGE_SIZE}"
            )));
        }
        Ok(Self { page, page_size })
    }

    /// Same as `new`, with the defaults filled in for absent values.
    pub fn from_optional(page: Option<u32>, page_size: Option<u32>) -> DomainResult<Self> {
        Self::new(page.unwrap_or(1), page_size.unwrap_or(DEFAULT_PAGE_SIZE))
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of rows to skip: `(page - 1) * page_size`.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

/// One page of results plus the size of the whole (possibly filtered) set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page(),
            page_size: request.page_size(),
        }
    }

    /// `ceil(total / page_size)`; zero when the set is empty.
    pub fn total_pages(&self) -> u64 {
        let size = u64::from(self.page_size.max(1));
        self.total.div_ceil(size)
    }
}
