//! Numbered-page requests for catalog, annotation and review listings.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::constants::database::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// A page of a listing addressed by position.
///
/// Limits are clamped to `1..=MAX_PAGE_SIZE` and offsets to zero or more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct OffsetPagination {
    pub limit: i64,
    pub offset: i64,
    /// Also count every matching row. Costs one extra query.
    #[serde(default)]
    pub include_count: bool,
}

impl OffsetPagination {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: limit.clamp(1, MAX_PAGE_SIZE),
            offset: offset.max(0),
            include_count: false,
        }
    }

    /// Addresses the `page`th page (1-based) of `page_size` rows.
    pub fn page(page: i64, page_size: i64) -> Self {
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        Self::new(page_size, (page.max(1) - 1) * page_size)
    }

    pub fn with_count(mut self) -> Self {
        self.include_count = true;
        self
    }
}

impl Default for OffsetPagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, 0)
    }
}

/// Rows of one page, plus the match count when it was requested.
#[derive(Debug, Clone)]
pub struct OffsetPage<T> {
    pub items: Vec<T>,
    pub total: Option<i64>,
}

impl<T> OffsetPage<T> {
    pub fn new(items: Vec<T>, total: Option<i64>) -> Self {
        Self { items, total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_limit_and_offset() {
        assert_eq!(OffsetPagination::new(0, 10).limit, 1);
        assert_eq!(OffsetPagination::new(5_000, 10).limit, MAX_PAGE_SIZE);
        assert_eq!(OffsetPagination::new(10, -5).offset, 0);
        assert!(!OffsetPagination::new(10, 0).include_count);
        assert!(OffsetPagination::new(10, 0).with_count().include_count);
    }

    #[test]
    fn numbered_pages() {
        assert_eq!(OffsetPagination::page(1, 20), OffsetPagination::new(20, 0));
        assert_eq!(OffsetPagination::page(3, 10), OffsetPagination::new(10, 20));
        assert_eq!(OffsetPagination::page(0, 20).offset, 0);
        assert_eq!(OffsetPagination::page(2, 0), OffsetPagination::new(1, 1));
    }

    #[test]
    fn default_page() {
        let pagination = OffsetPagination::default();
        assert_eq!(pagination.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(pagination.offset, 0);
    }
}
