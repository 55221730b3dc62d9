//! Pagination requests for repository listings.
//!
//! Catalog, review and annotation listings page by offset. Loan histories
//! page by keyset, see [`LoanPagination`].

mod loan_cursor;
mod offset;

pub use loan_cursor::{LoanCursor, LoanPagination, MAX_LOAN_PAGE_SIZE};
pub use offset::{OffsetPage, OffsetPagination};
