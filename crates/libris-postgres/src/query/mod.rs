//! Database query repositories for all entities in the system.
//!
//! Each repository is a trait implemented for [`PgConnection`], so any
//! connection (pooled or not) can run catalog, loan and annotation
//! operations directly:
//!
//! ```rust,ignore
//! use libris_postgres::query::BookLoanRepository;
//!
//! let mut conn = client.get_connection().await?;
//! let (book, loan) = conn.borrow_book(book_id, account_id, clock.now()).await?;
//! ```
//!
//! Lifecycle operations take the current instant as an argument and run in
//! a transaction that locks the aggregate root row.
//!
//! [`PgConnection`]: crate::PgConnection

mod account_profile;
mod annotation;
mod annotation_like;
mod annotation_reply;
mod book;
mod book_loan;
mod book_review;

#[cfg(test)]
mod test_support;

pub use account_profile::AccountProfileRepository;
pub use annotation::AnnotationRepository;
pub use annotation_like::AnnotationLikeRepository;
pub use annotation_reply::AnnotationReplyRepository;
pub use book::BookRepository;
pub use book_loan::BookLoanRepository;
pub use book_review::BookReviewRepository;
