//! Prelude module for libris-postgres.
//!
//! This module re-exports the most commonly used types and traits from libris-postgres,
//! making it easy to import everything you need with a single `use` statement.
//!
//! # Example
//!
//! ```rust,no_run
//! use libris_postgres::prelude::*;
//!
//! # async fn example() -> PgResult<()> {
//! let client = PgConfig::new("postgresql://localhost/libris").build()?;
//! let mut conn = client.get_connection().await?;
//! let available = conn.list_available_books(OffsetPagination::default()).await?;
//! # Ok(())
//! # }
//! ```

// Common query traits
pub use diesel::prelude::*;
pub use diesel_async::RunQueryDsl;

// Connection type
pub use crate::PgConnection;
// Client types
pub use crate::client::{MigrationReport, PgClient, PgConfig, PgConn, SchemaReport, SchemaStatus};
// Error types
pub use crate::error::{DomainError, PgError, PgResult};
// Models
pub use crate::model::{
    AccountProfile, Annotation, AnnotationReply, Book, BookLoan, BookReview, LikeAction,
    LikeToggle, LoanHistoryPage, NewAnnotation, NewBook, NewBookReview, UpdateAnnotation,
    UpdateBook,
};
// Repositories
pub use crate::query::{
    AccountProfileRepository, AnnotationLikeRepository, AnnotationReplyRepository,
    AnnotationRepository, BookLoanRepository, BookRepository, BookReviewRepository,
};
// Domain types
pub use crate::types::{
    AnnotationType, BookAvailability, BookGenre, BookInventory, Clock, LoanCursor,
    LoanPagination, LoanStatus, OffsetPage, OffsetPagination, SystemClock,
};
