//! Database models for all entities in the system.
//!
//! This module contains Diesel model definitions for all database tables,
//! including structs for querying, inserting, and updating records.

mod account_profile;
mod annotation;
mod annotation_like;
mod annotation_reply;
mod book;
mod book_loan;
mod book_review;

// Account models
pub use account_profile::AccountProfile;
// Annotation models
pub use annotation::{
    Annotation, AnnotationRect, AnnotationStats, AnnotationWithAuthor, NewAnnotation,
    UpdateAnnotation,
};
pub use annotation_like::{AnnotationLike, AnnotationLikeWithAuthor, LikeAction, LikeToggle};
pub use annotation_reply::{
    AnnotationReply, AnnotationReplyWithAuthor, NewAnnotationReply, reply_timestamp,
};
// Catalog models
pub use book::{Book, NewBook, ScoredBook, UpdateBook};
pub use book_loan::{BookLoan, LoanHistoryPage, NewBookLoan, OpenLoans, loan_period};
pub use book_review::{BookReview, NewBookReview, RatingSummary};
