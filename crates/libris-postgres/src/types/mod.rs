//! Contains constraints, enumerations and other custom types.

pub mod constants;
mod constraint;
mod enums;
mod inventory;
mod pagination;
mod utilities;
pub mod validation;

pub use constraint::{
    AnnotationConstraints, AnnotationLikeConstraints, AnnotationReplyConstraints,
    BookConstraints, BookLoanConstraints, BookReviewConstraints, ConstraintCategory,
    ConstraintViolation,
};
pub use enums::{AnnotationType, BookAvailability, BookGenre, LoanStatus};
pub use inventory::BookInventory;
pub use pagination::{
    LoanCursor, LoanPagination, MAX_LOAN_PAGE_SIZE, OffsetPage, OffsetPagination,
};
pub use utilities::{
    Clock, HasCreatedAt, HasDeletedAt, HasUpdatedAt, ManualClock, SystemClock, Tags,
    is_within_duration,
};
