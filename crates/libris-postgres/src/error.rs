//! Error types and utilities for database operations.
//!
//! [`PgError`] is the single error type returned by every repository method.
//! It keeps three families apart so callers can react to each:
//!
//! - input that failed field validation before anything was written
//!   ([`PgError::Validation`]),
//! - a business rule rejecting the operation ([`PgError::Domain`]),
//! - infrastructure failures (connection, pool, query, migration).

use std::borrow::Cow;

pub use deadpool::managed::TimeoutType;
pub use diesel::result::{ConnectionError as DieselConnectionError, Error as DieselError};
pub use diesel_async::pooled_connection::PoolError as DieselPoolError;
pub use diesel_async::pooled_connection::deadpool::PoolError as DeadpoolError;
use uuid::Uuid;
pub use validator::ValidationErrors;
use validator::ValidationError;

use crate::TRACING_TARGET_QUERY;
use crate::types::{BookAvailability, ConstraintCategory, ConstraintViolation};

/// Type-erased error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Provides contextual hints for error types to aid in debugging and user messaging.
pub trait ErrorHint {
    /// Returns an additional hint for an error type.
    fn hint(&self) -> Cow<'static, str>;
}

impl ErrorHint for TimeoutType {
    fn hint(&self) -> Cow<'static, str> {
        match self {
            TimeoutType::Wait => Cow::Borrowed(
                "Connection pool is exhausted, consider increasing pool size or optimizing query performance",
            ),
            TimeoutType::Create => Cow::Borrowed(
                "Unable to establish new database connection, check connection string and database availability",
            ),
            TimeoutType::Recycle => Cow::Borrowed(
                "Failed to recycle database connection, connection may be in invalid state",
            ),
        }
    }
}

/// A business rule rejected the operation.
///
/// Nothing has been written when one of these is returned: the surrounding
/// transaction is rolled back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// No book with this id exists.
    #[error("Book {0} not found")]
    BookNotFound(Uuid),

    /// No live annotation with this id exists.
    #[error("Annotation {0} not found")]
    AnnotationNotFound(Uuid),

    /// The book has no lendable copy.
    #[error("Book is not available for borrowing ({availability}, {available_copies} copies left)")]
    BookUnavailable {
        /// Status at the time of the attempt.
        availability: BookAvailability,
        /// Copies on the shelf at the time of the attempt.
        available_copies: i32,
    },

    /// The account holds no open loan of the book.
    #[error("Account {account_id} has no active loan of book {book_id}")]
    NoActiveLoan {
        /// Book being returned.
        book_id: Uuid,
        /// Account returning it.
        account_id: Uuid,
    },

    /// The account already holds an open loan of the book.
    #[error("Account {account_id} already has book {book_id} on loan")]
    DuplicateLoan {
        /// Book being borrowed.
        book_id: Uuid,
        /// Account borrowing it.
        account_id: Uuid,
    },

    /// A return would put more copies on the shelf than the library owns.
    #[error("All {total_copies} copies are already on the shelf")]
    InventoryOverflow {
        /// Copies the library owns.
        total_copies: i32,
    },

    /// The requested counters violate the availability invariant.
    #[error("Invalid inventory: {0}")]
    InvalidInventory(Cow<'static, str>),
}

impl DomainError {
    /// Returns whether the error means the target row does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::BookNotFound(_) | DomainError::AnnotationNotFound(_)
        )
    }
}

/// Comprehensive error type for all PostgreSQL database operations.
///
/// This enum covers all possible error conditions that can occur when working
/// with the database, including connection issues, query failures, timeouts,
/// and migration problems, plus the validation and domain rejections raised
/// before or instead of a write.
#[derive(Debug, thiserror::Error)]
#[must_use = "database errors should be handled appropriately"]
pub enum PgError {
    /// Configuration error.
    ///
    /// This includes invalid configuration parameters, missing required settings,
    /// or other issues related to the database configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input failed field validation.
    ///
    /// Raised before any statement is sent to the database.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// A business rule rejected the operation.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Database operation timed out.
    ///
    /// This can occur during connection creation, waiting for available connections,
    /// or connection recycling operations.
    #[error("Database operation timed out")]
    Timeout(TimeoutType),

    /// Failed to establish or maintain a database connection.
    ///
    /// This includes authentication failures, network issues, and invalid
    /// connection parameters.
    #[error("Database connection error: {0}")]
    Connection(#[from] DieselConnectionError),

    /// Database migration operation failed.
    ///
    /// This occurs when applying or rolling back database schema changes.
    #[error("Database migration error: {0}")]
    Migration(BoxError),

    /// Database query execution failed.
    ///
    /// This includes SQL syntax errors, constraint violations, type mismatches,
    /// and other query-related failures.
    #[error("Database query error: {0}")]
    Query(DieselError),

    /// Unexpected error occurred.
    ///
    /// This can occur when an error is encountered that is not covered by the
    /// other error types.
    #[error("Unexpected error: {0}")]
    Unexpected(Cow<'static, str>),
}

impl PgError {
    /// Extracts the constraint name from a constraint violation error.
    ///
    /// # Returns
    ///
    /// - `Some(constraint_name)` if this error represents a constraint violation
    /// - `None` if this error is not related to a constraint violation
    pub fn constraint(&self) -> Option<&str> {
        let PgError::Query(err) = self else {
            return None;
        };

        let DieselError::DatabaseError(_, err) = err else {
            return None;
        };

        err.constraint_name()
    }

    /// Returns a structured constraint violation if this error represents one.
    pub fn constraint_violation(&self) -> Option<ConstraintViolation> {
        self.constraint().and_then(ConstraintViolation::new)
    }

    /// Returns whether the input failed field validation.
    #[inline]
    pub fn is_validation(&self) -> bool {
        matches!(self, PgError::Validation(_))
    }

    /// Returns whether a business rule rejected the operation.
    #[inline]
    pub fn is_domain(&self) -> bool {
        matches!(self, PgError::Domain(_))
    }

    /// Returns the domain error, if this is one.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            PgError::Domain(err) => Some(err),
            _ => None,
        }
    }

    /// Returns whether this error indicates a transient failure that might succeed on retry.
    ///
    /// Transient errors include timeouts and certain connection issues that may
    /// be resolved by retrying the operation.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PgError::Timeout(_) | PgError::Connection(DieselConnectionError::BadConnection(_))
        )
    }

    /// Returns whether this error indicates a permanent failure that won't succeed on retry.
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }
}

impl From<DieselError> for PgError {
    /// Maps violations of input-guarding constraints to field errors.
    ///
    /// A duplicate ISBN or a failed length check is reported the same way as
    /// input rejected before the write. Every other failure stays a query error.
    fn from(error: DieselError) -> Self {
        let DieselError::DatabaseError(_, info) = &error else {
            return Self::Query(error);
        };

        let Some((violation, field)) = info
            .constraint_name()
            .and_then(ConstraintViolation::new)
            .and_then(|violation| violation.input_field().map(|field| (violation, field)))
        else {
            return Self::Query(error);
        };

        let code = match violation.constraint_category() {
            ConstraintCategory::Uniqueness => "unique",
            _ => "constraint",
        };

        let mut field_error =
            ValidationError::new(code).with_message(Cow::Owned(info.message().to_owned()));
        field_error.add_param(Cow::Borrowed("constraint"), &violation.constraint_name());

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            constraint = %violation,
            field,
            "Constraint violation reported as a validation error"
        );

        let mut errors = ValidationErrors::new();
        errors.add(field, field_error);
        Self::Validation(errors)
    }
}

impl From<DeadpoolError> for PgError {
    fn from(value: DeadpoolError) -> Self {
        match value {
            DeadpoolError::Timeout(timeout) => Self::Timeout(timeout),
            DeadpoolError::Backend(DieselPoolError::QueryError(error)) => Self::from(error),
            DeadpoolError::Backend(DieselPoolError::ConnectionError(error)) => {
                Self::Connection(error)
            }
            DeadpoolError::PostCreateHook(err) => {
                tracing::warn!("Unexpected post-create hook error: {}", err);
                Self::Unexpected(err.to_string().into())
            }
            DeadpoolError::NoRuntimeSpecified => {
                tracing::error!("No tokio runtime specified for connection pool");
                Self::Unexpected("No runtime specified".into())
            }
            DeadpoolError::Closed => Self::Connection(DieselConnectionError::InvalidConnectionUrl(
                "Connection pool is closed".into(),
            )),
        }
    }
}

/// Specialized [`Result`] type for database operations.
pub type PgResult<T, E = PgError> = Result<T, E>;

#[cfg(test)]
mod tests {
    use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind};

    use super::*;

    /// Error details as PostgreSQL reports them for a named constraint.
    struct ConstraintFailure(&'static str);

    impl DatabaseErrorInformation for ConstraintFailure {
        fn message(&self) -> &str {
            "constraint violated"
        }

        fn details(&self) -> Option<&str> {
            None
        }

        fn hint(&self) -> Option<&str> {
            None
        }

        fn table_name(&self) -> Option<&str> {
            None
        }

        fn column_name(&self) -> Option<&str> {
            None
        }

        fn constraint_name(&self) -> Option<&str> {
            Some(self.0)
        }

        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind, constraint: &'static str) -> PgError {
        PgError::from(DieselError::DatabaseError(
            kind,
            Box::new(ConstraintFailure(constraint)),
        ))
    }

    #[test]
    fn duplicate_isbn_is_a_field_error() {
        let err = database_error(DatabaseErrorKind::UniqueViolation, "books_isbn_unique_idx");
        assert!(err.is_validation());
        assert!(!err.is_domain());

        let PgError::Validation(errors) = err else {
            panic!("expected a validation error");
        };
        let fields = errors.field_errors();
        let isbn = fields.get("isbn").expect("isbn field error");
        assert_eq!(isbn[0].code, "unique");
    }

    #[test]
    fn input_checks_are_field_errors() {
        let err = database_error(DatabaseErrorKind::CheckViolation, "annotations_color_format");
        let PgError::Validation(errors) = err else {
            panic!("expected a validation error");
        };
        assert!(errors.field_errors().contains_key("color"));

        let err = database_error(DatabaseErrorKind::CheckViolation, "book_reviews_rating_range");
        assert!(err.is_validation());
    }

    #[test]
    fn other_constraints_stay_query_errors() {
        let err = database_error(
            DatabaseErrorKind::UniqueViolation,
            "book_loans_open_unique_idx",
        );
        assert!(!err.is_validation());
        assert_eq!(err.constraint(), Some("book_loans_open_unique_idx"));

        let err = database_error(
            DatabaseErrorKind::CheckViolation,
            "books_available_copies_range",
        );
        assert!(matches!(err, PgError::Query(_)));

        let err = PgError::from(DieselError::NotFound);
        assert!(err.constraint_violation().is_none());
    }

    #[test]
    fn families_are_distinguishable() {
        let mut errors = ValidationErrors::new();
        errors.add("isbn", ValidationError::new("isbn_length"));
        let validation = PgError::from(errors);
        assert!(validation.is_validation());
        assert!(!validation.is_domain());

        let domain = PgError::from(DomainError::BookNotFound(Uuid::nil()));
        assert!(domain.is_domain());
        assert!(!domain.is_validation());
        assert!(domain.as_domain().is_some_and(DomainError::is_not_found));
        assert!(domain.is_permanent());
    }

    #[test]
    fn domain_messages() {
        let err = DomainError::BookUnavailable {
            availability: BookAvailability::Borrowed,
            available_copies: 0,
        };
        assert_eq!(
            err.to_string(),
            "Book is not available for borrowing (borrowed, 0 copies left)"
        );

        let err = PgError::from(DomainError::InventoryOverflow { total_copies: 3 });
        assert_eq!(err.to_string(), "All 3 copies are already on the shelf");
    }

    #[test]
    fn timeouts_are_transient() {
        let err = PgError::Timeout(TimeoutType::Wait);
        assert!(err.is_transient());
        assert!(TimeoutType::Wait.hint().contains("pool"));
        assert!(err.constraint().is_none());
    }
}
