//! Database constraint violations organized by table.
//!
//! Every named CHECK constraint, unique index and foreign key created by the
//! embedded migrations has a variant here, so a failed write can be mapped
//! back to the rule it broke.

// Catalog constraint modules
mod book_loans;
mod book_reviews;
mod books;

// Annotation constraint modules
mod annotation_likes;
mod annotation_replies;
mod annotations;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::annotation_likes::AnnotationLikeConstraints;
pub use self::annotation_replies::AnnotationReplyConstraints;
pub use self::annotations::AnnotationConstraints;
pub use self::book_loans::BookLoanConstraints;
pub use self::book_reviews::BookReviewConstraints;
pub use self::books::BookConstraints;

/// Unified constraint violation enum that can represent any database constraint.
///
/// The serialized form is the constraint name as reported by PostgreSQL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ConstraintViolation {
    // Catalog constraints
    Book(BookConstraints),
    BookLoan(BookLoanConstraints),
    BookReview(BookReviewConstraints),

    // Annotation constraints
    Annotation(AnnotationConstraints),
    AnnotationReply(AnnotationReplyConstraints),
    AnnotationLike(AnnotationLikeConstraints),
}

/// Categories of database constraint violations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintCategory {
    /// Data validation constraints (format, length, range checks).
    Validation,
    /// Chronological integrity constraints (timestamp relationships).
    Chronological,
    /// Business logic constraints (inventory rules, references).
    BusinessLogic,
    /// Uniqueness constraints (primary keys, unique indexes).
    Uniqueness,
}

impl ConstraintViolation {
    /// Creates a new [`ConstraintViolation`] from the constraint name.
    ///
    /// Returns `None` if the constraint name is not recognized.
    ///
    /// # Examples
    ///
    /// ```
    /// use libris_postgres::types::ConstraintViolation;
    ///
    /// let violation = ConstraintViolation::new("books_isbn_unique_idx");
    /// assert!(violation.is_some());
    ///
    /// let unknown = ConstraintViolation::new("unknown_constraint");
    /// assert!(unknown.is_none());
    /// ```
    pub fn new(constraint: &str) -> Option<Self> {
        let prefix = constraint.split('_').next()?;
        macro_rules! try_parse {
            ($($parser:expr => $variant:ident),+ $(,)?) => {
                None$(.or_else(|| $parser(constraint).map(Self::$variant)))+
            };
        }

        match prefix {
            "books" => try_parse!(BookConstraints::new => Book),
            "book" => try_parse! {
                BookLoanConstraints::new => BookLoan,
                BookReviewConstraints::new => BookReview,
            },
            "annotations" => try_parse!(AnnotationConstraints::new => Annotation),
            "annotation" => try_parse! {
                AnnotationReplyConstraints::new => AnnotationReply,
                AnnotationLikeConstraints::new => AnnotationLike,
            },
            _ => None,
        }
    }

    /// Returns the table name associated with this constraint.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConstraintViolation::Book(_) => "books",
            ConstraintViolation::BookLoan(_) => "book_loans",
            ConstraintViolation::BookReview(_) => "book_reviews",

            ConstraintViolation::Annotation(_) => "annotations",
            ConstraintViolation::AnnotationReply(_) => "annotation_replies",
            ConstraintViolation::AnnotationLike(_) => "annotation_likes",
        }
    }

    /// Returns the aggregate this constraint belongs to.
    pub fn functional_area(&self) -> &'static str {
        match self {
            ConstraintViolation::Book(_)
            | ConstraintViolation::BookLoan(_)
            | ConstraintViolation::BookReview(_) => "catalog",

            ConstraintViolation::Annotation(_)
            | ConstraintViolation::AnnotationReply(_)
            | ConstraintViolation::AnnotationLike(_) => "annotations",
        }
    }

    /// Returns the category of this constraint violation.
    pub fn constraint_category(&self) -> ConstraintCategory {
        match self {
            ConstraintViolation::Book(c) => c.categorize(),
            ConstraintViolation::BookLoan(c) => c.categorize(),
            ConstraintViolation::BookReview(c) => c.categorize(),

            ConstraintViolation::Annotation(c) => c.categorize(),
            ConstraintViolation::AnnotationReply(c) => c.categorize(),
            ConstraintViolation::AnnotationLike(c) => c.categorize(),
        }
    }

    /// Returns the input field this constraint guards, if any.
    ///
    /// Covers the validation checks and the ISBN uniqueness index, which are
    /// the constraints a caller can break with its own input.
    pub fn input_field(&self) -> Option<&'static str> {
        let field = match self {
            ConstraintViolation::Book(c) => match c {
                BookConstraints::TitleLength => "title",
                BookConstraints::AuthorLength => "author",
                BookConstraints::IsbnFormat | BookConstraints::IsbnUnique => "isbn",
                BookConstraints::DescriptionLength => "description",
                BookConstraints::PublisherLength => "publisher",
                BookConstraints::PageCountMin => "page_count",
                BookConstraints::LanguageLength => "language",
                BookConstraints::RatingAverageRange => "rating_average",
                BookConstraints::RatingCountMin => "rating_count",
                _ => return None,
            },
            ConstraintViolation::BookReview(c) => match c {
                BookReviewConstraints::RatingRange => "rating",
                BookReviewConstraints::CommentLength => "comment",
                _ => return None,
            },
            ConstraintViolation::Annotation(c) => match c {
                AnnotationConstraints::SelectedTextLength => "selected_text",
                AnnotationConstraints::NoteLength => "note",
                AnnotationConstraints::PageNumberMin => "page_number",
                AnnotationConstraints::OffsetsMin => "start_offset",
                AnnotationConstraints::OffsetsOrder => "end_offset",
                AnnotationConstraints::ColorFormat => "color",
                _ => return None,
            },
            ConstraintViolation::AnnotationReply(c) => match c {
                AnnotationReplyConstraints::ContentLength => "content",
                AnnotationReplyConstraints::AnnotationIdFkey => return None,
            },
            ConstraintViolation::BookLoan(_) | ConstraintViolation::AnnotationLike(_) => {
                return None;
            }
        };

        Some(field)
    }

    /// Returns the underlying constraint name as used in the database.
    #[inline]
    pub fn constraint_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintViolation::Book(c) => write!(f, "{}", c),
            ConstraintViolation::BookLoan(c) => write!(f, "{}", c),
            ConstraintViolation::BookReview(c) => write!(f, "{}", c),

            ConstraintViolation::Annotation(c) => write!(f, "{}", c),
            ConstraintViolation::AnnotationReply(c) => write!(f, "{}", c),
            ConstraintViolation::AnnotationLike(c) => write!(f, "{}", c),
        }
    }
}

impl From<ConstraintViolation> for String {
    #[inline]
    fn from(val: ConstraintViolation) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for ConstraintViolation {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).ok_or_else(|| format!("Unknown constraint: {}", value))
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn parses_by_table_prefix() {
        assert_eq!(
            ConstraintViolation::new("books_isbn_unique_idx"),
            Some(ConstraintViolation::Book(BookConstraints::IsbnUnique))
        );
        assert_eq!(
            ConstraintViolation::new("book_loans_open_unique_idx"),
            Some(ConstraintViolation::BookLoan(
                BookLoanConstraints::OpenLoanUnique
            ))
        );
        assert_eq!(
            ConstraintViolation::new("book_reviews_rating_range"),
            Some(ConstraintViolation::BookReview(
                BookReviewConstraints::RatingRange
            ))
        );
        assert_eq!(
            ConstraintViolation::new("annotation_likes_pkey"),
            Some(ConstraintViolation::AnnotationLike(
                AnnotationLikeConstraints::OneLikePerAccount
            ))
        );
        assert_eq!(ConstraintViolation::new("unknown_constraint"), None);
        assert_eq!(ConstraintViolation::new("books_nonexistent"), None);
    }

    #[test]
    fn every_variant_parses_back() {
        for c in BookConstraints::iter() {
            assert_eq!(
                ConstraintViolation::new(&c.to_string()),
                Some(ConstraintViolation::Book(c))
            );
        }
        for c in BookLoanConstraints::iter() {
            assert_eq!(
                ConstraintViolation::new(&c.to_string()),
                Some(ConstraintViolation::BookLoan(c))
            );
        }
        for c in AnnotationConstraints::iter() {
            assert_eq!(
                ConstraintViolation::new(&c.to_string()),
                Some(ConstraintViolation::Annotation(c))
            );
        }
        for c in AnnotationReplyConstraints::iter() {
            assert_eq!(
                ConstraintViolation::new(&c.to_string()),
                Some(ConstraintViolation::AnnotationReply(c))
            );
        }
    }

    #[test]
    fn table_and_area() {
        let violation = ConstraintViolation::BookLoan(BookLoanConstraints::DueAfterBorrowed);
        assert_eq!(violation.table_name(), "book_loans");
        assert_eq!(violation.functional_area(), "catalog");

        let violation =
            ConstraintViolation::AnnotationReply(AnnotationReplyConstraints::ContentLength);
        assert_eq!(violation.table_name(), "annotation_replies");
        assert_eq!(violation.functional_area(), "annotations");
    }

    #[test]
    fn categorization() {
        let cases = [
            (
                ConstraintViolation::Book(BookConstraints::TitleLength),
                ConstraintCategory::Validation,
            ),
            (
                ConstraintViolation::Book(BookConstraints::AvailableCopiesRange),
                ConstraintCategory::BusinessLogic,
            ),
            (
                ConstraintViolation::Annotation(AnnotationConstraints::DeletedAfterCreated),
                ConstraintCategory::Chronological,
            ),
            (
                ConstraintViolation::BookReview(BookReviewConstraints::ReviewerUnique),
                ConstraintCategory::Uniqueness,
            ),
        ];

        for (violation, category) in cases {
            assert_eq!(violation.constraint_category(), category);
        }
    }

    #[test]
    fn input_fields() {
        let isbn = ConstraintViolation::Book(BookConstraints::IsbnUnique);
        assert_eq!(isbn.input_field(), Some("isbn"));

        let color = ConstraintViolation::Annotation(AnnotationConstraints::ColorFormat);
        assert_eq!(color.input_field(), Some("color"));

        let open = ConstraintViolation::BookLoan(BookLoanConstraints::OpenLoanUnique);
        assert_eq!(open.input_field(), None);

        let copies = ConstraintViolation::Book(BookConstraints::AvailableCopiesRange);
        assert_eq!(copies.input_field(), None);
    }

    #[test]
    fn serde_uses_constraint_name() {
        let violation = ConstraintViolation::Annotation(AnnotationConstraints::ColorFormat);
        let json = serde_json::to_string(&violation).unwrap();
        assert_eq!(json, "\"annotations_color_format\"");

        let parsed: ConstraintViolation = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, violation);
        assert!(serde_json::from_str::<ConstraintViolation>("\"nope\"").is_err());
    }
}
