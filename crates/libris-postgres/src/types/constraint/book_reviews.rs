//! Book reviews table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Book reviews table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum BookReviewConstraints {
    // Review validation constraints
    #[strum(serialize = "book_reviews_rating_range")]
    RatingRange,
    #[strum(serialize = "book_reviews_comment_length")]
    CommentLength,

    // Review reference constraints
    #[strum(serialize = "book_reviews_book_id_fkey")]
    BookIdFkey,

    // Review chronological constraints
    #[strum(serialize = "book_reviews_updated_after_created")]
    UpdatedAfterCreated,

    // Review uniqueness constraints
    #[strum(serialize = "book_reviews_pkey")]
    ReviewerUnique,
}

impl BookReviewConstraints {
    /// Creates a new [`BookReviewConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            BookReviewConstraints::RatingRange
            | BookReviewConstraints::CommentLength => ConstraintCategory::Validation,

            BookReviewConstraints::BookIdFkey => ConstraintCategory::BusinessLogic,

            BookReviewConstraints::UpdatedAfterCreated => ConstraintCategory::Chronological,

            BookReviewConstraints::ReviewerUnique => ConstraintCategory::Uniqueness,
        }
    }
}

impl From<BookReviewConstraints> for String {
    #[inline]
    fn from(val: BookReviewConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for BookReviewConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
