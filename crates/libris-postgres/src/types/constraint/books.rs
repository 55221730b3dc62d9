//! Books table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Books table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum BookConstraints {
    // Book field validation constraints
    #[strum(serialize = "books_title_length")]
    TitleLength,
    #[strum(serialize = "books_author_length")]
    AuthorLength,
    #[strum(serialize = "books_isbn_format")]
    IsbnFormat,
    #[strum(serialize = "books_description_length")]
    DescriptionLength,
    #[strum(serialize = "books_publisher_length")]
    PublisherLength,
    #[strum(serialize = "books_page_count_min")]
    PageCountMin,
    #[strum(serialize = "books_language_length")]
    LanguageLength,
    #[strum(serialize = "books_rating_average_range")]
    RatingAverageRange,
    #[strum(serialize = "books_rating_count_min")]
    RatingCountMin,

    // Book inventory constraints
    #[strum(serialize = "books_total_copies_min")]
    TotalCopiesMin,
    #[strum(serialize = "books_available_copies_range")]
    AvailableCopiesRange,
    #[strum(serialize = "books_availability_consistent")]
    AvailabilityConsistent,
    #[strum(serialize = "books_added_by_fkey")]
    AddedByFkey,

    // Book chronological constraints
    #[strum(serialize = "books_updated_after_created")]
    UpdatedAfterCreated,

    // Book uniqueness constraints
    #[strum(serialize = "books_isbn_unique_idx")]
    IsbnUnique,
}

impl BookConstraints {
    /// Creates a new [`BookConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            BookConstraints::TitleLength
            | BookConstraints::AuthorLength
            | BookConstraints::IsbnFormat
            | BookConstraints::DescriptionLength
            | BookConstraints::PublisherLength
            | BookConstraints::PageCountMin
            | BookConstraints::LanguageLength
            | BookConstraints::RatingAverageRange
            | BookConstraints::RatingCountMin => ConstraintCategory::Validation,

            BookConstraints::TotalCopiesMin
            | BookConstraints::AvailableCopiesRange
            | BookConstraints::AvailabilityConsistent
            | BookConstraints::AddedByFkey => ConstraintCategory::BusinessLogic,

            BookConstraints::UpdatedAfterCreated => ConstraintCategory::Chronological,

            BookConstraints::IsbnUnique => ConstraintCategory::Uniqueness,
        }
    }
}

impl From<BookConstraints> for String {
    #[inline]
    fn from(val: BookConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for BookConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
