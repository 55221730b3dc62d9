//! Book loans table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Book loans table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum BookLoanConstraints {
    // Loan state constraints
    #[strum(serialize = "book_loans_returned_status")]
    ReturnedStatus,
    #[strum(serialize = "book_loans_book_id_fkey")]
    BookIdFkey,
    #[strum(serialize = "book_loans_borrower_id_fkey")]
    BorrowerIdFkey,

    // Loan chronological constraints
    #[strum(serialize = "book_loans_due_after_borrowed")]
    DueAfterBorrowed,
    #[strum(serialize = "book_loans_returned_after_borrowed")]
    ReturnedAfterBorrowed,

    // Loan uniqueness constraints
    #[strum(serialize = "book_loans_open_unique_idx")]
    OpenLoanUnique,
}

impl BookLoanConstraints {
    /// Creates a new [`BookLoanConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            BookLoanConstraints::ReturnedStatus
            | BookLoanConstraints::BookIdFkey
            | BookLoanConstraints::BorrowerIdFkey => ConstraintCategory::BusinessLogic,

            BookLoanConstraints::DueAfterBorrowed
            | BookLoanConstraints::ReturnedAfterBorrowed => ConstraintCategory::Chronological,

            BookLoanConstraints::OpenLoanUnique => ConstraintCategory::Uniqueness,
        }
    }
}

impl From<BookLoanConstraints> for String {
    #[inline]
    fn from(val: BookLoanConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for BookLoanConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
