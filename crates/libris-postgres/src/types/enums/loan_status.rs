//! Loan status enumeration for borrow records.

use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Lifecycle state of a single loan.
///
/// This enumeration corresponds to the `LOAN_STATUS` PostgreSQL enum.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::LoanStatus"]
#[strum(serialize_all = "snake_case")]
pub enum LoanStatus {
    /// The copy is out and not yet due
    #[db_rename = "borrowed"]
    #[serde(rename = "borrowed")]
    #[default]
    Borrowed,

    /// The copy has been returned
    #[db_rename = "returned"]
    #[serde(rename = "returned")]
    Returned,

    /// The copy is out past its due date
    #[db_rename = "overdue"]
    #[serde(rename = "overdue")]
    Overdue,
}

impl LoanStatus {
    /// Statuses of loans that still hold a copy.
    pub const OPEN: [LoanStatus; 2] = [LoanStatus::Borrowed, LoanStatus::Overdue];

    /// Returns whether the loan still holds a copy and can be returned.
    #[inline]
    pub fn is_open(self) -> bool {
        !matches!(self, LoanStatus::Returned)
    }

    /// Returns whether the loan has been closed.
    #[inline]
    pub fn is_returned(self) -> bool {
        matches!(self, LoanStatus::Returned)
    }
}
