//! Book availability enumeration for loan eligibility.

use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Lending status of a catalog entry.
///
/// This enumeration corresponds to the `BOOK_AVAILABILITY` PostgreSQL enum.
/// `Available` and `Borrowed` are derived from the copy counters by the loan
/// lifecycle; `Reserved` and `Maintenance` are manual overrides that block
/// borrowing regardless of the counters.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::BookAvailability"]
#[strum(serialize_all = "snake_case")]
pub enum BookAvailability {
    /// At least one copy can be borrowed
    #[db_rename = "available"]
    #[serde(rename = "available")]
    #[default]
    Available,

    /// Every copy is out on loan
    #[db_rename = "borrowed"]
    #[serde(rename = "borrowed")]
    Borrowed,

    /// Held for a patron
    #[db_rename = "reserved"]
    #[serde(rename = "reserved")]
    Reserved,

    /// Withdrawn for repair or processing
    #[db_rename = "maintenance"]
    #[serde(rename = "maintenance")]
    Maintenance,
}

impl BookAvailability {
    /// Returns whether the status is an operator override rather than one
    /// derived from the copy counters.
    #[inline]
    pub fn is_manual(self) -> bool {
        matches!(
            self,
            BookAvailability::Reserved | BookAvailability::Maintenance
        )
    }

    /// Returns whether the status permits a new loan.
    #[inline]
    pub fn is_lendable(self) -> bool {
        matches!(self, BookAvailability::Available)
    }

    /// Derives the counter-driven status for the given number of free copies.
    #[inline]
    pub fn from_available_copies(available_copies: i32) -> Self {
        if available_copies > 0 {
            BookAvailability::Available
        } else {
            BookAvailability::Borrowed
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn derived_from_counters() {
        assert_eq!(
            BookAvailability::from_available_copies(3),
            BookAvailability::Available
        );
        assert_eq!(
            BookAvailability::from_available_copies(0),
            BookAvailability::Borrowed
        );
    }

    #[test]
    fn manual_overrides() {
        assert!(BookAvailability::Reserved.is_manual());
        assert!(BookAvailability::Maintenance.is_manual());
        assert!(!BookAvailability::Borrowed.is_manual());
        assert!(!BookAvailability::Reserved.is_lendable());
    }

    #[test]
    fn string_forms() {
        assert_eq!(BookAvailability::Maintenance.to_string(), "maintenance");
        assert_eq!(
            BookAvailability::from_str("reserved").unwrap(),
            BookAvailability::Reserved
        );
        assert_eq!(
            serde_json::to_string(&BookAvailability::Available).unwrap(),
            "\"available\""
        );
    }
}
