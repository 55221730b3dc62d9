//! Copy-counter state machine for a catalog entry.
//!
//! [`BookInventory`] holds the three fields that the loan lifecycle mutates
//! and enforces the availability invariant on every transition:
//!
//! - `0 <= available_copies <= total_copies`
//! - `availability == Available` implies `available_copies > 0`
//! - `availability == Borrowed` implies `available_copies == 0`
//!
//! `Reserved` and `Maintenance` are manual overrides and may coexist with any
//! counter values. The repositories load the inventory under a row lock,
//! apply a transition here, and write the result back.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::types::BookAvailability;

/// The lendable copies of a book and its availability status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInventory {
    /// Copies the library owns.
    pub total_copies: i32,
    /// Copies on the shelf.
    pub available_copies: i32,
    /// Lending status.
    pub availability: BookAvailability,
}

impl BookInventory {
    /// Creates an inventory from stored values, rejecting inconsistent ones.
    pub fn new(
        total_copies: i32,
        available_copies: i32,
        availability: BookAvailability,
    ) -> Result<Self, DomainError> {
        let this = Self {
            total_copies,
            available_copies,
            availability,
        };

        if !this.is_consistent() {
            return Err(DomainError::InvalidInventory(
                format!(
                    "{available_copies} of {total_copies} copies cannot be {availability}"
                )
                .into(),
            ));
        }

        Ok(this)
    }

    /// Creates an inventory with every copy on the shelf.
    pub fn with_total_copies(total_copies: i32) -> Result<Self, DomainError> {
        if total_copies < 0 {
            return Err(DomainError::InvalidInventory(
                "total copies cannot be negative".into(),
            ));
        }

        Ok(Self {
            total_copies,
            available_copies: total_copies,
            availability: BookAvailability::from_available_copies(total_copies),
        })
    }

    /// Returns whether a copy can be borrowed right now.
    #[inline]
    pub fn is_available(&self) -> bool {
        self.availability.is_lendable() && self.available_copies > 0
    }

    /// Returns the number of copies currently out on loan.
    #[inline]
    pub fn on_loan(&self) -> i32 {
        self.total_copies - self.available_copies
    }

    /// Returns whether the counters and status satisfy the availability invariant.
    pub fn is_consistent(&self) -> bool {
        let counters_ok = self.total_copies >= 0
            && self.available_copies >= 0
            && self.available_copies <= self.total_copies;

        let status_ok = match self.availability {
            BookAvailability::Available => self.available_copies > 0,
            BookAvailability::Borrowed => self.available_copies == 0,
            BookAvailability::Reserved | BookAvailability::Maintenance => true,
        };

        counters_ok && status_ok
    }

    /// Takes one copy off the shelf.
    ///
    /// The last copy flips the status to `Borrowed`.
    pub fn checkout(self) -> Result<Self, DomainError> {
        if !self.is_available() {
            return Err(DomainError::BookUnavailable {
                availability: self.availability,
                available_copies: self.available_copies,
            });
        }

        let available_copies = self.available_copies - 1;
        Ok(Self {
            total_copies: self.total_copies,
            available_copies,
            availability: BookAvailability::from_available_copies(available_copies),
        })
    }

    /// Puts one copy back on the shelf.
    ///
    /// The status becomes `Available`, since at least one copy is now free.
    pub fn checkin(self) -> Result<Self, DomainError> {
        if self.available_copies >= self.total_copies {
            return Err(DomainError::InventoryOverflow {
                total_copies: self.total_copies,
            });
        }

        let available_copies = self.available_copies + 1;
        Ok(Self {
            total_copies: self.total_copies,
            available_copies,
            availability: BookAvailability::from_available_copies(available_copies),
        })
    }

    /// Changes the number of owned copies, keeping copies on loan out.
    ///
    /// Fails when the new total is smaller than the number of copies on loan.
    /// A manual status is kept; otherwise the status is re-derived.
    pub fn resize(self, total_copies: i32) -> Result<Self, DomainError> {
        let on_loan = self.on_loan();
        if total_copies < on_loan {
            return Err(DomainError::InvalidInventory(
                format!("cannot shrink to {total_copies} copies while {on_loan} are on loan")
                    .into(),
            ));
        }

        let available_copies = total_copies - on_loan;
        let availability = if self.availability.is_manual() {
            self.availability
        } else {
            BookAvailability::from_available_copies(available_copies)
        };

        Ok(Self {
            total_copies,
            available_copies,
            availability,
        })
    }

    /// Applies an operator status change.
    ///
    /// `Reserved` and `Maintenance` are stored as given. `Available` and
    /// `Borrowed` both release any override and re-derive the status from
    /// the counters.
    pub fn set_availability(self, availability: BookAvailability) -> Self {
        let availability = if availability.is_manual() {
            availability
        } else {
            BookAvailability::from_available_copies(self.available_copies)
        };

        Self {
            availability,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_copies_two_borrowers_one_return() {
        let inventory = BookInventory::with_total_copies(2).unwrap();
        assert!(inventory.is_available());

        let after_a = inventory.checkout().unwrap();
        assert_eq!(after_a.available_copies, 1);
        assert_eq!(after_a.availability, BookAvailability::Available);

        let after_b = after_a.checkout().unwrap();
        assert_eq!(after_b.available_copies, 0);
        assert_eq!(after_b.availability, BookAvailability::Borrowed);
        assert!(!after_b.is_available());

        let after_return = after_b.checkin().unwrap();
        assert_eq!(after_return.available_copies, 1);
        assert_eq!(after_return.availability, BookAvailability::Available);
    }

    #[test]
    fn checkout_rejects_empty_shelf() {
        let inventory = BookInventory::new(1, 0, BookAvailability::Borrowed).unwrap();
        assert_eq!(
            inventory.checkout(),
            Err(DomainError::BookUnavailable {
                availability: BookAvailability::Borrowed,
                available_copies: 0,
            })
        );
    }

    #[test]
    fn checkout_rejects_manual_status_with_copies_left() {
        for availability in [BookAvailability::Reserved, BookAvailability::Maintenance] {
            let inventory = BookInventory::new(3, 3, availability).unwrap();
            assert!(!inventory.is_available());
            assert!(matches!(
                inventory.checkout(),
                Err(DomainError::BookUnavailable { .. })
            ));
        }
    }

    #[test]
    fn checkin_never_exceeds_total() {
        let inventory = BookInventory::with_total_copies(2).unwrap();
        assert_eq!(
            inventory.checkin(),
            Err(DomainError::InventoryOverflow { total_copies: 2 })
        );
    }

    #[test]
    fn checkout_then_checkin_restores_counters() {
        let inventory = BookInventory::with_total_copies(5).unwrap();
        let restored = inventory.checkout().unwrap().checkin().unwrap();
        assert_eq!(restored, inventory);
    }

    #[test]
    fn rejects_inconsistent_stored_values() {
        assert!(BookInventory::new(1, 2, BookAvailability::Available).is_err());
        assert!(BookInventory::new(1, -1, BookAvailability::Borrowed).is_err());
        assert!(BookInventory::new(2, 0, BookAvailability::Available).is_err());
        assert!(BookInventory::new(2, 1, BookAvailability::Borrowed).is_err());
        assert!(BookInventory::new(2, 0, BookAvailability::Maintenance).is_ok());
        assert!(BookInventory::with_total_copies(-1).is_err());
    }

    #[test]
    fn zero_copies_is_borrowed() {
        let inventory = BookInventory::with_total_copies(0).unwrap();
        assert_eq!(inventory.availability, BookAvailability::Borrowed);
        assert!(!inventory.is_available());
    }

    #[test]
    fn resize_keeps_loans_out() {
        let inventory = BookInventory::with_total_copies(3)
            .unwrap()
            .checkout()
            .unwrap()
            .checkout()
            .unwrap();
        assert_eq!(inventory.on_loan(), 2);

        let grown = inventory.resize(5).unwrap();
        assert_eq!(grown.available_copies, 3);
        assert_eq!(grown.availability, BookAvailability::Available);

        let shrunk = inventory.resize(2).unwrap();
        assert_eq!(shrunk.available_copies, 0);
        assert_eq!(shrunk.availability, BookAvailability::Borrowed);

        assert!(matches!(
            inventory.resize(1),
            Err(DomainError::InvalidInventory(_))
        ));
    }

    #[test]
    fn manual_override_and_release() {
        let inventory = BookInventory::with_total_copies(2).unwrap();
        let held = inventory.set_availability(BookAvailability::Maintenance);
        assert_eq!(held.availability, BookAvailability::Maintenance);
        assert_eq!(held.resize(4).unwrap().availability, BookAvailability::Maintenance);

        let released = held.set_availability(BookAvailability::Available);
        assert_eq!(released.availability, BookAvailability::Available);

        let empty = BookInventory::new(1, 0, BookAvailability::Reserved).unwrap();
        assert_eq!(
            empty.set_availability(BookAvailability::Available).availability,
            BookAvailability::Borrowed
        );
    }
}
