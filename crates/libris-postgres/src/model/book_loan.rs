//! Loan ledger model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff::SignedDuration;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::DomainError;
use crate::schema::book_loans;
use crate::types::constants::loan::LOAN_PERIOD_DAYS;
use crate::types::{LoanCursor, LoanStatus};

/// Returns the lending period as a duration.
pub fn loan_period() -> SignedDuration {
    SignedDuration::from_hours(24 * LOAN_PERIOD_DAYS)
}

/// One borrowing of one copy by one account.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = book_loans)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BookLoan {
    /// Unique loan identifier.
    pub id: Uuid,
    /// Borrowed book.
    pub book_id: Uuid,
    /// Borrowing account.
    pub borrower_id: Uuid,
    /// When the copy left the shelf.
    pub borrowed_at: Timestamp,
    /// When the copy is due back.
    pub due_at: Timestamp,
    /// When the copy came back.
    pub returned_at: Option<Timestamp>,
    /// Loan state.
    pub status: LoanStatus,
}

/// Data for opening a loan.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = book_loans)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewBookLoan {
    /// Loan ID.
    pub id: Uuid,
    /// Book ID.
    pub book_id: Uuid,
    /// Borrower ID.
    pub borrower_id: Uuid,
    /// Borrow time.
    pub borrowed_at: Timestamp,
    /// Due time.
    pub due_at: Timestamp,
    /// Status.
    pub status: LoanStatus,
}

impl NewBookLoan {
    /// Opens a loan at `borrowed_at`, due one loan period later.
    pub fn new(book_id: Uuid, borrower_id: Uuid, borrowed_at: jiff::Timestamp) -> Self {
        Self {
            id: Uuid::now_v7(),
            book_id,
            borrower_id,
            borrowed_at: borrowed_at.into(),
            due_at: (borrowed_at + loan_period()).into(),
            status: LoanStatus::Borrowed,
        }
    }
}

impl BookLoan {
    /// Returns whether the copy is still out.
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    /// Returns whether the copy is out and past its due time at `now`.
    pub fn is_past_due(&self, now: jiff::Timestamp) -> bool {
        self.is_open() && jiff::Timestamp::from(self.due_at) < now
    }

    /// Returns the time left until the due time, negative once overdue.
    pub fn time_until_due(&self, now: jiff::Timestamp) -> SignedDuration {
        jiff::Timestamp::from(self.due_at).duration_since(now)
    }

    /// Returns how long the copy was or has been out.
    pub fn loan_duration(&self, now: jiff::Timestamp) -> SignedDuration {
        let end = self.returned_at.map_or(now, Into::into);
        end.duration_since(self.borrowed_at.into())
    }
}

/// An account's open loans of one book, earliest first.
///
/// Read under the book's row lock, it decides whether a borrow or a return
/// may go ahead.
#[derive(Debug, Clone)]
pub struct OpenLoans {
    book_id: Uuid,
    account_id: Uuid,
    loans: Vec<BookLoan>,
}

impl OpenLoans {
    /// Keeps the open loans among `loans`, ordered by borrowing time then id.
    pub fn new(book_id: Uuid, account_id: Uuid, mut loans: Vec<BookLoan>) -> Self {
        loans.retain(BookLoan::is_open);
        loans.sort_by_key(|loan| (jiff::Timestamp::from(loan.borrowed_at), loan.id));

        Self {
            book_id,
            account_id,
            loans,
        }
    }

    /// Fails with [`DomainError::DuplicateLoan`] if any loan is open.
    pub fn ensure_none(&self) -> Result<(), DomainError> {
        if self.loans.is_empty() {
            return Ok(());
        }

        Err(DomainError::DuplicateLoan {
            book_id: self.book_id,
            account_id: self.account_id,
        })
    }

    /// Returns the loan a return closes, or [`DomainError::NoActiveLoan`].
    pub fn to_close(&self) -> Result<&BookLoan, DomainError> {
        self.loans.first().ok_or(DomainError::NoActiveLoan {
            book_id: self.book_id,
            account_id: self.account_id,
        })
    }

    pub fn into_earliest(self) -> Option<BookLoan> {
        self.loans.into_iter().next()
    }
}

/// One page of a book's loan history, newest first.
#[derive(Debug, Clone)]
pub struct LoanHistoryPage {
    pub loans: Vec<BookLoan>,
    /// Total loans of the book, when requested.
    pub total: Option<i64>,
    /// Where the next page starts; `None` on the last page.
    pub next: Option<LoanCursor>,
}

impl LoanHistoryPage {
    /// Trims a result loaded with one row past `limit`.
    ///
    /// The extra row only signals that another page exists.
    pub fn from_overfetch(mut loans: Vec<BookLoan>, limit: i64, total: Option<i64>) -> Self {
        let limit = usize::try_from(limit).unwrap_or(0);
        let next = if loans.len() > limit {
            loans.truncate(limit);
            loans
                .last()
                .map(|loan| LoanCursor::new(loan.borrowed_at.into(), loan.id))
        } else {
            None
        };

        Self { loans, total, next }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> jiff::Timestamp {
        s.parse().unwrap()
    }

    fn loan(borrowed_at: jiff::Timestamp) -> BookLoan {
        let new = NewBookLoan::new(Uuid::now_v7(), Uuid::now_v7(), borrowed_at);
        BookLoan {
            id: new.id,
            book_id: new.book_id,
            borrower_id: new.borrower_id,
            borrowed_at: new.borrowed_at,
            due_at: new.due_at,
            returned_at: None,
            status: new.status,
        }
    }

    #[test]
    fn borrow_blocked_by_an_open_loan() {
        let book_id = Uuid::now_v7();
        let account_id = Uuid::now_v7();
        let none = OpenLoans::new(book_id, account_id, Vec::new());
        assert!(none.ensure_none().is_ok());

        let open = OpenLoans::new(book_id, account_id, vec![loan(at("2025-03-01T00:00:00Z"))]);
        assert_eq!(
            open.ensure_none(),
            Err(DomainError::DuplicateLoan {
                book_id,
                account_id
            })
        );

        let mut overdue = loan(at("2025-03-01T00:00:00Z"));
        overdue.status = LoanStatus::Overdue;
        let open = OpenLoans::new(book_id, account_id, vec![overdue]);
        assert!(open.ensure_none().is_err());
    }

    #[test]
    fn return_without_open_loan() {
        let book_id = Uuid::now_v7();
        let account_id = Uuid::now_v7();

        let mut returned = loan(at("2025-03-01T00:00:00Z"));
        returned.status = LoanStatus::Returned;
        let open = OpenLoans::new(book_id, account_id, vec![returned]);

        assert!(open.ensure_none().is_ok());
        assert_eq!(
            open.to_close(),
            Err(DomainError::NoActiveLoan {
                book_id,
                account_id
            })
        );
        assert!(open.into_earliest().is_none());
    }

    #[test]
    fn return_closes_earliest_open_loan() {
        let later = loan(at("2025-03-05T00:00:00Z"));
        let earlier = loan(at("2025-03-01T00:00:00Z"));
        let open = OpenLoans::new(Uuid::nil(), Uuid::nil(), vec![later, earlier.clone()]);

        assert_eq!(open.to_close().map(|loan| loan.id), Ok(earlier.id));
        assert_eq!(open.into_earliest(), Some(earlier));
    }

    #[test]
    fn history_page_cursor() {
        let loans: Vec<BookLoan> = (0..4)
            .map(|day| loan(at("2025-03-10T00:00:00Z") - SignedDuration::from_hours(24 * day)))
            .collect();

        let page = LoanHistoryPage::from_overfetch(loans.clone(), 3, Some(4));
        assert_eq!(page.loans.len(), 3);
        assert_eq!(page.total, Some(4));
        let next = page.next.unwrap();
        assert_eq!(next.loan_id, loans[2].id);
        assert_eq!(next.borrowed_at, at("2025-03-08T00:00:00Z"));

        let last = LoanHistoryPage::from_overfetch(loans, 4, None);
        assert_eq!(last.loans.len(), 4);
        assert!(last.next.is_none());
    }

    #[test]
    fn due_fourteen_days_after_borrowing() {
        let borrowed_at = at("2025-03-01T10:00:00Z");
        let new = NewBookLoan::new(Uuid::nil(), Uuid::nil(), borrowed_at);
        assert_eq!(jiff::Timestamp::from(new.due_at), at("2025-03-15T10:00:00Z"));
        assert_eq!(new.status, LoanStatus::Borrowed);
    }

    #[test]
    fn due_date_ignores_dst_shifts() {
        let borrowed_at = at("2025-03-25T12:00:00Z");
        let new = NewBookLoan::new(Uuid::nil(), Uuid::nil(), borrowed_at);
        assert_eq!(
            jiff::Timestamp::from(new.due_at).duration_since(borrowed_at),
            SignedDuration::from_hours(14 * 24)
        );
    }

    #[test]
    fn past_due_only_while_open() {
        let mut loan = loan(at("2025-03-01T00:00:00Z"));
        let before = at("2025-03-14T23:59:59Z");
        let after = at("2025-03-15T00:00:01Z");

        assert!(!loan.is_past_due(before));
        assert!(loan.is_past_due(after));
        assert!(loan.time_until_due(after).is_negative());

        loan.status = LoanStatus::Returned;
        loan.returned_at = Some(after.into());
        assert!(!loan.is_past_due(after));
        assert_eq!(
            loan.loan_duration(at("2025-04-01T00:00:00Z")),
            after.duration_since(at("2025-03-01T00:00:00Z"))
        );
    }
}
