//! Loan lifecycle repository: borrowing, returning and overdue tracking.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use super::book::{lock_book, write_inventory};
use crate::model::{Book, BookLoan, LoanHistoryPage, NewBookLoan, OpenLoans};
use crate::types::{LoanPagination, LoanStatus};
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Loads the account's open loans of a book.
async fn load_open_loans(
    conn: &mut PgConnection,
    book_id: Uuid,
    account_id: Uuid,
) -> PgResult<OpenLoans> {
    use schema::book_loans::{self, dsl};

    let loans = book_loans::table
        .filter(dsl::book_id.eq(book_id))
        .filter(dsl::borrower_id.eq(account_id))
        .filter(dsl::status.eq_any(LoanStatus::OPEN))
        .select(BookLoan::as_select())
        .load(conn)
        .await
        .map_err(PgError::from)?;

    Ok(OpenLoans::new(book_id, account_id, loans))
}

fn log_rejection(operation: &'static str, book_id: Uuid, account_id: Uuid, err: &PgError) {
    if let PgError::Domain(err) = err {
        tracing::warn!(
            target: TRACING_TARGET_QUERY,
            operation,
            %book_id,
            %account_id,
            error = %err,
            "Loan operation rejected"
        );
    }
}

/// Repository for the loan ledger of catalog entries.
///
/// Borrowing and returning lock the book row for the duration of the
/// transaction, so concurrent requests against the same book serialize and
/// the copy counters never drift from the ledger.
pub trait BookLoanRepository {
    /// Borrows one copy of a book for an account at `now`.
    ///
    /// Takes a copy off the shelf and opens a loan due one loan period later.
    /// Fails with [`DomainError::BookUnavailable`] when no copy can be lent,
    /// and with [`DomainError::DuplicateLoan`] when the account already holds
    /// an open loan of the book.
    ///
    /// [`DomainError::BookUnavailable`]: crate::DomainError::BookUnavailable
    /// [`DomainError::DuplicateLoan`]: crate::DomainError::DuplicateLoan
    fn borrow_book(
        &mut self,
        book_id: Uuid,
        account_id: Uuid,
        now: jiff::Timestamp,
    ) -> impl Future<Output = PgResult<(Book, BookLoan)>> + Send;

    /// Returns the account's earliest open loan of a book at `now`.
    ///
    /// Fails with [`DomainError::NoActiveLoan`] when the account has none.
    ///
    /// [`DomainError::NoActiveLoan`]: crate::DomainError::NoActiveLoan
    fn return_book(
        &mut self,
        book_id: Uuid,
        account_id: Uuid,
        now: jiff::Timestamp,
    ) -> impl Future<Output = PgResult<(Book, BookLoan)>> + Send;

    /// Finds the account's earliest open loan of a book.
    fn find_open_loan(
        &mut self,
        book_id: Uuid,
        account_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<BookLoan>>> + Send;

    /// Flags every borrowed loan whose due time is before `now` as overdue.
    ///
    /// Returns the number of loans flagged.
    fn mark_overdue_loans(
        &mut self,
        now: jiff::Timestamp,
    ) -> impl Future<Output = PgResult<usize>> + Send;

    /// Lists the loan history of a book, most recent first.
    ///
    /// With `include_total`, also counts every loan of the book.
    fn list_book_loans(
        &mut self,
        book_id: Uuid,
        pagination: LoanPagination,
        include_total: bool,
    ) -> impl Future<Output = PgResult<LoanHistoryPage>> + Send;

    /// Lists an account's loans in borrowing order.
    fn list_account_loans(
        &mut self,
        account_id: Uuid,
        open_only: bool,
    ) -> impl Future<Output = PgResult<Vec<BookLoan>>> + Send;
}

impl BookLoanRepository for PgConnection {
    async fn borrow_book(
        &mut self,
        book_id: Uuid,
        account_id: Uuid,
        now: jiff::Timestamp,
    ) -> PgResult<(Book, BookLoan)> {
        use schema::book_loans;

        let result = self
            .transaction(|conn| {
                async move {
                    let book = lock_book(conn, book_id).await?;

                    load_open_loans(conn, book_id, account_id)
                        .await?
                        .ensure_none()?;

                    let inventory = book.inventory().checkout()?;
                    let book = write_inventory(conn, book_id, inventory, now).await?;

                    let loan = diesel::insert_into(book_loans::table)
                        .values(NewBookLoan::new(book_id, account_id, now))
                        .returning(BookLoan::as_returning())
                        .get_result(conn)
                        .await
                        .map_err(PgError::from)?;

                    Ok::<_, PgError>((book, loan))
                }
                .scope_boxed()
            })
            .await;

        match &result {
            Ok((book, loan)) => tracing::debug!(
                target: TRACING_TARGET_QUERY,
                %book_id,
                %account_id,
                loan_id = %loan.id,
                available_copies = book.available_copies,
                availability = %book.availability,
                "Book borrowed"
            ),
            Err(err) => log_rejection("borrow", book_id, account_id, err),
        }

        result
    }

    async fn return_book(
        &mut self,
        book_id: Uuid,
        account_id: Uuid,
        now: jiff::Timestamp,
    ) -> PgResult<(Book, BookLoan)> {
        use schema::book_loans::{self, dsl};

        let result = self
            .transaction(|conn| {
                async move {
                    let book = lock_book(conn, book_id).await?;

                    let open_loans = load_open_loans(conn, book_id, account_id).await?;
                    let open_loan = open_loans.to_close()?;

                    let inventory = book.inventory().checkin()?;
                    let book = write_inventory(conn, book_id, inventory, now).await?;

                    let loan = diesel::update(book_loans::table.filter(dsl::id.eq(open_loan.id)))
                        .set((
                            dsl::status.eq(LoanStatus::Returned),
                            dsl::returned_at.eq(Some(jiff_diesel::Timestamp::from(now))),
                        ))
                        .returning(BookLoan::as_returning())
                        .get_result(conn)
                        .await
                        .map_err(PgError::from)?;

                    Ok::<_, PgError>((book, loan))
                }
                .scope_boxed()
            })
            .await;

        match &result {
            Ok((book, loan)) => tracing::debug!(
                target: TRACING_TARGET_QUERY,
                %book_id,
                %account_id,
                loan_id = %loan.id,
                available_copies = book.available_copies,
                availability = %book.availability,
                "Book returned"
            ),
            Err(err) => log_rejection("return", book_id, account_id, err),
        }

        result
    }

    async fn find_open_loan(
        &mut self,
        book_id: Uuid,
        account_id: Uuid,
    ) -> PgResult<Option<BookLoan>> {
        let open_loans = load_open_loans(self, book_id, account_id).await?;
        Ok(open_loans.into_earliest())
    }

    async fn mark_overdue_loans(&mut self, now: jiff::Timestamp) -> PgResult<usize> {
        use schema::book_loans::{self, dsl};

        let now = jiff_diesel::Timestamp::from(now);
        let flagged = diesel::update(
            book_loans::table
                .filter(dsl::status.eq(LoanStatus::Borrowed))
                .filter(dsl::due_at.lt(now)),
        )
        .set(dsl::status.eq(LoanStatus::Overdue))
        .execute(self)
        .await
        .map_err(PgError::from)?;

        tracing::debug!(target: TRACING_TARGET_QUERY, flagged, "Overdue loans flagged");

        Ok(flagged)
    }

    async fn list_book_loans(
        &mut self,
        book_id: Uuid,
        pagination: LoanPagination,
        include_total: bool,
    ) -> PgResult<LoanHistoryPage> {
        use schema::book_loans::{self, dsl};

        let total = if include_total {
            let total = book_loans::table
                .filter(dsl::book_id.eq(book_id))
                .count()
                .get_result::<i64>(self)
                .await
                .map_err(PgError::from)?;
            Some(total)
        } else {
            None
        };

        let mut query = book_loans::table
            .filter(dsl::book_id.eq(book_id))
            .into_boxed();

        if let Some(after) = pagination.after {
            let borrowed_at = jiff_diesel::Timestamp::from(after.borrowed_at);
            query = query.filter(
                dsl::borrowed_at.lt(borrowed_at).or(dsl::borrowed_at
                    .eq(borrowed_at)
                    .and(dsl::id.lt(after.loan_id))),
            );
        }

        let loans = query
            .order((dsl::borrowed_at.desc(), dsl::id.desc()))
            .limit(pagination.fetch_limit())
            .select(BookLoan::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(LoanHistoryPage::from_overfetch(
            loans,
            pagination.limit,
            total,
        ))
    }

    async fn list_account_loans(
        &mut self,
        account_id: Uuid,
        open_only: bool,
    ) -> PgResult<Vec<BookLoan>> {
        use schema::book_loans::{self, dsl};

        let mut query = book_loans::table
            .filter(dsl::borrower_id.eq(account_id))
            .into_boxed();

        if open_only {
            query = query.filter(dsl::status.eq_any(LoanStatus::OPEN));
        }

        let loans = query
            .select(BookLoan::as_select())
            .order((dsl::borrowed_at.asc(), dsl::id.asc()))
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(loans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DomainError;
    use crate::query::BookRepository;
    use crate::query::test_support::{create_account, create_book, migrated_client};

    #[tokio::test]
    #[ignore] // Requires running PostgreSQL (POSTGRES_URL)
    async fn return_without_loan_is_rejected() {
        let client = migrated_client().await;
        let mut conn = client.get_connection().await.unwrap();
        let reader = create_account(&mut conn).await;
        let book = create_book(&mut conn, reader, 1).await;

        let err = conn
            .return_book(book.id, reader, jiff::Timestamp::now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PgError::Domain(DomainError::NoActiveLoan { book_id, .. }) if book_id == book.id
        ));

        let unchanged = conn.find_book_by_id(book.id).await.unwrap().unwrap();
        assert_eq!(unchanged.available_copies, 1);
    }

    #[tokio::test]
    #[ignore] // Requires running PostgreSQL (POSTGRES_URL)
    async fn second_borrow_is_rejected_and_rolled_back() {
        let client = migrated_client().await;
        let mut conn = client.get_connection().await.unwrap();
        let reader = create_account(&mut conn).await;
        let book = create_book(&mut conn, reader, 2).await;
        let now = jiff::Timestamp::now();

        let (after_borrow, loan) = conn.borrow_book(book.id, reader, now).await.unwrap();
        assert_eq!(after_borrow.available_copies, 1);

        let err = conn.borrow_book(book.id, reader, now).await.unwrap_err();
        assert!(matches!(
            err,
            PgError::Domain(DomainError::DuplicateLoan { account_id, .. }) if account_id == reader
        ));

        let unchanged = conn.find_book_by_id(book.id).await.unwrap().unwrap();
        assert_eq!(unchanged.available_copies, 1);
        assert_eq!(
            conn.find_open_loan(book.id, reader).await.unwrap().map(|l| l.id),
            Some(loan.id)
        );

        let (after_return, returned) = conn.return_book(book.id, reader, now).await.unwrap();
        assert_eq!(returned.id, loan.id);
        assert_eq!(returned.status, LoanStatus::Returned);
        assert_eq!(after_return.available_copies, 2);
        assert!(conn.find_open_loan(book.id, reader).await.unwrap().is_none());

        let history = conn
            .list_book_loans(book.id, LoanPagination::first(10), true)
            .await
            .unwrap();
        assert_eq!(history.total, Some(1));
        assert_eq!(history.loans.len(), 1);
        assert!(history.next.is_none());
    }
}
