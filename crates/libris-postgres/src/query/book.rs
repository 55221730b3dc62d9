//! Catalog repository for books, their inventory and search.

use std::future::Future;

use diesel::prelude::*;
use diesel::sql_types::{BigInt, Text};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;
use validator::Validate;

use crate::model::{Book, NewBook, ScoredBook, UpdateBook};
use crate::types::constants::database::SEARCH_CONFIG;
use crate::types::{BookAvailability, BookGenre, BookInventory, OffsetPagination, Tags};
use crate::{DomainError, PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Ranked full-text search over the weighted title/author/description vector.
const SEARCH_BOOKS_SQL: &str = "\
    SELECT b.id, b.title, b.author, b.isbn, b.genres, b.description, b.publisher, \
           b.published_date, b.page_count, b.language, b.cover_image_path, b.file_path, \
           b.total_copies, b.available_copies, b.availability, b.rating_average, \
           b.rating_count, b.tags, b.added_by, b.created_at, b.updated_at, \
           ts_rank(b.search_vector, q) AS rank \
    FROM books b, websearch_to_tsquery($1::regconfig, $2) q \
    WHERE b.search_vector @@ q \
    ORDER BY rank DESC, b.title ASC, b.id ASC \
    LIMIT $3 OFFSET $4";

/// Loads a book and locks its row until the surrounding transaction ends.
pub(crate) async fn lock_book(conn: &mut PgConnection, book_id: Uuid) -> PgResult<Book> {
    use schema::books::{self, dsl};

    books::table
        .filter(dsl::id.eq(book_id))
        .select(Book::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()
        .map_err(PgError::from)?
        .ok_or_else(|| DomainError::BookNotFound(book_id).into())
}

/// Writes new inventory values for a book locked by [`lock_book`].
pub(crate) async fn write_inventory(
    conn: &mut PgConnection,
    book_id: Uuid,
    inventory: BookInventory,
    now: jiff::Timestamp,
) -> PgResult<Book> {
    use schema::books::{self, dsl};

    let book = diesel::update(books::table.filter(dsl::id.eq(book_id)))
        .set((
            dsl::total_copies.eq(inventory.total_copies),
            dsl::available_copies.eq(inventory.available_copies),
            dsl::availability.eq(inventory.availability),
            dsl::updated_at.eq(jiff_diesel::Timestamp::from(now)),
        ))
        .returning(Book::as_returning())
        .get_result(conn)
        .await
        .map_err(PgError::from)?;

    Ok(book)
}

/// Repository for catalog database operations.
///
/// Handles book creation and editing, manual inventory changes, and the
/// catalog listings readers browse.
pub trait BookRepository {
    /// Adds a book to the catalog with every copy on the shelf.
    fn create_book(&mut self, new_book: NewBook) -> impl Future<Output = PgResult<Book>> + Send;

    /// Finds a book by its unique identifier.
    fn find_book_by_id(
        &mut self,
        book_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Book>>> + Send;

    /// Finds a book by ISBN, with or without separators.
    fn find_book_by_isbn(
        &mut self,
        isbn: &str,
    ) -> impl Future<Output = PgResult<Option<Book>>> + Send;

    /// Updates the descriptive fields of a book.
    fn update_book(
        &mut self,
        book_id: Uuid,
        updates: UpdateBook,
        now: jiff::Timestamp,
    ) -> impl Future<Output = PgResult<Book>> + Send;

    /// Returns whether a copy of the book can be borrowed right now.
    fn is_book_available(&mut self, book_id: Uuid) -> impl Future<Output = PgResult<bool>> + Send;

    /// Sets the lending status by hand.
    ///
    /// `Reserved` and `Maintenance` hold the book; `Available` and `Borrowed`
    /// release the hold and derive the status from the copy counters.
    fn set_book_availability(
        &mut self,
        book_id: Uuid,
        availability: BookAvailability,
        now: jiff::Timestamp,
    ) -> impl Future<Output = PgResult<Book>> + Send;

    /// Changes the number of owned copies, keeping loaned copies out.
    fn set_book_total_copies(
        &mut self,
        book_id: Uuid,
        total_copies: i32,
        now: jiff::Timestamp,
    ) -> impl Future<Output = PgResult<Book>> + Send;

    /// Lists books with a lendable copy, ordered by title.
    fn list_available_books(
        &mut self,
        pagination: OffsetPagination,
    ) -> impl Future<Output = PgResult<Vec<Book>>> + Send;

    /// Lists books filed under a genre, best rated first.
    fn list_books_by_genre(
        &mut self,
        genre: BookGenre,
        pagination: OffsetPagination,
    ) -> impl Future<Output = PgResult<Vec<Book>>> + Send;

    /// Lists books carrying any of the given tags.
    fn list_books_by_tags(
        &mut self,
        tags: &[String],
        pagination: OffsetPagination,
    ) -> impl Future<Output = PgResult<Vec<Book>>> + Send;

    /// Searches title, author and description, best match first.
    ///
    /// Accepts web-search syntax: quoted phrases, `or`, and `-word`.
    fn search_books(
        &mut self,
        query: &str,
        pagination: OffsetPagination,
    ) -> impl Future<Output = PgResult<Vec<ScoredBook>>> + Send;

    /// Counts the books in the catalog.
    fn count_books(&mut self) -> impl Future<Output = PgResult<i64>> + Send;
}

impl BookRepository for PgConnection {
    async fn create_book(&mut self, new_book: NewBook) -> PgResult<Book> {
        use schema::books;

        let new_book = new_book.normalized();
        new_book.validate()?;

        let book = diesel::insert_into(books::table)
            .values(&new_book)
            .returning(Book::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            book_id = %book.id,
            total_copies = book.total_copies,
            "Book added to catalog"
        );

        Ok(book)
    }

    async fn find_book_by_id(&mut self, book_id: Uuid) -> PgResult<Option<Book>> {
        use schema::books::{self, dsl};

        let book = books::table
            .filter(dsl::id.eq(book_id))
            .select(Book::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(book)
    }

    async fn find_book_by_isbn(&mut self, isbn: &str) -> PgResult<Option<Book>> {
        use schema::books::{self, dsl};

        let isbn = crate::types::validation::normalize_isbn(isbn);
        let book = books::table
            .filter(dsl::isbn.eq(isbn))
            .select(Book::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(book)
    }

    async fn update_book(
        &mut self,
        book_id: Uuid,
        updates: UpdateBook,
        now: jiff::Timestamp,
    ) -> PgResult<Book> {
        use schema::books::{self, dsl};

        let updates = updates.normalized();
        updates.validate()?;

        let book = diesel::update(books::table.filter(dsl::id.eq(book_id)))
            .set((&updates, dsl::updated_at.eq(jiff_diesel::Timestamp::from(now))))
            .returning(Book::as_returning())
            .get_result(self)
            .await
            .optional()
            .map_err(PgError::from)?
            .ok_or(DomainError::BookNotFound(book_id))?;

        Ok(book)
    }

    async fn is_book_available(&mut self, book_id: Uuid) -> PgResult<bool> {
        let book = self
            .find_book_by_id(book_id)
            .await?
            .ok_or(DomainError::BookNotFound(book_id))?;

        Ok(book.is_available())
    }

    async fn set_book_availability(
        &mut self,
        book_id: Uuid,
        availability: BookAvailability,
        now: jiff::Timestamp,
    ) -> PgResult<Book> {
        let book = self
            .transaction(|conn| {
                async move {
                    let book = lock_book(conn, book_id).await?;
                    let inventory = book.inventory().set_availability(availability);
                    write_inventory(conn, book_id, inventory, now).await
                }
                .scope_boxed()
            })
            .await?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            %book_id,
            requested = %availability,
            availability = %book.availability,
            "Book availability changed"
        );

        Ok(book)
    }

    async fn set_book_total_copies(
        &mut self,
        book_id: Uuid,
        total_copies: i32,
        now: jiff::Timestamp,
    ) -> PgResult<Book> {
        let result = self
            .transaction(|conn| {
                async move {
                    let book = lock_book(conn, book_id).await?;
                    let inventory = book.inventory().resize(total_copies)?;
                    write_inventory(conn, book_id, inventory, now).await
                }
                .scope_boxed()
            })
            .await;

        match &result {
            Ok(book) => tracing::debug!(
                target: TRACING_TARGET_QUERY,
                %book_id,
                total_copies = book.total_copies,
                available_copies = book.available_copies,
                "Book inventory resized"
            ),
            Err(PgError::Domain(err)) => tracing::warn!(
                target: TRACING_TARGET_QUERY,
                %book_id,
                total_copies,
                error = %err,
                "Book inventory resize rejected"
            ),
            Err(_) => {}
        }

        result
    }

    async fn list_available_books(&mut self, pagination: OffsetPagination) -> PgResult<Vec<Book>> {
        use schema::books::{self, dsl};

        let books = books::table
            .filter(dsl::availability.eq(BookAvailability::Available))
            .filter(dsl::available_copies.gt(0))
            .order((dsl::title.asc(), dsl::id.asc()))
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(Book::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(books)
    }

    async fn list_books_by_genre(
        &mut self,
        genre: BookGenre,
        pagination: OffsetPagination,
    ) -> PgResult<Vec<Book>> {
        use schema::books::{self, dsl};

        let books = books::table
            .filter(dsl::genres.contains(vec![Some(genre)]))
            .order((dsl::rating_average.desc(), dsl::title.asc(), dsl::id.asc()))
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(Book::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(books)
    }

    async fn list_books_by_tags(
        &mut self,
        tags: &[String],
        pagination: OffsetPagination,
    ) -> PgResult<Vec<Book>> {
        use schema::books::{self, dsl};

        let tags = Tags::normalize(tags);
        if tags.is_empty() {
            return Ok(vec![]);
        }

        let books = books::table
            .filter(dsl::tags.overlaps_with(tags.into_optional_strings()))
            .order((dsl::title.asc(), dsl::id.asc()))
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(Book::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(books)
    }

    async fn search_books(
        &mut self,
        query: &str,
        pagination: OffsetPagination,
    ) -> PgResult<Vec<ScoredBook>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(vec![]);
        }

        let hits = diesel::sql_query(SEARCH_BOOKS_SQL)
            .bind::<Text, _>(SEARCH_CONFIG)
            .bind::<Text, _>(query)
            .bind::<BigInt, _>(pagination.limit)
            .bind::<BigInt, _>(pagination.offset)
            .load::<ScoredBook>(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            query,
            hits = hits.len(),
            "Catalog search completed"
        );

        Ok(hits)
    }

    async fn count_books(&mut self) -> PgResult<i64> {
        use schema::books;

        let count = books::table
            .count()
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(count)
    }
}
