//! Book review repository with rating aggregation.

use std::future::Future;

use diesel::dsl::{count_star, sum};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;
use validator::Validate;

use super::book::lock_book;
use crate::model::{Book, BookReview, NewBookReview, RatingSummary};
use crate::types::{OffsetPage, OffsetPagination};
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Repository for book reviews.
pub trait BookReviewRepository {
    /// Submits a review, replacing the reviewer's earlier one.
    ///
    /// The book's rating average and count are recomputed in the same
    /// transaction, so they always match the stored reviews.
    fn submit_book_review(
        &mut self,
        review: NewBookReview,
    ) -> impl Future<Output = PgResult<(BookReview, Book)>> + Send;

    /// Finds one reviewer's review of a book.
    fn find_book_review(
        &mut self,
        book_id: Uuid,
        reviewer_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<BookReview>>> + Send;

    /// Lists the reviews of a book, most recently changed first.
    fn list_book_reviews(
        &mut self,
        book_id: Uuid,
        pagination: OffsetPagination,
    ) -> impl Future<Output = PgResult<OffsetPage<BookReview>>> + Send;
}

impl BookReviewRepository for PgConnection {
    async fn submit_book_review(&mut self, review: NewBookReview) -> PgResult<(BookReview, Book)> {
        use schema::book_reviews::{self, dsl};
        use schema::books::{self, dsl as books_dsl};

        review.validate()?;
        let book_id = review.book_id;
        let now = review.updated_at;

        let (review, book) = self
            .transaction(|conn| {
                async move {
                    lock_book(conn, book_id).await?;

                    let review = diesel::insert_into(book_reviews::table)
                        .values(&review)
                        .on_conflict((dsl::book_id, dsl::reviewer_id))
                        .do_update()
                        .set((
                            dsl::rating.eq(excluded(dsl::rating)),
                            dsl::comment.eq(excluded(dsl::comment)),
                            dsl::updated_at.eq(excluded(dsl::updated_at)),
                        ))
                        .returning(BookReview::as_returning())
                        .get_result(conn)
                        .await
                        .map_err(PgError::from)?;

                    let (count, total): (i64, Option<i64>) = book_reviews::table
                        .filter(dsl::book_id.eq(book_id))
                        .select((count_star(), sum(dsl::rating)))
                        .first(conn)
                        .await
                        .map_err(PgError::from)?;

                    let summary = RatingSummary::from_totals(count, total.unwrap_or_default());

                    let book = diesel::update(books::table.filter(books_dsl::id.eq(book_id)))
                        .set((
                            books_dsl::rating_average.eq(summary.average),
                            books_dsl::rating_count.eq(summary.count),
                            books_dsl::updated_at.eq(now),
                        ))
                        .returning(Book::as_returning())
                        .get_result(conn)
                        .await
                        .map_err(PgError::from)?;

                    Ok::<_, PgError>((review, book))
                }
                .scope_boxed()
            })
            .await?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            %book_id,
            reviewer_id = %review.reviewer_id,
            rating = review.rating,
            rating_average = book.rating_average,
            rating_count = book.rating_count,
            "Book review submitted"
        );

        Ok((review, book))
    }

    async fn find_book_review(
        &mut self,
        book_id: Uuid,
        reviewer_id: Uuid,
    ) -> PgResult<Option<BookReview>> {
        use schema::book_reviews::{self, dsl};

        let review = book_reviews::table
            .filter(dsl::book_id.eq(book_id))
            .filter(dsl::reviewer_id.eq(reviewer_id))
            .select(BookReview::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(review)
    }

    async fn list_book_reviews(
        &mut self,
        book_id: Uuid,
        pagination: OffsetPagination,
    ) -> PgResult<OffsetPage<BookReview>> {
        use schema::book_reviews::{self, dsl};

        let total = if pagination.include_count {
            Some(
                book_reviews::table
                    .filter(dsl::book_id.eq(book_id))
                    .count()
                    .get_result::<i64>(self)
                    .await
                    .map_err(PgError::from)?,
            )
        } else {
            None
        };

        let reviews = book_reviews::table
            .filter(dsl::book_id.eq(book_id))
            .order((dsl::updated_at.desc(), dsl::reviewer_id.asc()))
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(BookReview::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(OffsetPage::new(reviews, total))
    }
}
