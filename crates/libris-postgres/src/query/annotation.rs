//! Annotation repository: authoring, soft deletion, listings and search.

use std::future::Future;

use diesel::dsl::{AsExprOf, sql};
use diesel::expression::{SqlLiteral, UncheckedBind};
use diesel::prelude::*;
use diesel::sql_types::{Bool, Text};
use diesel_async::RunQueryDsl;
use uuid::Uuid;
use validator::Validate;

use crate::model::{
    AccountProfile, Annotation, AnnotationStats, AnnotationWithAuthor, NewAnnotation,
    UpdateAnnotation,
};
use crate::types::validation::escape_like_pattern;
use crate::types::{AnnotationType, OffsetPagination};
use crate::{DomainError, PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

type TagMatch = SqlLiteral<Bool, UncheckedBind<SqlLiteral<Bool>, AsExprOf<String, Text>>>;

/// Matches annotations with at least one tag that matches the `ILIKE` pattern
/// on its own.
fn any_tag_matches(pattern: String) -> TagMatch {
    sql::<Bool>("EXISTS (SELECT 1 FROM unnest(annotations.tags) AS tag WHERE tag ILIKE ")
        .bind::<Text, _>(pattern)
        .sql(")")
}

/// Loads a live annotation and locks its row until the surrounding
/// transaction ends.
pub(crate) async fn lock_annotation(
    conn: &mut PgConnection,
    annotation_id: Uuid,
) -> PgResult<Annotation> {
    use schema::annotations::{self, dsl};

    annotations::table
        .filter(dsl::id.eq(annotation_id))
        .filter(dsl::deleted_at.is_null())
        .select(Annotation::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()
        .map_err(PgError::from)?
        .ok_or_else(|| DomainError::AnnotationNotFound(annotation_id).into())
}

/// Sets `updated_at` on an annotation locked by [`lock_annotation`].
pub(crate) async fn touch_annotation(
    conn: &mut PgConnection,
    annotation_id: Uuid,
    now: jiff::Timestamp,
) -> PgResult<Annotation> {
    use schema::annotations::{self, dsl};

    let annotation = diesel::update(annotations::table.filter(dsl::id.eq(annotation_id)))
        .set(dsl::updated_at.eq(jiff_diesel::Timestamp::from(now)))
        .returning(Annotation::as_returning())
        .get_result(conn)
        .await
        .map_err(PgError::from)?;

    Ok(annotation)
}

/// Repository for reader annotations.
///
/// Soft-deleted annotations are invisible to every lookup and listing here.
pub trait AnnotationRepository {
    /// Creates an annotation.
    fn create_annotation(
        &mut self,
        new_annotation: NewAnnotation,
    ) -> impl Future<Output = PgResult<Annotation>> + Send;

    /// Finds a live annotation by ID.
    fn find_annotation_by_id(
        &mut self,
        annotation_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Annotation>>> + Send;

    /// Edits the content of an annotation.
    fn update_annotation(
        &mut self,
        annotation_id: Uuid,
        updates: UpdateAnnotation,
        now: jiff::Timestamp,
    ) -> impl Future<Output = PgResult<Annotation>> + Send;

    /// Hides an annotation, keeping the row.
    fn soft_delete_annotation(
        &mut self,
        annotation_id: Uuid,
        now: jiff::Timestamp,
    ) -> impl Future<Output = PgResult<Annotation>> + Send;

    /// Lists an account's annotations on a book in reading order.
    fn list_account_book_annotations(
        &mut self,
        account_id: Uuid,
        book_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<Annotation>>> + Send;

    /// Lists the public annotations on a book with their authors.
    fn list_public_book_annotations(
        &mut self,
        book_id: Uuid,
        pagination: OffsetPagination,
    ) -> impl Future<Output = PgResult<Vec<AnnotationWithAuthor>>> + Send;

    /// Lists an account's annotations of one type on a book.
    fn list_annotations_by_type(
        &mut self,
        account_id: Uuid,
        book_id: Uuid,
        annotation_type: AnnotationType,
    ) -> impl Future<Output = PgResult<Vec<Annotation>>> + Send;

    /// Searches an account's annotations case-insensitively across the
    /// selected text, the note and the tags.
    fn search_account_annotations(
        &mut self,
        account_id: Uuid,
        query: &str,
        pagination: OffsetPagination,
    ) -> impl Future<Output = PgResult<Vec<Annotation>>> + Send;

    /// Counts the live annotations on a book.
    fn get_book_annotation_stats(
        &mut self,
        book_id: Uuid,
    ) -> impl Future<Output = PgResult<AnnotationStats>> + Send;
}

impl AnnotationRepository for PgConnection {
    async fn create_annotation(&mut self, new_annotation: NewAnnotation) -> PgResult<Annotation> {
        use schema::annotations;

        let new_annotation = new_annotation.normalized();
        new_annotation.validate()?;

        let annotation = diesel::insert_into(annotations::table)
            .values(&new_annotation)
            .returning(Annotation::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            annotation_id = %annotation.id,
            book_id = %annotation.book_id,
            account_id = %annotation.account_id,
            annotation_type = %annotation.annotation_type,
            "Annotation created"
        );

        Ok(annotation)
    }

    async fn find_annotation_by_id(&mut self, annotation_id: Uuid) -> PgResult<Option<Annotation>> {
        use schema::annotations::{self, dsl};

        let annotation = annotations::table
            .filter(dsl::id.eq(annotation_id))
            .filter(dsl::deleted_at.is_null())
            .select(Annotation::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(annotation)
    }

    async fn update_annotation(
        &mut self,
        annotation_id: Uuid,
        updates: UpdateAnnotation,
        now: jiff::Timestamp,
    ) -> PgResult<Annotation> {
        use schema::annotations::{self, dsl};

        let updates = updates.normalized();
        updates.validate()?;

        let annotation = diesel::update(
            annotations::table
                .filter(dsl::id.eq(annotation_id))
                .filter(dsl::deleted_at.is_null()),
        )
        .set((&updates, dsl::updated_at.eq(jiff_diesel::Timestamp::from(now))))
        .returning(Annotation::as_returning())
        .get_result(self)
        .await
        .optional()
        .map_err(PgError::from)?
        .ok_or(DomainError::AnnotationNotFound(annotation_id))?;

        Ok(annotation)
    }

    async fn soft_delete_annotation(
        &mut self,
        annotation_id: Uuid,
        now: jiff::Timestamp,
    ) -> PgResult<Annotation> {
        use schema::annotations::{self, dsl};

        let now = jiff_diesel::Timestamp::from(now);
        let annotation = diesel::update(
            annotations::table
                .filter(dsl::id.eq(annotation_id))
                .filter(dsl::deleted_at.is_null()),
        )
        .set((dsl::deleted_at.eq(Some(now)), dsl::updated_at.eq(now)))
        .returning(Annotation::as_returning())
        .get_result(self)
        .await
        .optional()
        .map_err(PgError::from)?
        .ok_or(DomainError::AnnotationNotFound(annotation_id))?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            %annotation_id,
            book_id = %annotation.book_id,
            "Annotation deleted"
        );

        Ok(annotation)
    }

    async fn list_account_book_annotations(
        &mut self,
        account_id: Uuid,
        book_id: Uuid,
    ) -> PgResult<Vec<Annotation>> {
        use schema::annotations::{self, dsl};

        let annotations = annotations::table
            .filter(dsl::account_id.eq(account_id))
            .filter(dsl::book_id.eq(book_id))
            .filter(dsl::deleted_at.is_null())
            .order((dsl::page_number.asc(), dsl::created_at.asc(), dsl::id.asc()))
            .select(Annotation::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(annotations)
    }

    async fn list_public_book_annotations(
        &mut self,
        book_id: Uuid,
        pagination: OffsetPagination,
    ) -> PgResult<Vec<AnnotationWithAuthor>> {
        use schema::accounts;
        use schema::annotations::{self, dsl};

        let rows: Vec<(Annotation, AccountProfile)> = annotations::table
            .inner_join(accounts::table)
            .filter(dsl::book_id.eq(book_id))
            .filter(dsl::is_private.eq(false))
            .filter(dsl::deleted_at.is_null())
            .order((dsl::page_number.asc(), dsl::created_at.asc(), dsl::id.asc()))
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select((Annotation::as_select(), AccountProfile::as_select()))
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(rows
            .into_iter()
            .map(|(annotation, author)| AnnotationWithAuthor { annotation, author })
            .collect())
    }

    async fn list_annotations_by_type(
        &mut self,
        account_id: Uuid,
        book_id: Uuid,
        annotation_type: AnnotationType,
    ) -> PgResult<Vec<Annotation>> {
        use schema::annotations::{self, dsl};

        let annotations = annotations::table
            .filter(dsl::account_id.eq(account_id))
            .filter(dsl::book_id.eq(book_id))
            .filter(dsl::annotation_type.eq(annotation_type))
            .filter(dsl::deleted_at.is_null())
            .order((dsl::page_number.asc(), dsl::created_at.asc(), dsl::id.asc()))
            .select(Annotation::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(annotations)
    }

    async fn search_account_annotations(
        &mut self,
        account_id: Uuid,
        query: &str,
        pagination: OffsetPagination,
    ) -> PgResult<Vec<Annotation>> {
        use schema::annotations::{self, dsl};

        let query = query.trim();
        if query.is_empty() {
            return Ok(vec![]);
        }

        let search_pattern = format!("%{}%", escape_like_pattern(query));

        let annotations = annotations::table
            .filter(dsl::account_id.eq(account_id))
            .filter(dsl::deleted_at.is_null())
            .filter(
                dsl::selected_text
                    .ilike(&search_pattern)
                    .or(dsl::note.ilike(&search_pattern))
                    .or(any_tag_matches(search_pattern.clone()).nullable()),
            )
            .order((dsl::updated_at.desc(), dsl::id.desc()))
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(Annotation::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            %account_id,
            hits = annotations.len(),
            "Annotation search completed"
        );

        Ok(annotations)
    }

    async fn get_book_annotation_stats(&mut self, book_id: Uuid) -> PgResult<AnnotationStats> {
        use schema::annotations::{self, dsl};

        let by_type = annotations::table
            .filter(dsl::book_id.eq(book_id))
            .filter(dsl::deleted_at.is_null())
            .group_by(dsl::annotation_type)
            .select((dsl::annotation_type, diesel::dsl::count(dsl::id)))
            .load::<(AnnotationType, i64)>(self)
            .await
            .map_err(PgError::from)?;

        let public = annotations::table
            .filter(dsl::book_id.eq(book_id))
            .filter(dsl::deleted_at.is_null())
            .filter(dsl::is_private.eq(false))
            .count()
            .get_result::<i64>(self)
            .await
            .map_err(PgError::from)?;

        Ok(AnnotationStats::from_counts(by_type, public))
    }
}

#[cfg(test)]
mod tests {
    use diesel::debug_query;
    use diesel::pg::Pg;

    use super::*;
    use crate::query::test_support::{create_account, create_book, migrated_client};

    #[test]
    fn tag_search_matches_within_one_tag() {
        let rendered = debug_query::<Pg, _>(&any_tag_matches("%sci fi%".to_owned())).to_string();

        assert!(rendered.contains("FROM unnest(annotations.tags) AS tag WHERE tag ILIKE $1"));
        assert!(rendered.contains("\"%sci fi%\""));
        assert!(!rendered.contains("array_to_string"));
    }

    #[tokio::test]
    #[ignore] // Requires running PostgreSQL (POSTGRES_URL)
    async fn soft_deleted_annotations_are_hidden() {
        let client = migrated_client().await;
        let mut conn = client.get_connection().await.unwrap();
        let reader = create_account(&mut conn).await;
        let book = create_book(&mut conn, reader, 1).await;
        let now = jiff::Timestamp::now();

        let new_annotation = NewAnnotation {
            note: Some("anarchist moon colony".into()),
            tags: vec![Some("politics".into())],
            is_private: false,
            ..NewAnnotation::new(reader, book.id, 12, now)
        };
        let annotation = conn.create_annotation(new_annotation).await.unwrap();
        assert_eq!(conn.get_book_annotation_stats(book.id).await.unwrap().total, 1);

        let deleted = conn.soft_delete_annotation(annotation.id, now).await.unwrap();
        assert!(deleted.is_deleted());

        assert!(conn.find_annotation_by_id(annotation.id).await.unwrap().is_none());
        assert!(
            conn.list_account_book_annotations(reader, book.id)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(
            conn.list_annotations_by_type(reader, book.id, annotation.annotation_type)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(
            conn.list_public_book_annotations(book.id, OffsetPagination::default())
                .await
                .unwrap()
                .is_empty()
        );
        assert!(
            conn.search_account_annotations(reader, "moon colony", OffsetPagination::default())
                .await
                .unwrap()
                .is_empty()
        );
        assert_eq!(
            conn.get_book_annotation_stats(book.id).await.unwrap(),
            AnnotationStats::default()
        );
    }

    #[tokio::test]
    #[ignore] // Requires running PostgreSQL (POSTGRES_URL)
    async fn private_annotations_join_public_listing_once_shared() {
        let client = migrated_client().await;
        let mut conn = client.get_connection().await.unwrap();
        let reader = create_account(&mut conn).await;
        let book = create_book(&mut conn, reader, 1).await;
        let now = jiff::Timestamp::now();

        let annotation = conn
            .create_annotation(NewAnnotation::new(reader, book.id, 3, now))
            .await
            .unwrap();
        assert!(annotation.is_private);
        assert!(
            conn.list_public_book_annotations(book.id, OffsetPagination::default())
                .await
                .unwrap()
                .is_empty()
        );

        let shared = UpdateAnnotation {
            is_private: Some(false),
            ..Default::default()
        };
        conn.update_annotation(annotation.id, shared, now).await.unwrap();

        let public = conn
            .list_public_book_annotations(book.id, OffsetPagination::default())
            .await
            .unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].annotation.id, annotation.id);
        assert_eq!(public[0].author.id, reader);
    }

    #[tokio::test]
    #[ignore] // Requires running PostgreSQL (POSTGRES_URL)
    async fn tag_search_does_not_span_tags() {
        let client = migrated_client().await;
        let mut conn = client.get_connection().await.unwrap();
        let reader = create_account(&mut conn).await;
        let book = create_book(&mut conn, reader, 1).await;

        let new_annotation = NewAnnotation {
            tags: vec![Some("sci".into()), Some("fi".into())],
            ..NewAnnotation::new(reader, book.id, 1, jiff::Timestamp::now())
        };
        let annotation = conn.create_annotation(new_annotation).await.unwrap();

        let pagination = OffsetPagination::default();
        assert!(
            conn.search_account_annotations(reader, "sci fi", pagination)
                .await
                .unwrap()
                .is_empty()
        );

        let found = conn
            .search_account_annotations(reader, "SCI", pagination)
            .await
            .unwrap();
        assert_eq!(found.iter().map(|a| a.id).collect::<Vec<_>>(), vec![annotation.id]);
    }
}
