//! Annotation like repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use super::annotation::{lock_annotation, touch_annotation};
use crate::model::{AccountProfile, AnnotationLike, AnnotationLikeWithAuthor, LikeAction, LikeToggle};
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

async fn count_likes(conn: &mut PgConnection, annotation_id: Uuid) -> PgResult<i64> {
    use schema::annotation_likes::{self, dsl};

    let count = annotation_likes::table
        .filter(dsl::annotation_id.eq(annotation_id))
        .count()
        .get_result(conn)
        .await
        .map_err(PgError::from)?;

    Ok(count)
}

/// Repository for annotation likes.
pub trait AnnotationLikeRepository {
    /// Removes the account's like when present and adds it otherwise.
    ///
    /// Two toggles in a row leave the likes as they were.
    fn toggle_like(
        &mut self,
        annotation_id: Uuid,
        account_id: Uuid,
        now: jiff::Timestamp,
    ) -> impl Future<Output = PgResult<LikeToggle>> + Send;

    /// Returns whether the account likes the annotation.
    fn has_liked(
        &mut self,
        annotation_id: Uuid,
        account_id: Uuid,
    ) -> impl Future<Output = PgResult<bool>> + Send;

    /// Counts the likes on an annotation.
    fn count_annotation_likes(
        &mut self,
        annotation_id: Uuid,
    ) -> impl Future<Output = PgResult<i64>> + Send;

    /// Lists the likes on an annotation, oldest first, with the liking accounts.
    fn list_annotation_likes(
        &mut self,
        annotation_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<AnnotationLikeWithAuthor>>> + Send;
}

impl AnnotationLikeRepository for PgConnection {
    async fn toggle_like(
        &mut self,
        annotation_id: Uuid,
        account_id: Uuid,
        now: jiff::Timestamp,
    ) -> PgResult<LikeToggle> {
        use schema::annotation_likes::{self, dsl};

        let toggle = self
            .transaction(|conn| {
                async move {
                    lock_annotation(conn, annotation_id).await?;

                    let removed = diesel::delete(
                        annotation_likes::table
                            .filter(dsl::annotation_id.eq(annotation_id))
                            .filter(dsl::account_id.eq(account_id)),
                    )
                    .execute(conn)
                    .await
                    .map_err(PgError::from)?;

                    let action = LikeAction::from_removed(removed);
                    if action.is_liked() {
                        diesel::insert_into(annotation_likes::table)
                            .values(AnnotationLike::new(annotation_id, account_id, now))
                            .on_conflict_do_nothing()
                            .execute(conn)
                            .await
                            .map_err(PgError::from)?;
                    }

                    let like_count = count_likes(conn, annotation_id).await?;
                    touch_annotation(conn, annotation_id, now).await?;

                    Ok::<_, PgError>(LikeToggle { action, like_count })
                }
                .scope_boxed()
            })
            .await?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            %annotation_id,
            %account_id,
            action = %toggle.action,
            like_count = toggle.like_count,
            "Annotation like toggled"
        );

        Ok(toggle)
    }

    async fn has_liked(&mut self, annotation_id: Uuid, account_id: Uuid) -> PgResult<bool> {
        use schema::annotation_likes::{self, dsl};

        let liked = diesel::select(diesel::dsl::exists(
            annotation_likes::table
                .filter(dsl::annotation_id.eq(annotation_id))
                .filter(dsl::account_id.eq(account_id)),
        ))
        .get_result(self)
        .await
        .map_err(PgError::from)?;

        Ok(liked)
    }

    async fn count_annotation_likes(&mut self, annotation_id: Uuid) -> PgResult<i64> {
        count_likes(self, annotation_id).await
    }

    async fn list_annotation_likes(
        &mut self,
        annotation_id: Uuid,
    ) -> PgResult<Vec<AnnotationLikeWithAuthor>> {
        use schema::accounts;
        use schema::annotation_likes::{self, dsl};

        let rows: Vec<(AnnotationLike, AccountProfile)> = annotation_likes::table
            .inner_join(accounts::table)
            .filter(dsl::annotation_id.eq(annotation_id))
            .order((dsl::liked_at.asc(), dsl::account_id.asc()))
            .select((AnnotationLike::as_select(), AccountProfile::as_select()))
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(rows
            .into_iter()
            .map(|(like, author)| AnnotationLikeWithAuthor { like, author })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewAnnotation;
    use crate::query::AnnotationRepository;
    use crate::query::test_support::{create_account, create_book, migrated_client};

    #[tokio::test]
    #[ignore] // Requires running PostgreSQL (POSTGRES_URL)
    async fn toggling_twice_restores_likes() {
        let client = migrated_client().await;
        let mut conn = client.get_connection().await.unwrap();
        let author = create_account(&mut conn).await;
        let reader = create_account(&mut conn).await;
        let book = create_book(&mut conn, author, 1).await;
        let now = jiff::Timestamp::now();

        let annotation = conn
            .create_annotation(NewAnnotation::new(author, book.id, 7, now))
            .await
            .unwrap();
        conn.toggle_like(annotation.id, author, now).await.unwrap();

        let liked = conn.toggle_like(annotation.id, reader, now).await.unwrap();
        assert_eq!(liked.action, LikeAction::Liked);
        assert_eq!(liked.like_count, 2);
        assert!(conn.has_liked(annotation.id, reader).await.unwrap());

        let unliked = conn.toggle_like(annotation.id, reader, now).await.unwrap();
        assert_eq!(unliked.action, LikeAction::Unliked);
        assert_eq!(unliked.like_count, 1);
        assert!(!conn.has_liked(annotation.id, reader).await.unwrap());
        assert!(conn.has_liked(annotation.id, author).await.unwrap());
        assert_eq!(conn.count_annotation_likes(annotation.id).await.unwrap(), 1);

        let likes = conn.list_annotation_likes(annotation.id).await.unwrap();
        assert_eq!(likes.len(), 1);
        assert_eq!(likes[0].author.id, author);
    }
}
