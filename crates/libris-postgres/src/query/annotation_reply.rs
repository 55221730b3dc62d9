//! Annotation reply repository.

use std::future::Future;

use diesel::dsl::max;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;
use validator::Validate;

use super::annotation::{lock_annotation, touch_annotation};
use crate::model::{
    AccountProfile, Annotation, AnnotationReply, AnnotationReplyWithAuthor, NewAnnotationReply,
    reply_timestamp,
};
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Repository for the discussion under annotations.
pub trait AnnotationReplyRepository {
    /// Appends a reply to a live annotation at `now`.
    ///
    /// The reply is never timestamped before the annotation's latest reply.
    /// Returns the annotation with its bumped `updated_at` and the reply.
    fn add_reply(
        &mut self,
        annotation_id: Uuid,
        account_id: Uuid,
        content: String,
        now: jiff::Timestamp,
    ) -> impl Future<Output = PgResult<(Annotation, AnnotationReply)>> + Send;

    /// Lists the replies to an annotation in creation order with their authors.
    fn list_annotation_replies(
        &mut self,
        annotation_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<AnnotationReplyWithAuthor>>> + Send;

    /// Counts the replies to an annotation.
    fn count_annotation_replies(
        &mut self,
        annotation_id: Uuid,
    ) -> impl Future<Output = PgResult<i64>> + Send;
}

impl AnnotationReplyRepository for PgConnection {
    async fn add_reply(
        &mut self,
        annotation_id: Uuid,
        account_id: Uuid,
        content: String,
        now: jiff::Timestamp,
    ) -> PgResult<(Annotation, AnnotationReply)> {
        use schema::annotation_replies::{self, dsl};

        let reply = NewAnnotationReply::new(annotation_id, account_id, content, now);
        reply.validate()?;

        let (annotation, reply) = self
            .transaction(|conn| {
                async move {
                    lock_annotation(conn, annotation_id).await?;

                    let latest: Option<jiff_diesel::Timestamp> = annotation_replies::table
                        .filter(dsl::annotation_id.eq(annotation_id))
                        .select(max(dsl::created_at))
                        .first(conn)
                        .await
                        .map_err(PgError::from)?;

                    let created_at = reply_timestamp(latest.map(Into::into), now);
                    let reply = NewAnnotationReply {
                        created_at: created_at.into(),
                        ..reply
                    };

                    let reply = diesel::insert_into(annotation_replies::table)
                        .values(&reply)
                        .returning(AnnotationReply::as_returning())
                        .get_result(conn)
                        .await
                        .map_err(PgError::from)?;

                    let annotation = touch_annotation(conn, annotation_id, created_at).await?;

                    Ok::<_, PgError>((annotation, reply))
                }
                .scope_boxed()
            })
            .await?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            %annotation_id,
            %account_id,
            reply_id = %reply.id,
            "Annotation reply added"
        );

        Ok((annotation, reply))
    }

    async fn list_annotation_replies(
        &mut self,
        annotation_id: Uuid,
    ) -> PgResult<Vec<AnnotationReplyWithAuthor>> {
        use schema::accounts;
        use schema::annotation_replies::{self, dsl};

        let rows: Vec<(AnnotationReply, AccountProfile)> = annotation_replies::table
            .inner_join(accounts::table)
            .filter(dsl::annotation_id.eq(annotation_id))
            .order((dsl::created_at.asc(), dsl::id.asc()))
            .select((AnnotationReply::as_select(), AccountProfile::as_select()))
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(rows
            .into_iter()
            .map(|(reply, author)| AnnotationReplyWithAuthor { reply, author })
            .collect())
    }

    async fn count_annotation_replies(&mut self, annotation_id: Uuid) -> PgResult<i64> {
        use schema::annotation_replies::{self, dsl};

        let count = annotation_replies::table
            .filter(dsl::annotation_id.eq(annotation_id))
            .count()
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(count)
    }
}
