//! Annotation reply model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;
use validator::Validate;

use crate::model::AccountProfile;
use crate::schema::annotation_replies;
use crate::types::HasCreatedAt;
use crate::types::constants::annotation::MAX_REPLY_LENGTH;
use crate::types::validation::validate_not_blank;

/// Returns the creation time for a reply added at `now`.
///
/// Replies are listed in creation order, so a reply never gets a timestamp
/// earlier than the latest existing reply, even if the caller's clock lags.
pub fn reply_timestamp(latest: Option<jiff::Timestamp>, now: jiff::Timestamp) -> jiff::Timestamp {
    latest.map_or(now, |latest| latest.max(now))
}

/// A reply in the discussion under an annotation.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = annotation_replies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AnnotationReply {
    /// Unique reply identifier.
    pub id: Uuid,
    /// Parent annotation.
    pub annotation_id: Uuid,
    /// Author account.
    pub account_id: Uuid,
    /// Reply text (1-1000 characters).
    pub content: String,
    /// Creation time.
    pub created_at: Timestamp,
}

/// Data for adding a reply.
#[derive(Debug, Clone, Insertable, Validate)]
#[diesel(table_name = annotation_replies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAnnotationReply {
    /// Reply ID.
    pub id: Uuid,
    /// Annotation ID.
    pub annotation_id: Uuid,
    /// Author ID.
    pub account_id: Uuid,
    /// Content.
    #[validate(length(min = 1, max = MAX_REPLY_LENGTH), custom(function = "validate_not_blank"))]
    pub content: String,
    /// Creation time.
    pub created_at: Timestamp,
}

impl NewAnnotationReply {
    /// Creates a reply with trimmed content.
    pub fn new(
        annotation_id: Uuid,
        account_id: Uuid,
        content: impl Into<String>,
        created_at: jiff::Timestamp,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            annotation_id,
            account_id,
            content: content.into().trim().to_owned(),
            created_at: created_at.into(),
        }
    }
}

/// A reply together with its author's public profile.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationReplyWithAuthor {
    /// The reply.
    pub reply: AnnotationReply,
    /// Its author.
    pub author: AccountProfile,
}

impl HasCreatedAt for AnnotationReply {
    fn created_at(&self) -> jiff::Timestamp {
        self.created_at.into()
    }
}
