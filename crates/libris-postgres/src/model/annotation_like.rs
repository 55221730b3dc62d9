//! Annotation like model and toggle outcome.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::model::AccountProfile;
use crate::schema::annotation_likes;

/// One account's like of an annotation.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable)]
#[diesel(table_name = annotation_likes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AnnotationLike {
    /// Liked annotation.
    pub annotation_id: Uuid,
    /// Liking account.
    pub account_id: Uuid,
    /// When the like was added.
    pub liked_at: Timestamp,
}

impl AnnotationLike {
    /// Creates a like recorded at `now`.
    pub fn new(annotation_id: Uuid, account_id: Uuid, now: jiff::Timestamp) -> Self {
        Self {
            annotation_id,
            account_id,
            liked_at: now.into(),
        }
    }
}

/// What a like toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumString)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LikeAction {
    /// The like was added.
    Liked,
    /// The like was removed.
    Unliked,
}

impl LikeAction {
    /// Derives the action from the number of likes the toggle deleted.
    ///
    /// A toggle first removes the account's like; when nothing was removed it
    /// adds one instead.
    pub fn from_removed(removed: usize) -> Self {
        if removed > 0 {
            LikeAction::Unliked
        } else {
            LikeAction::Liked
        }
    }

    /// Returns whether the account likes the annotation after the toggle.
    pub fn is_liked(self) -> bool {
        matches!(self, LikeAction::Liked)
    }
}

/// Result of toggling a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct LikeToggle {
    /// What the toggle did.
    pub action: LikeAction,
    /// Likes on the annotation after the toggle.
    pub like_count: i64,
}

/// A like together with the liking account's public profile.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationLikeWithAuthor {
    /// The like.
    pub like: AnnotationLike,
    /// The liking account.
    pub author: AccountProfile,
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    /// Mirrors the delete-then-insert statements against an in-memory set.
    fn toggle(likes: &mut HashSet<Uuid>, account_id: Uuid) -> LikeToggle {
        let removed = usize::from(likes.remove(&account_id));
        let action = LikeAction::from_removed(removed);
        if action.is_liked() {
            likes.insert(account_id);
        }
        LikeToggle {
            action,
            like_count: likes.len() as i64,
        }
    }

    #[test]
    fn two_toggles_restore_state() {
        let reader = Uuid::now_v7();
        let other = Uuid::now_v7();
        let mut likes = HashSet::from([other]);

        let first = toggle(&mut likes, reader);
        assert_eq!(first.action, LikeAction::Liked);
        assert_eq!(first.like_count, 2);

        let second = toggle(&mut likes, reader);
        assert_eq!(second.action, LikeAction::Unliked);
        assert_eq!(second.like_count, 1);
        assert_eq!(likes, HashSet::from([other]));
    }

    #[test]
    fn action_labels() {
        assert_eq!(LikeAction::Liked.to_string(), "liked");
        assert_eq!(
            serde_json::to_string(&LikeAction::Unliked).unwrap(),
            "\"unliked\""
        );
        assert_eq!("liked".parse::<LikeAction>().unwrap(), LikeAction::Liked);
    }
}
