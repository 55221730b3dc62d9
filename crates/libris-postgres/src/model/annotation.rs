//! Annotation model for PostgreSQL database operations.
//!
//! An annotation is one reader's markup at a page of a book: a highlight,
//! note, bookmark or comment. Replies and likes live in their own tables
//! and are owned by the annotation.

use diesel::prelude::*;
use jiff::SignedDuration;
use jiff_diesel::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::model::AccountProfile;
use crate::schema::annotations;
use crate::types::constants::annotation::{
    DEFAULT_COLOR, EDIT_GRACE_PERIOD_SECONDS, MAX_NOTE_LENGTH, MAX_SELECTED_TEXT_LENGTH,
};
use crate::types::validation::{
    validate_hex_color, validate_not_blank, validate_tags, validation_error,
};
use crate::types::{AnnotationType, HasCreatedAt, HasDeletedAt, HasUpdatedAt, Tags};

/// Page rectangle an annotation covers, stored as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl AnnotationRect {
    /// Returns whether every component is finite and the size is not negative.
    pub fn is_valid(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width >= 0.0
            && self.height >= 0.0
    }

    /// Converts the rectangle into its stored JSON form.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "x": self.x,
            "y": self.y,
            "width": self.width,
            "height": self.height,
        })
    }
}

fn validate_coordinates(value: &serde_json::Value) -> Result<(), ValidationError> {
    let rect: AnnotationRect = serde_json::from_value(value.clone()).map_err(|_| {
        validation_error(
            "coordinates_shape",
            "Coordinates must be an object with x, y, width and height",
        )
    })?;

    if !rect.is_valid() {
        return Err(validation_error(
            "coordinates_range",
            "Coordinates must be finite with a non-negative size",
        ));
    }

    Ok(())
}

fn validate_offset_order(annotation: &NewAnnotation) -> Result<(), ValidationError> {
    match (annotation.start_offset, annotation.end_offset) {
        (Some(start), Some(end)) if start > end => Err(validation_error(
            "offsets_order",
            "Start offset cannot be after end offset",
        )),
        _ => Ok(()),
    }
}

/// A reader's markup on a book.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = annotations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Annotation {
    /// Unique annotation identifier.
    pub id: Uuid,
    /// Author account.
    pub account_id: Uuid,
    /// Annotated book.
    pub book_id: Uuid,
    /// Kind of markup.
    pub annotation_type: AnnotationType,
    /// Quoted passage (up to 1000 characters).
    pub selected_text: Option<String>,
    /// Reader's note (up to 2000 characters).
    pub note: Option<String>,
    /// Page the markup is on, starting at 1.
    pub page_number: i32,
    /// Character offset where the selection starts.
    pub start_offset: Option<i32>,
    /// Character offset where the selection ends.
    pub end_offset: Option<i32>,
    /// Page rectangle, see [`AnnotationRect`].
    pub coordinates: Option<serde_json::Value>,
    /// Hex display color.
    pub color: String,
    /// Whether only the author can see it.
    pub is_private: bool,
    /// Lowercase tags.
    pub tags: Vec<Option<String>>,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last change, including new replies and likes.
    pub updated_at: Timestamp,
    /// Soft-deletion time.
    pub deleted_at: Option<Timestamp>,
}

/// Data for creating an annotation.
#[derive(Debug, Clone, Insertable, Validate)]
#[diesel(table_name = annotations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[validate(schema(function = "validate_offset_order"))]
pub struct NewAnnotation {
    /// Annotation ID.
    pub id: Uuid,
    /// Author ID.
    pub account_id: Uuid,
    /// Book ID.
    pub book_id: Uuid,
    /// Type.
    pub annotation_type: AnnotationType,
    /// Selected text.
    #[validate(length(max = MAX_SELECTED_TEXT_LENGTH))]
    pub selected_text: Option<String>,
    /// Note.
    #[validate(length(max = MAX_NOTE_LENGTH))]
    pub note: Option<String>,
    /// Page number.
    #[validate(range(min = 1))]
    pub page_number: i32,
    /// Start offset.
    #[validate(range(min = 0))]
    pub start_offset: Option<i32>,
    /// End offset.
    #[validate(range(min = 0))]
    pub end_offset: Option<i32>,
    /// Page rectangle.
    #[validate(custom(function = "validate_coordinates"))]
    pub coordinates: Option<serde_json::Value>,
    /// Color.
    #[validate(custom(function = "validate_hex_color"))]
    pub color: String,
    /// Privacy flag.
    pub is_private: bool,
    /// Tags.
    #[validate(custom(function = "validate_tags"))]
    pub tags: Vec<Option<String>>,
    /// Creation time.
    pub created_at: Timestamp,
    /// Creation time.
    pub updated_at: Timestamp,
}

/// Content of an annotation that its author can edit.
///
/// Position fields and ownership are fixed at creation.
#[derive(Debug, Clone, Default, AsChangeset, Validate)]
#[diesel(table_name = annotations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateAnnotation {
    /// Type.
    pub annotation_type: Option<AnnotationType>,
    /// Selected text.
    #[validate(length(max = MAX_SELECTED_TEXT_LENGTH))]
    pub selected_text: Option<Option<String>>,
    /// Note.
    #[validate(length(max = MAX_NOTE_LENGTH), custom(function = "validate_not_blank"))]
    pub note: Option<Option<String>>,
    /// Page rectangle.
    #[validate(custom(function = "validate_coordinates"))]
    pub coordinates: Option<Option<serde_json::Value>>,
    /// Color.
    #[validate(custom(function = "validate_hex_color"))]
    pub color: Option<String>,
    /// Privacy flag.
    pub is_private: Option<bool>,
    /// Tags.
    #[validate(custom(function = "validate_tags"))]
    pub tags: Option<Vec<Option<String>>>,
}

/// An annotation together with its author's public profile.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationWithAuthor {
    /// The annotation.
    pub annotation: Annotation,
    /// Its author.
    pub author: AccountProfile,
}

/// Annotation counts for one book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationStats {
    /// Live annotations.
    pub total: i64,
    /// Highlights.
    pub highlights: i64,
    /// Notes.
    pub notes: i64,
    /// Bookmarks.
    pub bookmarks: i64,
    /// Comments.
    pub comments: i64,
    /// Annotations visible to other readers.
    pub public: i64,
}

impl AnnotationStats {
    /// Builds the stats from per-type counts and the public count.
    pub fn from_counts(
        by_type: impl IntoIterator<Item = (AnnotationType, i64)>,
        public: i64,
    ) -> Self {
        let mut stats = Self {
            public,
            ..Self::default()
        };

        for (annotation_type, count) in by_type {
            stats.total += count;
            match annotation_type {
                AnnotationType::Highlight => stats.highlights += count,
                AnnotationType::Note => stats.notes += count,
                AnnotationType::Bookmark => stats.bookmarks += count,
                AnnotationType::Comment => stats.comments += count,
            }
        }

        stats
    }

    /// Returns the count for one type.
    pub fn count_of(&self, annotation_type: AnnotationType) -> i64 {
        match annotation_type {
            AnnotationType::Highlight => self.highlights,
            AnnotationType::Note => self.notes,
            AnnotationType::Bookmark => self.bookmarks,
            AnnotationType::Comment => self.comments,
        }
    }
}

impl NewAnnotation {
    /// Creates a private highlight on `page_number` with the default color.
    pub fn new(account_id: Uuid, book_id: Uuid, page_number: i32, now: jiff::Timestamp) -> Self {
        Self {
            id: Uuid::now_v7(),
            account_id,
            book_id,
            annotation_type: AnnotationType::default(),
            selected_text: None,
            note: None,
            page_number,
            start_offset: None,
            end_offset: None,
            coordinates: None,
            color: DEFAULT_COLOR.to_owned(),
            is_private: true,
            tags: Vec::new(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    /// Sets the page rectangle.
    pub fn with_rect(mut self, rect: AnnotationRect) -> Self {
        self.coordinates = Some(rect.to_json());
        self
    }

    /// Normalizes tags before validation and insertion.
    pub fn normalized(mut self) -> Self {
        self.tags = Tags::from_optional_strings(self.tags).into_optional_strings();
        self.color = self.color.trim().to_owned();
        self
    }
}

impl UpdateAnnotation {
    /// Normalizes tags before validation and update.
    pub fn normalized(mut self) -> Self {
        self.tags = self
            .tags
            .map(|tags| Tags::from_optional_strings(tags).into_optional_strings());
        self.color = self.color.map(|color| color.trim().to_owned());
        self
    }
}

impl Annotation {
    /// Returns whether the annotation has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns whether other readers can see the annotation.
    pub fn is_public(&self) -> bool {
        !self.is_private && !self.is_deleted()
    }

    /// Returns whether `account_id` wrote the annotation.
    pub fn is_authored_by(&self, account_id: Uuid) -> bool {
        self.account_id == account_id
    }

    /// Returns the page rectangle if one is stored and well formed.
    pub fn rect(&self) -> Option<AnnotationRect> {
        self.coordinates
            .as_ref()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Returns the tags as a normalized set.
    pub fn tags(&self) -> Tags {
        Tags::from_optional_strings(self.tags.clone())
    }

    /// Returns whether the annotation changed after it was created.
    ///
    /// Changes within a few seconds of creation do not count.
    pub fn is_edited(&self) -> bool {
        let created_at: jiff::Timestamp = self.created_at.into();
        let updated_at: jiff::Timestamp = self.updated_at.into();
        updated_at.duration_since(created_at) > SignedDuration::from_secs(EDIT_GRACE_PERIOD_SECONDS)
    }
}

impl HasCreatedAt for Annotation {
    fn created_at(&self) -> jiff::Timestamp {
        self.created_at.into()
    }
}

impl HasUpdatedAt for Annotation {
    fn updated_at(&self) -> jiff::Timestamp {
        self.updated_at.into()
    }
}

impl HasDeletedAt for Annotation {
    fn deleted_at(&self) -> Option<jiff::Timestamp> {
        self.deleted_at.map(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_annotation() -> NewAnnotation {
        NewAnnotation::new(Uuid::now_v7(), Uuid::now_v7(), 12, jiff::Timestamp::UNIX_EPOCH)
    }

    #[test]
    fn private_yellow_highlight_by_default() {
        let annotation = new_annotation();
        assert!(annotation.is_private);
        assert_eq!(annotation.color, "#ffff00");
        assert_eq!(annotation.annotation_type, AnnotationType::Highlight);
        assert!(annotation.validate().is_ok());
    }

    #[test]
    fn rejects_bad_position() {
        let mut annotation = new_annotation();
        annotation.page_number = 0;
        assert!(annotation.validate().is_err());

        let mut annotation = new_annotation();
        annotation.start_offset = Some(40);
        annotation.end_offset = Some(10);
        assert!(annotation.validate().is_err());

        let mut annotation = new_annotation();
        annotation.start_offset = Some(10);
        annotation.end_offset = Some(10);
        assert!(annotation.validate().is_ok());

        let mut annotation = new_annotation();
        annotation.start_offset = Some(-1);
        assert!(annotation.validate().is_err());
    }

    #[test]
    fn rejects_bad_content() {
        let mut annotation = new_annotation();
        annotation.color = "yellow".into();
        assert!(annotation.validate().is_err());

        let mut annotation = new_annotation();
        annotation.selected_text = Some("s".repeat(1001));
        assert!(annotation.validate().is_err());

        let mut annotation = new_annotation();
        annotation.coordinates = Some(serde_json::json!({ "x": 1 }));
        assert!(annotation.validate().is_err());

        let annotation = new_annotation().with_rect(AnnotationRect {
            x: 0.1,
            y: 0.2,
            width: -1.0,
            height: 0.1,
        });
        assert!(annotation.validate().is_err());
    }

    #[test]
    fn rect_round_trips_through_json() {
        let rect = AnnotationRect {
            x: 10.0,
            y: 20.5,
            width: 100.0,
            height: 12.0,
        };
        let new = new_annotation().with_rect(rect);
        assert!(new.validate().is_ok());

        let annotation = Annotation {
            id: new.id,
            account_id: new.account_id,
            book_id: new.book_id,
            annotation_type: new.annotation_type,
            selected_text: None,
            note: None,
            page_number: new.page_number,
            start_offset: None,
            end_offset: None,
            coordinates: new.coordinates,
            color: new.color,
            is_private: false,
            tags: Vec::new(),
            created_at: new.created_at,
            updated_at: new.updated_at,
            deleted_at: None,
        };
        assert_eq!(annotation.rect(), Some(rect));
        assert!(annotation.is_public());
        assert!(!annotation.is_edited());
    }

    #[test]
    fn stats_from_counts() {
        let stats = AnnotationStats::from_counts(
            [(AnnotationType::Highlight, 4), (AnnotationType::Note, 2)],
            3,
        );
        assert_eq!(stats.total, 6);
        assert_eq!(stats.count_of(AnnotationType::Highlight), 4);
        assert_eq!(stats.count_of(AnnotationType::Bookmark), 0);
        assert_eq!(stats.public, 3);
    }

    #[test]
    fn update_normalizes_tags() {
        let update = UpdateAnnotation {
            tags: Some(vec![Some("Quote".into()), Some("quote ".into())]),
            color: Some(" #abc ".into()),
            ..Default::default()
        }
        .normalized();
        assert_eq!(update.tags, Some(vec![Some("quote".into())]));
        assert!(update.validate().is_ok());
    }
}
