//! Annotation type enumeration for reader markup.

use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Kind of markup a reader placed on a page.
///
/// This enumeration corresponds to the `ANNOTATION_TYPE` PostgreSQL enum.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::AnnotationType"]
#[strum(serialize_all = "snake_case")]
pub enum AnnotationType {
    /// Highlighted passage
    #[db_rename = "highlight"]
    #[serde(rename = "highlight")]
    #[default]
    Highlight,

    /// Free-form note attached to a location
    #[db_rename = "note"]
    #[serde(rename = "note")]
    Note,

    /// Saved reading position
    #[db_rename = "bookmark"]
    #[serde(rename = "bookmark")]
    Bookmark,

    /// Discussion-oriented comment that invites replies
    #[db_rename = "comment"]
    #[serde(rename = "comment")]
    Comment,
}

impl AnnotationType {
    /// Returns whether this annotation marks a text selection.
    #[inline]
    pub fn is_highlight(self) -> bool {
        matches!(self, AnnotationType::Highlight)
    }

    /// Returns whether this annotation only records a position.
    #[inline]
    pub fn is_bookmark(self) -> bool {
        matches!(self, AnnotationType::Bookmark)
    }

    /// Returns whether this annotation usually carries written text.
    #[inline]
    pub fn has_written_content(self) -> bool {
        matches!(self, AnnotationType::Note | AnnotationType::Comment)
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn all_types_round_trip_through_strings() {
        for kind in AnnotationType::iter() {
            let label = kind.to_string();
            assert_eq!(label.parse::<AnnotationType>().unwrap(), kind);
        }
    }

    #[test]
    fn default_is_highlight() {
        assert!(AnnotationType::default().is_highlight());
        assert!(AnnotationType::Comment.has_written_content());
        assert!(!AnnotationType::Bookmark.has_written_content());
    }
}
