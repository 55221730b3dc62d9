//! Annotations table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Annotations table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum AnnotationConstraints {
    // Annotation content validation constraints
    #[strum(serialize = "annotations_selected_text_length")]
    SelectedTextLength,
    #[strum(serialize = "annotations_note_length")]
    NoteLength,
    #[strum(serialize = "annotations_page_number_min")]
    PageNumberMin,
    #[strum(serialize = "annotations_offsets_min")]
    OffsetsMin,
    #[strum(serialize = "annotations_offsets_order")]
    OffsetsOrder,
    #[strum(serialize = "annotations_color_format")]
    ColorFormat,

    // Annotation reference constraints
    #[strum(serialize = "annotations_book_id_fkey")]
    BookIdFkey,
    #[strum(serialize = "annotations_account_id_fkey")]
    AccountIdFkey,

    // Annotation chronological constraints
    #[strum(serialize = "annotations_updated_after_created")]
    UpdatedAfterCreated,
    #[strum(serialize = "annotations_deleted_after_created")]
    DeletedAfterCreated,
}

impl AnnotationConstraints {
    /// Creates a new [`AnnotationConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            AnnotationConstraints::SelectedTextLength
            | AnnotationConstraints::NoteLength
            | AnnotationConstraints::PageNumberMin
            | AnnotationConstraints::OffsetsMin
            | AnnotationConstraints::OffsetsOrder
            | AnnotationConstraints::ColorFormat => ConstraintCategory::Validation,

            AnnotationConstraints::BookIdFkey
            | AnnotationConstraints::AccountIdFkey => ConstraintCategory::BusinessLogic,

            AnnotationConstraints::UpdatedAfterCreated
            | AnnotationConstraints::DeletedAfterCreated => ConstraintCategory::Chronological,
        }
    }
}

impl From<AnnotationConstraints> for String {
    #[inline]
    fn from(val: AnnotationConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for AnnotationConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
