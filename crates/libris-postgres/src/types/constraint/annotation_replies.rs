//! Annotation replies table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Annotation replies table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum AnnotationReplyConstraints {
    // Reply validation constraints
    #[strum(serialize = "annotation_replies_content_length")]
    ContentLength,

    // Reply reference constraints
    #[strum(serialize = "annotation_replies_annotation_id_fkey")]
    AnnotationIdFkey,
}

impl AnnotationReplyConstraints {
    /// Creates a new [`AnnotationReplyConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            AnnotationReplyConstraints::ContentLength => ConstraintCategory::Validation,

            AnnotationReplyConstraints::AnnotationIdFkey => ConstraintCategory::BusinessLogic,
        }
    }
}

impl From<AnnotationReplyConstraints> for String {
    #[inline]
    fn from(val: AnnotationReplyConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for AnnotationReplyConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
