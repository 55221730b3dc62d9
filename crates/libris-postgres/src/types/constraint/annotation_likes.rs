//! Annotation likes table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Annotation likes table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum AnnotationLikeConstraints {
    // Like reference constraints
    #[strum(serialize = "annotation_likes_annotation_id_fkey")]
    AnnotationIdFkey,

    // Like uniqueness constraints
    #[strum(serialize = "annotation_likes_pkey")]
    OneLikePerAccount,
}

impl AnnotationLikeConstraints {
    /// Creates a new [`AnnotationLikeConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            AnnotationLikeConstraints::AnnotationIdFkey => ConstraintCategory::BusinessLogic,

            AnnotationLikeConstraints::OneLikePerAccount => ConstraintCategory::Uniqueness,
        }
    }
}

impl From<AnnotationLikeConstraints> for String {
    #[inline]
    fn from(val: AnnotationLikeConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for AnnotationLikeConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
