//! Book review model and rating aggregation.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::schema::book_reviews;
use crate::types::constants::{book, review};
use crate::types::validation::validate_not_blank;
use crate::types::{HasCreatedAt, HasUpdatedAt};

/// A reader's rating of a book, one per reviewer.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = book_reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BookReview {
    /// Reviewed book.
    pub book_id: Uuid,
    /// Reviewing account.
    pub reviewer_id: Uuid,
    /// Rating from 1 to 5.
    pub rating: i16,
    /// Optional comment (up to 1000 characters).
    pub comment: Option<String>,
    /// First submission time.
    pub created_at: Timestamp,
    /// Last resubmission time.
    pub updated_at: Timestamp,
}

/// Data for submitting or replacing a review.
#[derive(Debug, Clone, Insertable, Validate)]
#[diesel(table_name = book_reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewBookReview {
    /// Book ID.
    pub book_id: Uuid,
    /// Reviewer ID.
    pub reviewer_id: Uuid,
    /// Rating.
    #[validate(range(min = review::MIN_RATING, max = review::MAX_RATING))]
    pub rating: i16,
    /// Comment.
    #[validate(length(max = review::MAX_COMMENT_LENGTH), custom(function = "validate_not_blank"))]
    pub comment: Option<String>,
    /// Submission time.
    pub created_at: Timestamp,
    /// Submission time.
    pub updated_at: Timestamp,
}

impl NewBookReview {
    /// Creates a review submitted at `now`.
    pub fn new(
        book_id: Uuid,
        reviewer_id: Uuid,
        rating: i16,
        comment: Option<String>,
        now: jiff::Timestamp,
    ) -> Self {
        Self {
            book_id,
            reviewer_id,
            rating,
            comment,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }
}

/// Average rating and review count of a book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    /// Mean rating, 0.0 when unrated.
    pub average: f32,
    /// Number of reviews.
    pub count: i32,
}

impl RatingSummary {
    /// Builds the summary from the number of reviews and the sum of their ratings.
    pub fn from_totals(count: i64, sum: i64) -> Self {
        if count <= 0 {
            return Self::default();
        }

        let average = (sum as f64 / count as f64) as f32;
        Self {
            average: average.clamp(0.0, book::MAX_RATING),
            count: i32::try_from(count).unwrap_or(i32::MAX),
        }
    }

    /// Builds the summary from individual ratings.
    pub fn from_ratings(ratings: &[i16]) -> Self {
        let sum = ratings.iter().map(|&rating| i64::from(rating)).sum();
        Self::from_totals(ratings.len() as i64, sum)
    }
}

impl HasCreatedAt for BookReview {
    fn created_at(&self) -> jiff::Timestamp {
        self.created_at.into()
    }
}

impl HasUpdatedAt for BookReview {
    fn updated_at(&self) -> jiff::Timestamp {
        self.updated_at.into()
    }
}
