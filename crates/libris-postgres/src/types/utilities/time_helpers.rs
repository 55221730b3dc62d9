//! Timestamp accessors shared by the models.
//!
//! Every method takes the reference instant explicitly so results do not
//! depend on the wall clock.

use jiff::{SignedDuration, Timestamp};

/// Returns whether `timestamp` lies within `duration` before `now`.
pub fn is_within_duration(timestamp: Timestamp, duration: SignedDuration, now: Timestamp) -> bool {
    now.duration_since(timestamp) <= duration
}

/// Trait for models that have creation timestamps.
pub trait HasCreatedAt {
    /// Returns the creation timestamp.
    fn created_at(&self) -> Timestamp;

    /// Returns whether the entity was created within `duration` before `now`.
    fn was_created_within(&self, duration: SignedDuration, now: Timestamp) -> bool {
        is_within_duration(self.created_at(), duration, now)
    }

    /// Returns the age of the entity at `now`.
    fn creation_age(&self, now: Timestamp) -> SignedDuration {
        now.duration_since(self.created_at())
    }
}

/// Trait for models that have update timestamps.
pub trait HasUpdatedAt {
    /// Returns the last update timestamp.
    fn updated_at(&self) -> Timestamp;

    /// Returns whether the entity was updated within `duration` before `now`.
    fn was_updated_within(&self, duration: SignedDuration, now: Timestamp) -> bool {
        is_within_duration(self.updated_at(), duration, now)
    }
}

/// Trait for models that support soft deletion.
pub trait HasDeletedAt {
    /// Returns the deletion timestamp if the entity is soft-deleted.
    fn deleted_at(&self) -> Option<Timestamp>;

    /// Returns whether the entity is soft-deleted.
    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }

    /// Returns whether the entity is active (not deleted).
    fn is_active(&self) -> bool {
        !self.is_deleted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stamp {
        created_at: Timestamp,
        deleted_at: Option<Timestamp>,
    }

    impl HasCreatedAt for Stamp {
        fn created_at(&self) -> Timestamp {
            self.created_at
        }
    }

    impl HasDeletedAt for Stamp {
        fn deleted_at(&self) -> Option<Timestamp> {
            self.deleted_at
        }
    }

    #[test]
    fn created_within_window() {
        let now: Timestamp = "2025-01-10T00:00:00Z".parse().unwrap();
        let stamp = Stamp {
            created_at: "2025-01-09T12:00:00Z".parse().unwrap(),
            deleted_at: None,
        };

        assert!(stamp.was_created_within(SignedDuration::from_hours(24), now));
        assert!(!stamp.was_created_within(SignedDuration::from_hours(6), now));
        assert_eq!(stamp.creation_age(now), SignedDuration::from_hours(12));
        assert!(stamp.is_active());
    }

    #[test]
    fn soft_deleted() {
        let stamp = Stamp {
            created_at: Timestamp::UNIX_EPOCH,
            deleted_at: Some(Timestamp::UNIX_EPOCH),
        };
        assert!(stamp.is_deleted());
        assert!(!stamp.is_active());
    }
}
