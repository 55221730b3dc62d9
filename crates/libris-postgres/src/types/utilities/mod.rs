//! Utility modules for common functionality across the models.

mod clock;
mod tags;
mod time_helpers;

pub use clock::{Clock, ManualClock, SystemClock};
pub use tags::Tags;
pub use time_helpers::{HasCreatedAt, HasDeletedAt, HasUpdatedAt, is_within_duration};
