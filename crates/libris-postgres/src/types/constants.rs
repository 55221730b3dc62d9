//! Constants shared by the models, validation rules and repositories.

/// Database-related constants.
pub mod database {
    /// Default pagination limit.
    pub const DEFAULT_PAGE_SIZE: i64 = 50;

    /// Maximum pagination limit.
    pub const MAX_PAGE_SIZE: i64 = 1000;

    /// Text search configuration used for the catalog search vector.
    pub const SEARCH_CONFIG: &str = "english";
}

/// Catalog entry limits.
pub mod book {
    /// Maximum title length in characters.
    pub const MAX_TITLE_LENGTH: u64 = 200;

    /// Maximum author length in characters.
    pub const MAX_AUTHOR_LENGTH: u64 = 100;

    /// Maximum description length in characters.
    pub const MAX_DESCRIPTION_LENGTH: u64 = 2000;

    /// Maximum publisher length in characters.
    pub const MAX_PUBLISHER_LENGTH: u64 = 100;

    /// Maximum language name length in characters.
    pub const MAX_LANGUAGE_LENGTH: u64 = 50;

    /// Language assumed when none is given.
    pub const DEFAULT_LANGUAGE: &str = "English";

    /// Highest average rating a book can hold.
    pub const MAX_RATING: f32 = 5.0;
}

/// Loan lifecycle constants.
pub mod loan {
    /// Number of days a copy may be kept before the loan is due.
    pub const LOAN_PERIOD_DAYS: i64 = 14;
}

/// Review limits.
pub mod review {
    /// Lowest star rating.
    pub const MIN_RATING: i16 = 1;

    /// Highest star rating.
    pub const MAX_RATING: i16 = 5;

    /// Maximum review comment length in characters.
    pub const MAX_COMMENT_LENGTH: u64 = 1000;
}

/// Annotation limits.
pub mod annotation {
    /// Maximum length of the selected passage in characters.
    pub const MAX_SELECTED_TEXT_LENGTH: u64 = 1000;

    /// Maximum note length in characters.
    pub const MAX_NOTE_LENGTH: u64 = 2000;

    /// Maximum reply length in characters.
    pub const MAX_REPLY_LENGTH: u64 = 1000;

    /// Highlight color applied when none is given.
    pub const DEFAULT_COLOR: &str = "#ffff00";

    /// Number of seconds of grace period before an annotation counts as edited.
    pub const EDIT_GRACE_PERIOD_SECONDS: i64 = 5;
}

/// Tag limits shared by books and annotations.
pub mod tag {
    /// Maximum length of a single tag in characters.
    pub const MAX_TAG_LENGTH: usize = 30;
}
