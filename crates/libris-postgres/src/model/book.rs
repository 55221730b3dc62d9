//! Catalog entry model for PostgreSQL database operations.
//!
//! ## Models
//!
//! - [`Book`] - A catalog entry with its copy inventory and rating summary
//! - [`NewBook`] - Data for adding a book to the catalog
//! - [`UpdateBook`] - Descriptive fields that can be edited after creation
//! - [`ScoredBook`] - A full-text search hit with its rank

use diesel::prelude::*;
use diesel::sql_types::Float4;
use jiff_diesel::{Date, Timestamp};
use uuid::Uuid;
use validator::Validate;

use crate::schema::books;
use crate::types::constants::book;
use crate::types::validation::{normalize_isbn, validate_isbn, validate_not_blank, validate_tags};
use crate::types::{
    BookAvailability, BookGenre, BookInventory, HasCreatedAt, HasUpdatedAt, Tags,
};

/// A book in the catalog.
#[derive(Debug, Clone, PartialEq, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = books)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Book {
    /// Unique book identifier.
    pub id: Uuid,
    /// Title (1-200 characters).
    pub title: String,
    /// Author name (1-100 characters).
    pub author: String,
    /// Normalized ISBN-10 or ISBN-13, unique when present.
    pub isbn: Option<String>,
    /// Genres the book is filed under.
    pub genres: Vec<Option<BookGenre>>,
    /// Blurb or summary.
    pub description: Option<String>,
    /// Publisher name.
    pub publisher: Option<String>,
    /// Publication date.
    pub published_date: Option<Date>,
    /// Number of pages.
    pub page_count: Option<i32>,
    /// Language the edition is written in.
    pub language: String,
    /// Storage path of the cover image.
    pub cover_image_path: Option<String>,
    /// Storage path of the digital file.
    pub file_path: Option<String>,
    /// Copies the library owns.
    pub total_copies: i32,
    /// Copies on the shelf.
    pub available_copies: i32,
    /// Lending status.
    pub availability: BookAvailability,
    /// Mean review rating (0.0-5.0).
    pub rating_average: f32,
    /// Number of reviews behind the average.
    pub rating_count: i32,
    /// Lowercase tags.
    pub tags: Vec<Option<String>>,
    /// Account that added the book.
    pub added_by: Uuid,
    /// Timestamp when the book was added.
    pub created_at: Timestamp,
    /// Timestamp of the last change.
    pub updated_at: Timestamp,
}

/// Data for adding a book to the catalog.
///
/// Build it with [`NewBook::new`] and adjust the public fields. Inventory
/// fields are derived from `total_copies` by [`NewBook::normalized`], which
/// the repository calls before validating and inserting.
#[derive(Debug, Clone, Insertable, Validate)]
#[diesel(table_name = books)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewBook {
    /// Book ID.
    pub id: Uuid,
    /// Title.
    #[validate(length(min = 1, max = book::MAX_TITLE_LENGTH), custom(function = "validate_not_blank"))]
    pub title: String,
    /// Author.
    #[validate(length(min = 1, max = book::MAX_AUTHOR_LENGTH), custom(function = "validate_not_blank"))]
    pub author: String,
    /// ISBN, hyphens and spaces allowed.
    #[validate(custom(function = "validate_isbn"))]
    pub isbn: Option<String>,
    /// Genres.
    pub genres: Vec<Option<BookGenre>>,
    /// Description.
    #[validate(length(max = book::MAX_DESCRIPTION_LENGTH))]
    pub description: Option<String>,
    /// Publisher.
    #[validate(length(max = book::MAX_PUBLISHER_LENGTH))]
    pub publisher: Option<String>,
    /// Publication date.
    pub published_date: Option<Date>,
    /// Page count.
    #[validate(range(min = 1))]
    pub page_count: Option<i32>,
    /// Language.
    #[validate(length(min = 1, max = book::MAX_LANGUAGE_LENGTH))]
    pub language: String,
    /// Cover image path.
    pub cover_image_path: Option<String>,
    /// Digital file path.
    pub file_path: Option<String>,
    /// Copies owned.
    #[validate(range(min = 0, max = 10000))]
    pub total_copies: i32,
    /// Copies on the shelf.
    pub available_copies: i32,
    /// Lending status.
    pub availability: BookAvailability,
    /// Tags.
    #[validate(custom(function = "validate_tags"))]
    pub tags: Vec<Option<String>>,
    /// Creator account.
    pub added_by: Uuid,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last change time.
    pub updated_at: Timestamp,
}

/// Descriptive fields of a book that can change after creation.
///
/// Inventory moves through the loan and availability operations, and the
/// creator is immutable, so neither appears here.
#[derive(Debug, Clone, Default, AsChangeset, Validate)]
#[diesel(table_name = books)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateBook {
    /// Title.
    #[validate(length(min = 1, max = book::MAX_TITLE_LENGTH), custom(function = "validate_not_blank"))]
    pub title: Option<String>,
    /// Author.
    #[validate(length(min = 1, max = book::MAX_AUTHOR_LENGTH), custom(function = "validate_not_blank"))]
    pub author: Option<String>,
    /// ISBN.
    #[validate(custom(function = "validate_isbn"))]
    pub isbn: Option<Option<String>>,
    /// Genres.
    pub genres: Option<Vec<Option<BookGenre>>>,
    /// Description.
    #[validate(length(max = book::MAX_DESCRIPTION_LENGTH))]
    pub description: Option<Option<String>>,
    /// Publisher.
    #[validate(length(max = book::MAX_PUBLISHER_LENGTH))]
    pub publisher: Option<Option<String>>,
    /// Publication date.
    pub published_date: Option<Option<Date>>,
    /// Page count.
    #[validate(range(min = 1))]
    pub page_count: Option<Option<i32>>,
    /// Language.
    #[validate(length(min = 1, max = book::MAX_LANGUAGE_LENGTH))]
    pub language: Option<String>,
    /// Cover image path.
    pub cover_image_path: Option<Option<String>>,
    /// Digital file path.
    pub file_path: Option<Option<String>>,
    /// Tags.
    #[validate(custom(function = "validate_tags"))]
    pub tags: Option<Vec<Option<String>>>,
}

/// A full-text search hit.
#[derive(Debug, Clone, PartialEq, QueryableByName)]
pub struct ScoredBook {
    /// The matching book.
    #[diesel(embed)]
    pub book: Book,
    /// `ts_rank` of the match, higher is better.
    #[diesel(sql_type = Float4)]
    pub rank: f32,
}

impl NewBook {
    /// Creates a single-copy book with default language and no optional metadata.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        added_by: Uuid,
        now: jiff::Timestamp,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            author: author.into(),
            isbn: None,
            genres: Vec::new(),
            description: None,
            publisher: None,
            published_date: None,
            page_count: None,
            language: book::DEFAULT_LANGUAGE.to_owned(),
            cover_image_path: None,
            file_path: None,
            total_copies: 1,
            available_copies: 1,
            availability: BookAvailability::Available,
            tags: Vec::new(),
            added_by,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    /// Canonicalizes the input before it is validated and stored.
    ///
    /// Trims title and author, strips ISBN separators, normalizes tags,
    /// deduplicates genres, and puts every copy on the shelf.
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_owned();
        self.author = self.author.trim().to_owned();
        self.isbn = self
            .isbn
            .as_deref()
            .map(normalize_isbn)
            .filter(|isbn| !isbn.is_empty());
        self.tags = Tags::from_optional_strings(self.tags).into_optional_strings();

        let mut genres: Vec<BookGenre> = self.genres.into_iter().flatten().collect();
        genres.sort();
        genres.dedup();
        self.genres = genres.into_iter().map(Some).collect();

        self.available_copies = self.total_copies;
        self.availability = BookAvailability::from_available_copies(self.total_copies);
        self
    }
}

impl UpdateBook {
    /// Canonicalizes the changed fields the same way [`NewBook::normalized`] does.
    pub fn normalized(mut self) -> Self {
        self.title = self.title.map(|title| title.trim().to_owned());
        self.author = self.author.map(|author| author.trim().to_owned());
        self.isbn = self.isbn.map(|isbn| {
            isbn.as_deref()
                .map(normalize_isbn)
                .filter(|isbn| !isbn.is_empty())
        });
        self.tags = self
            .tags
            .map(|tags| Tags::from_optional_strings(tags).into_optional_strings());
        self
    }
}

impl Book {
    /// Returns the copy counters and status.
    pub fn inventory(&self) -> BookInventory {
        BookInventory {
            total_copies: self.total_copies,
            available_copies: self.available_copies,
            availability: self.availability,
        }
    }

    /// Returns whether a copy can be borrowed right now.
    pub fn is_available(&self) -> bool {
        self.inventory().is_available()
    }

    /// Returns the number of copies out on loan.
    pub fn copies_on_loan(&self) -> i32 {
        self.inventory().on_loan()
    }

    /// Returns the genres without null array entries.
    pub fn genres(&self) -> Vec<BookGenre> {
        self.genres.iter().flatten().copied().collect()
    }

    /// Returns whether the book is filed under `genre`.
    pub fn has_genre(&self, genre: BookGenre) -> bool {
        self.genres.contains(&Some(genre))
    }

    /// Returns the tags as a normalized set.
    pub fn tags(&self) -> Tags {
        Tags::from_optional_strings(self.tags.clone())
    }

    /// Returns whether the book has been reviewed at least once.
    pub fn is_rated(&self) -> bool {
        self.rating_count > 0
    }

    /// Returns the publication date as a [`jiff::civil::Date`].
    pub fn published_on(&self) -> Option<jiff::civil::Date> {
        self.published_date.map(Into::into)
    }
}

impl ScoredBook {
    /// Consumes self and returns the inner book.
    pub fn into_book(self) -> Book {
        self.book
    }
}

impl HasCreatedAt for Book {
    fn created_at(&self) -> jiff::Timestamp {
        self.created_at.into()
    }
}

impl HasUpdatedAt for Book {
    fn updated_at(&self) -> jiff::Timestamp {
        self.updated_at.into()
    }
}
