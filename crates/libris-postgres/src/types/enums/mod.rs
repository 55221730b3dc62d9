//! Database enumeration types for type-safe queries.
//!
//! Each enumeration corresponds to a PostgreSQL ENUM type created by the
//! embedded migrations and round-trips through Diesel, serde and strum under
//! the same label.

// Catalog enumerations
pub mod book_availability;
pub mod book_genre;
pub mod loan_status;

// Annotation enumerations
pub mod annotation_type;

pub use annotation_type::AnnotationType;
pub use book_availability::BookAvailability;
pub use book_genre::BookGenre;
pub use loan_status::LoanStatus;
