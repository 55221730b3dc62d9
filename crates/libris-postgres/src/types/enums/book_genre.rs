//! Book genre enumeration for catalog classification.

use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Literary genre a book is filed under.
///
/// This enumeration corresponds to the `BOOK_GENRE` PostgreSQL enum. A book
/// carries a set of genres, stored as an array column with a GIN index.
/// The database, serde and display names are the human-readable labels
/// (e.g. `"Science Fiction"`).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::BookGenre"]
pub enum BookGenre {
    #[db_rename = "Fiction"]
    #[serde(rename = "Fiction")]
    #[strum(serialize = "Fiction")]
    Fiction,

    #[db_rename = "Non-Fiction"]
    #[serde(rename = "Non-Fiction")]
    #[strum(serialize = "Non-Fiction")]
    NonFiction,

    #[db_rename = "Mystery"]
    #[serde(rename = "Mystery")]
    #[strum(serialize = "Mystery")]
    Mystery,

    #[db_rename = "Romance"]
    #[serde(rename = "Romance")]
    #[strum(serialize = "Romance")]
    Romance,

    #[db_rename = "Science Fiction"]
    #[serde(rename = "Science Fiction")]
    #[strum(serialize = "Science Fiction")]
    ScienceFiction,

    #[db_rename = "Fantasy"]
    #[serde(rename = "Fantasy")]
    #[strum(serialize = "Fantasy")]
    Fantasy,

    #[db_rename = "Biography"]
    #[serde(rename = "Biography")]
    #[strum(serialize = "Biography")]
    Biography,

    #[db_rename = "History"]
    #[serde(rename = "History")]
    #[strum(serialize = "History")]
    History,

    #[db_rename = "Self-Help"]
    #[serde(rename = "Self-Help")]
    #[strum(serialize = "Self-Help")]
    SelfHelp,

    #[db_rename = "Business"]
    #[serde(rename = "Business")]
    #[strum(serialize = "Business")]
    Business,

    #[db_rename = "Technology"]
    #[serde(rename = "Technology")]
    #[strum(serialize = "Technology")]
    Technology,

    #[db_rename = "Health"]
    #[serde(rename = "Health")]
    #[strum(serialize = "Health")]
    Health,

    #[db_rename = "Travel"]
    #[serde(rename = "Travel")]
    #[strum(serialize = "Travel")]
    Travel,

    #[db_rename = "Cooking"]
    #[serde(rename = "Cooking")]
    #[strum(serialize = "Cooking")]
    Cooking,

    #[db_rename = "Art"]
    #[serde(rename = "Art")]
    #[strum(serialize = "Art")]
    Art,

    #[db_rename = "Religion"]
    #[serde(rename = "Religion")]
    #[strum(serialize = "Religion")]
    Religion,

    #[db_rename = "Philosophy"]
    #[serde(rename = "Philosophy")]
    #[strum(serialize = "Philosophy")]
    Philosophy,

    #[db_rename = "Poetry"]
    #[serde(rename = "Poetry")]
    #[strum(serialize = "Poetry")]
    Poetry,

    #[db_rename = "Drama"]
    #[serde(rename = "Drama")]
    #[strum(serialize = "Drama")]
    Drama,

    #[db_rename = "Children"]
    #[serde(rename = "Children")]
    #[strum(serialize = "Children")]
    Children,

    #[db_rename = "Young Adult"]
    #[serde(rename = "Young Adult")]
    #[strum(serialize = "Young Adult")]
    YoungAdult,
}

impl BookGenre {
    /// Returns whether the genre belongs to the fiction side of the catalog.
    pub fn is_fiction(self) -> bool {
        matches!(
            self,
            BookGenre::Fiction
                | BookGenre::Mystery
                | BookGenre::Romance
                | BookGenre::ScienceFiction
                | BookGenre::Fantasy
                | BookGenre::Poetry
                | BookGenre::Drama
        )
    }

    /// Returns whether the genre targets younger readers.
    #[inline]
    pub fn is_for_young_readers(self) -> bool {
        matches!(self, BookGenre::Children | BookGenre::YoungAdult)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn labels_match_catalog_names() {
        let labels: Vec<String> = BookGenre::iter().map(|g| g.to_string()).collect();
        assert_eq!(labels.len(), 21);
        assert_eq!(labels[1], "Non-Fiction");
        assert_eq!(labels[4], "Science Fiction");
        assert_eq!(labels[8], "Self-Help");
        assert_eq!(labels[20], "Young Adult");
    }

    #[test]
    fn parses_from_label() {
        assert_eq!(
            BookGenre::from_str("Science Fiction").unwrap(),
            BookGenre::ScienceFiction
        );
        assert!(BookGenre::from_str("science-fiction").is_err());
    }

    #[test]
    fn serde_uses_label() {
        let json = serde_json::to_string(&BookGenre::YoungAdult).unwrap();
        assert_eq!(json, "\"Young Adult\"");
        let genre: BookGenre = serde_json::from_str("\"Self-Help\"").unwrap();
        assert_eq!(genre, BookGenre::SelfHelp);
    }

    #[test]
    fn fiction_split() {
        assert!(BookGenre::Fantasy.is_fiction());
        assert!(!BookGenre::Biography.is_fiction());
        assert!(BookGenre::Children.is_for_young_readers());
    }
}
