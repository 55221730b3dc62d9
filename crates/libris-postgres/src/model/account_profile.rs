//! Read-only display projection of an account.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::accounts;

/// Public profile of the account that wrote an annotation, reply or like.
///
/// The `accounts` table belongs to the user service; only these
/// display-safe columns are ever selected.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AccountProfile {
    /// Account identifier.
    pub id: Uuid,
    /// Unique handle.
    pub username: String,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Link to the avatar image.
    pub avatar_url: Option<String>,
}

impl AccountProfile {
    /// Returns the full name when known, falling back to the username.
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            self.username.clone()
        } else {
            parts.join(" ")
        }
    }

    /// Returns whether the account has an avatar.
    pub fn has_avatar(&self) -> bool {
        self.avatar_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(first: Option<&str>, last: Option<&str>) -> AccountProfile {
        AccountProfile {
            id: Uuid::nil(),
            username: "reader42".into(),
            first_name: first.map(Into::into),
            last_name: last.map(Into::into),
            avatar_url: None,
        }
    }

    #[test]
    fn display_name_prefers_full_name() {
        assert_eq!(profile(Some("Ada"), Some("Lovelace")).display_name(), "Ada Lovelace");
        assert_eq!(profile(Some("Ada"), None).display_name(), "Ada");
        assert_eq!(profile(Some("  "), None).display_name(), "reader42");
        assert_eq!(profile(None, None).display_name(), "reader42");
    }

    #[test]
    fn avatar_presence() {
        let mut p = profile(None, None);
        assert!(!p.has_avatar());
        p.avatar_url = Some("https://cdn.example.com/a.png".into());
        assert!(p.has_avatar());
    }
}
