//! Normalized tag sets shared by books and annotations.

use serde::{Deserialize, Serialize};

/// A set of lowercase, trimmed, non-empty tags in first-seen order.
///
/// Books and annotations store tags as a text array. Every tag that reaches
/// the database goes through [`Tags::normalize`], so lookups and overlap
/// queries can compare exact strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Tags(Vec<String>);

impl Tags {
    /// Creates a new empty tag set.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Normalizes arbitrary input into a tag set.
    ///
    /// Each tag is trimmed and lowercased; empty entries and duplicates are
    /// dropped.
    pub fn normalize<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut this = Self::new();
        for tag in tags {
            this.add(tag.as_ref());
        }
        this
    }

    /// Parses a comma-separated list such as `"classics, Russian ,drama"`.
    pub fn from_comma_separated(input: &str) -> Self {
        Self::normalize(input.split(','))
    }

    /// Adds a tag after normalizing it.
    ///
    /// Returns `true` if the tag was not already present.
    pub fn add(&mut self, tag: &str) -> bool {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() || self.0.contains(&tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    /// Removes a tag, matching case-insensitively.
    pub fn remove(&mut self, tag: &str) -> bool {
        let tag = tag.trim().to_lowercase();
        let initial_len = self.0.len();
        self.0.retain(|t| *t != tag);
        self.0.len() != initial_len
    }

    /// Returns whether the set contains the tag, matching case-insensitively.
    pub fn contains(&self, tag: &str) -> bool {
        let tag = tag.trim().to_lowercase();
        self.0.contains(&tag)
    }

    /// Returns an iterator over the tags.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Returns the number of tags.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns whether the two sets share at least one tag.
    pub fn overlaps(&self, other: &Tags) -> bool {
        self.iter().any(|tag| other.0.iter().any(|t| t == tag))
    }

    /// Consumes the set and returns the stored strings.
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }

    /// Builds a tag set from a nullable text array column.
    pub fn from_optional_strings(tags: Vec<Option<String>>) -> Self {
        Self::normalize(tags.into_iter().flatten())
    }

    /// Converts the set into the element type of a text array column.
    pub fn into_optional_strings(self) -> Vec<Option<String>> {
        self.0.into_iter().map(Some).collect()
    }
}

impl From<Vec<String>> for Tags {
    fn from(tags: Vec<String>) -> Self {
        Self::normalize(tags)
    }
}

impl From<Tags> for Vec<String> {
    fn from(tags: Tags) -> Self {
        tags.0
    }
}

impl FromIterator<String> for Tags {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::normalize(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_whitespace_and_duplicates() {
        let tags = Tags::normalize(["  Classics", "russian", "CLASSICS", "", "  "]);
        assert_eq!(tags.into_inner(), vec!["classics", "russian"]);
    }

    #[test]
    fn comma_separated() {
        let tags = Tags::from_comma_separated("Sci-Fi, space ,, Space");
        assert_eq!(tags.iter().collect::<Vec<_>>(), vec!["sci-fi", "space"]);
        assert!(Tags::from_comma_separated("   ").is_empty());
    }

    #[test]
    fn add_remove_contains() {
        let mut tags = Tags::new();
        assert!(tags.add("Favorite"));
        assert!(!tags.add("favorite "));
        assert!(tags.contains("FAVORITE"));
        assert_eq!(tags.len(), 1);

        assert!(tags.remove("Favorite"));
        assert!(!tags.remove("favorite"));
        assert!(tags.is_empty());
    }

    #[test]
    fn overlap() {
        let a = Tags::normalize(["war", "history"]);
        let b = Tags::normalize(["History", "biography"]);
        let c = Tags::normalize(["poetry"]);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn array_column_conversion() {
        let tags = Tags::from_optional_strings(vec![Some("Poetry".into()), None, Some("poetry".into())]);
        assert_eq!(tags.clone().into_inner(), vec!["poetry"]);
        assert_eq!(tags.into_optional_strings(), vec![Some("poetry".to_string())]);
    }

    #[test]
    fn deserialization_normalizes() {
        let tags: Tags = serde_json::from_str(r#"["Rust", "rust", " Async "]"#).unwrap();
        assert_eq!(serde_json::to_string(&tags).unwrap(), r#"["rust","async"]"#);
    }
}
