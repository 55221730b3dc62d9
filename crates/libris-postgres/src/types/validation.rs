//! Field validation rules used by the `Validate` derives on input models.
//!
//! Each function follows the `validator` custom-rule signature and returns a
//! [`ValidationError`] carrying a stable code and a readable message.

use std::sync::LazyLock;

use regex::Regex;
use validator::ValidationError;

use crate::types::constants::tag::MAX_TAG_LENGTH;

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}){1,2}$").expect("valid hex color pattern"));

/// Builds a [`ValidationError`] with a code and message.
pub fn validation_error(code: &'static str, message: impl Into<String>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into().into());
    error
}

/// Strips hyphens and spaces from an ISBN and uppercases a trailing `x`.
pub fn normalize_isbn(isbn: &str) -> String {
    isbn.chars()
        .filter(|c| !matches!(c, '-' | ' '))
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

fn isbn10_checksum_ok(digits: &[u8]) -> bool {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let value = if c == b'X' { 10 } else { u32::from(c - b'0') };
            value * (10 - i as u32)
        })
        .sum();
    sum % 11 == 0
}

fn isbn13_checksum_ok(digits: &[u8]) -> bool {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let weight = if i % 2 == 0 { 1 } else { 3 };
            u32::from(c - b'0') * weight
        })
        .sum();
    sum % 10 == 0
}

/// Returns whether an already-normalized ISBN is well formed.
pub fn is_valid_isbn(normalized: &str) -> bool {
    let bytes = normalized.as_bytes();
    match bytes.len() {
        10 => {
            bytes[..9].iter().all(u8::is_ascii_digit)
                && (bytes[9].is_ascii_digit() || bytes[9] == b'X')
                && isbn10_checksum_ok(bytes)
        }
        13 => bytes.iter().all(u8::is_ascii_digit) && isbn13_checksum_ok(bytes),
        _ => false,
    }
}

/// Validates an ISBN-10 or ISBN-13, allowing hyphens and spaces.
pub fn validate_isbn(isbn: &str) -> Result<(), ValidationError> {
    let normalized = normalize_isbn(isbn);
    if !matches!(normalized.len(), 10 | 13) {
        return Err(validation_error(
            "isbn_length",
            "ISBN must contain 10 or 13 characters excluding hyphens and spaces",
        ));
    }

    if !is_valid_isbn(&normalized) {
        return Err(validation_error(
            "isbn_checksum",
            "ISBN has invalid characters or a wrong check digit",
        ));
    }

    Ok(())
}

/// Validates a `#rgb` or `#rrggbb` color.
pub fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    if !HEX_COLOR.is_match(color) {
        return Err(validation_error(
            "hex_color",
            "Color must be a hex value such as #ff0 or #ffff00",
        ));
    }

    Ok(())
}

/// Validates that every tag of a text array column is non-empty and at most
/// 30 characters.
pub fn validate_tags(tags: &[Option<String>]) -> Result<(), ValidationError> {
    for (index, tag) in tags.iter().enumerate() {
        let tag = tag.as_deref().unwrap_or_default().trim();
        if tag.is_empty() {
            return Err(validation_error(
                "tag_empty",
                format!("Tag #{} is empty", index + 1),
            ));
        }

        if tag.chars().count() > MAX_TAG_LENGTH {
            return Err(validation_error(
                "tag_too_long",
                format!(
                    "Tag #{} exceeds {} characters",
                    index + 1,
                    MAX_TAG_LENGTH
                ),
            ));
        }
    }

    Ok(())
}

/// Validates that a free-text field is not only whitespace.
pub fn validate_not_blank(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(validation_error("blank", "Value cannot be blank"));
    }

    Ok(())
}

/// Escapes `%`, `_` and `\` so user input matches literally inside `ILIKE`.
pub fn escape_like_pattern(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isbn_rejects_nine_digits() {
        let err = validate_isbn("123456789").unwrap_err();
        assert_eq!(err.code, "isbn_length");
    }

    #[test]
    fn isbn_accepts_hyphenated_isbn13() {
        assert!(validate_isbn("978-0-306-40615-7").is_ok());
        assert!(validate_isbn("978 3 16 148410 0").is_ok());
    }

    #[test]
    fn isbn_accepts_isbn10_with_check_x() {
        assert!(validate_isbn("0-8044-2957-X").is_ok());
        assert!(validate_isbn("0-8044-2957-x").is_ok());
        assert!(validate_isbn("0306406152").is_ok());
    }

    #[test]
    fn isbn_rejects_bad_check_digit() {
        assert_eq!(
            validate_isbn("978-0-306-40615-8").unwrap_err().code,
            "isbn_checksum"
        );
        assert!(validate_isbn("030640615X").is_err());
        assert!(validate_isbn("97803064061A7").is_err());
    }

    #[test]
    fn normalizes_isbn() {
        assert_eq!(normalize_isbn("978-0 306-40615-7"), "9780306406157");
        assert_eq!(normalize_isbn("0-8044-2957-x"), "080442957X");
    }

    #[test]
    fn hex_colors() {
        assert!(validate_hex_color("#ffff00").is_ok());
        assert!(validate_hex_color("#FF0").is_ok());
        assert!(validate_hex_color("#abcd").is_err());
        assert!(validate_hex_color("ffff00").is_err());
        assert!(validate_hex_color("#gggggg").is_err());
        assert!(validate_hex_color("#ffff000").is_err());
    }

    #[test]
    fn tag_length_boundary() {
        let ok = vec![Some("a".repeat(30))];
        let too_long = vec![Some("a".repeat(31))];
        assert!(validate_tags(&ok).is_ok());
        assert_eq!(validate_tags(&too_long).unwrap_err().code, "tag_too_long");
        assert_eq!(
            validate_tags(&[Some("fine".to_string()), Some(" ".to_string())])
                .unwrap_err()
                .code,
            "tag_empty"
        );
        assert_eq!(validate_tags(&[None]).unwrap_err().code, "tag_empty");
    }

    #[test]
    fn blank_text() {
        assert!(validate_not_blank("  \n").is_err());
        assert!(validate_not_blank(" a ").is_ok());
    }

    #[test]
    fn like_escaping() {
        assert_eq!(escape_like_pattern("100%_done\\"), "100\\%\\_done\\\\");
        assert_eq!(escape_like_pattern("plain"), "plain");
    }
}
