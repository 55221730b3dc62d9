//! Keyset pagination over a book's loan history.
//!
//! Loan histories are read newest first and only ever grow at the front, so
//! pages are addressed by the last loan seen rather than by position: a loan
//! opened while a reader pages through never shifts the next page.

use std::fmt;

use base64::prelude::*;
use jiff::Timestamp;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::PgResult;

/// Upper bound on loans per page.
pub const MAX_LOAN_PAGE_SIZE: i64 = 100;

/// The last loan of a page: its `borrowed_at` and, to break ties, its id.
///
/// Serialized as an opaque URL-safe token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(into = "String", try_from = "String")]
pub struct LoanCursor {
    pub borrowed_at: Timestamp,
    pub loan_id: Uuid,
}

impl LoanCursor {
    pub fn new(borrowed_at: Timestamp, loan_id: Uuid) -> Self {
        Self {
            borrowed_at,
            loan_id,
        }
    }

    /// Encodes the cursor for handing to a client.
    pub fn token(&self) -> String {
        BASE64_URL_SAFE_NO_PAD.encode(format!("{}@{}", self.loan_id, self.borrowed_at))
    }

    /// Decodes a token produced by [`LoanCursor::token`].
    pub fn parse(token: &str) -> Option<Self> {
        let bytes = BASE64_URL_SAFE_NO_PAD.decode(token).ok()?;
        let text = String::from_utf8(bytes).ok()?;
        let (loan_id, borrowed_at) = text.split_once('@')?;

        Some(Self {
            borrowed_at: borrowed_at.parse().ok()?,
            loan_id: loan_id.parse().ok()?,
        })
    }
}

impl fmt::Display for LoanCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

impl From<LoanCursor> for String {
    fn from(cursor: LoanCursor) -> Self {
        cursor.token()
    }
}

impl TryFrom<String> for LoanCursor {
    type Error = &'static str;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        Self::parse(&token).ok_or("malformed loan cursor")
    }
}

/// A page request over a loan history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct LoanPagination {
    pub limit: i64,
    /// Continue after this loan; `None` starts at the newest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<LoanCursor>,
}

impl LoanPagination {
    /// Requests the newest `limit` loans.
    pub fn first(limit: i64) -> Self {
        Self {
            limit: limit.clamp(1, MAX_LOAN_PAGE_SIZE),
            after: None,
        }
    }

    /// Continues from a client-supplied token.
    ///
    /// A token that does not decode is rejected as a validation error on the
    /// `cursor` field rather than silently restarting from the newest loan.
    pub fn resume(limit: i64, token: Option<&str>) -> PgResult<Self> {
        let mut pagination = Self::first(limit);
        let Some(token) = token else {
            return Ok(pagination);
        };

        let Some(cursor) = LoanCursor::parse(token) else {
            let mut errors = ValidationErrors::new();
            errors.add("cursor", ValidationError::new("malformed_cursor"));
            return Err(errors.into());
        };

        pagination.after = Some(cursor);
        Ok(pagination)
    }

    /// Rows to load: one past the limit tells whether another page follows.
    #[inline]
    pub(crate) fn fetch_limit(&self) -> i64 {
        self.limit + 1
    }
}

impl Default for LoanPagination {
    fn default() -> Self {
        Self::first(20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor() -> LoanCursor {
        LoanCursor::new("2025-03-01T09:30:00Z".parse().unwrap(), Uuid::now_v7())
    }

    #[test]
    fn token_decodes_to_same_cursor() {
        let cursor = cursor();
        assert_eq!(LoanCursor::parse(&cursor.token()), Some(cursor));

        let json = serde_json::to_string(&cursor).unwrap();
        assert_eq!(json, format!("\"{}\"", cursor.token()));
    }

    #[test]
    fn malformed_tokens() {
        assert_eq!(LoanCursor::parse(""), None);
        assert_eq!(LoanCursor::parse("%%%"), None);
        assert_eq!(LoanCursor::parse(&BASE64_URL_SAFE_NO_PAD.encode("no-separator")), None);
        assert!(serde_json::from_str::<LoanCursor>("\"bogus\"").is_err());
    }

    #[test]
    fn resume_rejects_bad_token() {
        let err = LoanPagination::resume(10, Some("bogus")).unwrap_err();
        assert!(err.is_validation());

        let cursor = cursor();
        let pagination = LoanPagination::resume(10, Some(&cursor.token())).unwrap();
        assert_eq!(pagination.after, Some(cursor));
        assert_eq!(LoanPagination::resume(10, None).unwrap().after, None);
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(LoanPagination::first(0).limit, 1);
        assert_eq!(LoanPagination::first(500).limit, MAX_LOAN_PAGE_SIZE);
        assert_eq!(LoanPagination::first(50).fetch_limit(), 51);
    }
}
