//! Internal helpers for validation and normalization.
//!
//! These utilities are **not** part of the public API. They centralize the
//! small normalization rules so every write path enforces them the same way.

use chrono::NaiveDate;
use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

/// Dedup key for supplier/category names: NFKC-normalized, case-folded,
/// inner whitespace collapsed. `"Café  X"` and `"cafe\u{301} x"` collide.
pub(crate) fn dedup_key(name: &str) -> String {
    name.trim()
        .nfkc()
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Validate and trim a required display name.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional free-text field; empty becomes `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Parse an ISO `YYYY-MM-DD` date from untrusted input.
pub(crate) fn parse_iso_date(value: &str) -> ResultEngine<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| EngineError::InvalidDate(format!("expected YYYY-MM-DD, got {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_key_folds_case_and_whitespace() {
        assert_eq!(dedup_key("  Acme  Corp "), "acme corp");
        assert_eq!(dedup_key("ACME CORP"), "acme corp");
        assert_eq!(dedup_key("Caf\u{e9} X"), dedup_key("Cafe\u{301} x"));
    }

    #[test]
    fn iso_date_parsing() {
        assert_eq!(
            parse_iso_date("2025-06-01").unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
        );
        assert!(parse_iso_date("01/06/2025").is_err());
        assert!(parse_iso_date("2025-13-01").is_err());
    }
}
