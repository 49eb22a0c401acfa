//! String helpers for file-name driven workflows: finding a date in a name and
//! splitting it into parts.

use std::sync::OnceLock;

use regex::Regex;

use crate::TarkitError;

/// `20YYMMDD`, or `20YY?MM?DD` where `?` is one of `.`, `_`, `-` (the two separators
/// may differ).
const DATE_PATTERN: &str = r"(20\d{2}(0[1-9]|1[0-2])(0[1-9]|[12]\d|3[01]))|(20\d{2}[._-](0[1-9]|1[0-2])[._-](0[1-9]|[12]\d|3[01]))";

fn date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(DATE_PATTERN).expect("date pattern is valid"))
}

/// Returns the leftmost date found in `input` as `YYYYMMDD`, separators removed.
pub fn extract_date(input: &str) -> Result<String, TarkitError> {
    let found = date_regex()
        .find(input)
        .ok_or_else(|| TarkitError::NoDate(input.to_string()))?;
    Ok(found.as_str().chars().filter(|c| !matches!(c, '-' | '_' | '.')).collect())
}

/// Year, month and day slices of a `YYYYMMDD` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParts<'a> {
    pub year: &'a str,
    pub month: &'a str,
    pub day: &'a str,
}

/// Splits `YYYYMMDD` into its parts. Only the length (8 ASCII characters) is checked.
pub fn split_date(date: &str) -> Result<DateParts<'_>, TarkitError> {
    if date.len() != 8 || !date.is_ascii() {
        return Err(TarkitError::InvalidDate(date.to_string()));
    }
    Ok(DateParts { year: &date[0..4], month: &date[4..6], day: &date[6..8] })
}

/// Parses a decimal integer, returning 0 for anything unparsable.
pub fn str_to_int(s: &str) -> i64 {
    s.parse().unwrap_or(0)
}
