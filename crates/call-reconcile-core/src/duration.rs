//! Free-form call duration parsing and `H:MM:SS` formatting.
//!
//! Call logs record duration as `h:m:s`, `m:s`, or bare seconds. Anything
//! else (empty cells, `-`, `nan`, garbage) counts as zero seconds.

use crate::error::{ReconcileError, Result};

/// Parse a duration token into whole seconds, reporting malformed input.
///
/// Empty and placeholder tokens (`""`, `-`, `nan`) are *not* errors; they
/// parse to `Ok(0)`.
pub fn try_parse_duration(raw: Option<&str>) -> Result<u64> {
    let token = match raw.map(str::trim) {
        None | Some("") | Some("-") => return Ok(0),
        Some(t) if t.eq_ignore_ascii_case("nan") => return Ok(0),
        Some(t) => t,
    };

    let malformed = || ReconcileError::DurationParse(token.to_string());
    let parts = token
        .split(':')
        .map(|p| p.trim().parse::<u64>().map_err(|_| malformed()))
        .collect::<Result<Vec<u64>>>()?;

    let total = match parts.as_slice() {
        [h, m, s] => h
            .checked_mul(3600)
            .zip(m.checked_mul(60))
            .and_then(|(h, m)| h.checked_add(m))
            .and_then(|hm| hm.checked_add(*s)),
        [m, s] => m.checked_mul(60).and_then(|m| m.checked_add(*s)),
        [secs] => Some(*secs),
        _ => None,
    };
    total.ok_or_else(malformed)
}

/// Parse a duration token, recovering any malformed value as zero.
pub fn parse_duration(raw: Option<&str>) -> u64 {
    try_parse_duration(raw).unwrap_or(0)
}

/// Format whole seconds as `H:MM:SS` (hours are not wrapped at 24).
pub fn format_hms(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_forms() {
        assert_eq!(parse_duration(Some("1:02:03")), 3723);
        assert_eq!(parse_duration(Some("0:30")), 30);
        assert_eq!(parse_duration(Some("45")), 45);
        assert_eq!(parse_duration(Some(" 2:00 ")), 120);
    }

    #[test]
    fn test_placeholders_are_zero_without_error() {
        assert_eq!(try_parse_duration(None), Ok(0));
        assert_eq!(try_parse_duration(Some("")), Ok(0));
        assert_eq!(try_parse_duration(Some("-")), Ok(0));
        assert_eq!(try_parse_duration(Some("nan")), Ok(0));
    }

    #[test]
    fn test_malformed_recovers_to_zero() {
        assert!(matches!(
            try_parse_duration(Some("abc")),
            Err(ReconcileError::DurationParse(_))
        ));
        assert_eq!(parse_duration(Some("abc")), 0);
        assert_eq!(parse_duration(Some("1:2:3:4")), 0);
        assert_eq!(parse_duration(Some("1:xx")), 0);
        assert_eq!(parse_duration(Some("-5")), 0);
        assert_eq!(parse_duration(Some("12.5")), 0);
    }

    #[test]
    fn test_overflowing_token_recovers_to_zero() {
        assert!(matches!(
            try_parse_duration(Some("9999999999999999:00:00")),
            Err(ReconcileError::DurationParse(_))
        ));
        assert_eq!(parse_duration(Some("9999999999999999:00:00")), 0);
        assert_eq!(parse_duration(Some("1:307445734561825861:0")), 0);
        assert_eq!(parse_duration(Some("307445734561825861:00")), 0);
        assert_eq!(parse_duration(Some("18446744073709551615")), u64::MAX);
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(0), "0:00:00");
        assert_eq!(format_hms(3675), "1:01:15");
        assert_eq!(format_hms(90_000), "25:00:00");
    }
}
