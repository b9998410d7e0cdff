//! Text and phone canonicalization.
//!
//! Both functions are total: a missing value normalizes to the empty
//! string, and nothing here can fail. The same functions feed the
//! fingerprint and the merge join keys, so any change here changes job
//! identity for every stored rowmap.

/// Canonicalize a phone number to bare domestic digits.
///
/// Whitespace and hyphens are dropped, a `+81` country prefix becomes a
/// leading `0`, and every remaining non-digit is removed.
///
/// ```rust
/// use call_reconcile_core::normalize::normalize_phone;
///
/// assert_eq!(normalize_phone(Some("+81 90-1234-5678")), "09012345678");
/// assert_eq!(normalize_phone(None), "");
/// ```
pub fn normalize_phone(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    compact
        .replace("+81", "0")
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect()
}

/// Trim and lower-case free text.
pub fn normalize_text(raw: Option<&str>) -> String {
    match raw {
        Some(s) => s.trim().to_lowercase(),
        None => String::new(),
    }
}

/// True when `phone` normalizes to a plausible domestic number
/// (`0` followed by nine or ten digits).
pub fn is_valid_domestic_phone(phone: Option<&str>) -> bool {
    let digits = normalize_phone(phone);
    let len = digits.len();
    digits.starts_with('0') && (10..=11).contains(&len)
}
