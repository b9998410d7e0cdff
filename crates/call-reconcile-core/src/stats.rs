//! Summary statistics over a classified call set.

use crate::duration::{format_hms, parse_duration};
use crate::models::{CallResultRecord, Outcome, StatisticsSnapshot};
use crate::normalize::is_valid_domestic_phone;

/// Substring marking a platform-side failure in status or summary.
pub const ERROR_MARKER: &str = "エラー";

/// Substring shared by every appointment-style label (including
/// operator-entered variants such as `電話APO`).
const APPOINTMENT_MARKER: &str = "APO";

pub fn compute(records: &[CallResultRecord]) -> StatisticsSnapshot {
    let not_connected = [Outcome::Unreached.label(), Outcome::Voicemail.label()];

    let mut snapshot = StatisticsSnapshot {
        total_calls: records.len(),
        ..Default::default()
    };

    for r in records {
        let outcome = r.outcome.as_deref().map(str::trim).filter(|o| !o.is_empty());

        if !outcome.map(|o| not_connected.contains(&o)).unwrap_or(false) {
            snapshot.valid_calls += 1;
        }
        if outcome.map(|o| o.contains(APPOINTMENT_MARKER)).unwrap_or(false) {
            snapshot.appointments += 1;
        }
        if let Some(o) = outcome {
            *snapshot.outcome_histogram.entry(o.to_string()).or_insert(0) += 1;
        }

        snapshot.total_duration_secs = snapshot
            .total_duration_secs
            .saturating_add(parse_duration(r.duration.as_deref()));

        if !is_valid_domestic_phone(r.phone.as_deref()) {
            snapshot.invalid_phones += 1;
        }

        let has_error = |v: &Option<String>| {
            v.as_deref()
                .map(|s| s.contains(ERROR_MARKER))
                .unwrap_or(false)
        };
        if has_error(&r.status) || has_error(&r.summary) {
            snapshot.errors += 1;
        }
    }

    snapshot.total_duration = format_hms(snapshot.total_duration_secs);
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(outcome: Option<&str>, phone: &str, duration: &str) -> CallResultRecord {
        CallResultRecord {
            company: Some("A社".to_string()),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
            status: Some("通話済み".to_string()),
            outcome: outcome.map(str::to_string),
            summary: None,
            duration: (!duration.is_empty()).then(|| duration.to_string()),
        }
    }

    #[test]
    fn test_duration_sum_and_format() {
        let records = vec![
            record(None, "0311112222", "0:30"),
            record(None, "0311112222", "1:00:00"),
            record(None, "0311112222", "45"),
        ];
        let s = compute(&records);
        assert_eq!(s.total_duration_secs, 3675);
        assert_eq!(s.total_duration, "1:01:15");
    }

    #[test]
    fn test_invalid_phone_count() {
        let records = vec![
            record(None, "09012345678", ""),
            record(None, "123", ""),
            record(None, "", ""),
        ];
        assert_eq!(compute(&records).invalid_phones, 2);
    }

    #[test]
    fn test_valid_and_appointment_counts() {
        let records = vec![
            record(Some("留守"), "0311112222", "0"),
            record(Some("留守電"), "0311112222", "0"),
            record(Some("NG"), "0311112222", "0:40"),
            record(Some("AI電話APO"), "0311112222", "3:00"),
            record(Some("電話APO"), "0311112222", "2:00"),
            record(None, "0311112222", ""),
        ];
        let s = compute(&records);
        assert_eq!(s.total_calls, 6);
        assert_eq!(s.valid_calls, 4);
        assert_eq!(s.appointments, 2);
    }

    #[test]
    fn test_histogram_skips_unset_outcomes() {
        let records = vec![
            record(Some("NG"), "0311112222", ""),
            record(Some("NG"), "0311112222", ""),
            record(Some("留守"), "0311112222", ""),
            record(None, "0311112222", ""),
        ];
        let s = compute(&records);
        assert_eq!(s.outcome_histogram.get("NG"), Some(&2));
        assert_eq!(s.outcome_histogram.get("留守"), Some(&1));
        assert_eq!(s.outcome_histogram.values().sum::<usize>(), 3);
    }

    #[test]
    fn test_error_count() {
        let mut a = record(None, "0311112222", "");
        a.status = Some("システムエラー".to_string());
        let mut b = record(None, "0311112222", "");
        b.summary = Some("接続エラーが発生".to_string());
        let c = record(None, "0311112222", "");
        assert_eq!(compute(&[a, b, c]).errors, 2);
    }

    #[test]
    fn test_duration_total_saturates() {
        let records = vec![
            record(None, "0311112222", "18446744073709551615"),
            record(None, "0311112222", "10"),
        ];
        assert_eq!(compute(&records).total_duration_secs, u64::MAX);
    }

    #[test]
    fn test_empty_input() {
        let s = compute(&[]);
        assert_eq!(s.total_calls, 0);
        assert_eq!(s.total_duration, "0:00:00");
        assert!(s.outcome_histogram.is_empty());
    }
}
