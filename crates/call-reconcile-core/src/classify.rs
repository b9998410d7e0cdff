//! Ordered, first-match-wins outcome classification.
//!
//! A [`RuleSet`] is a list of [`Rule`]s, each a named (predicate, outcome)
//! pair. Records that already carry an outcome are never touched, which
//! makes reclassifying the same table a no-op for every populated row.
//!
//! # Default rules
//!
//! | # | Name | Predicate | Outcome |
//! |---|------|-----------|---------|
//! | 1 | `status-answering-machine` | status is 留守番電話 | Voicemail |
//! | 2 | `status-no-answer` | status is 応答なし / 応答無し | Unreached |
//! | 3 | `status-acquired` | status is 獲得 | Appointment |
//! | 4 | `summary-decline` | summary has a decline keyword | Declined |
//! | 5 | `zero-duration` | duration parses to 0 | Unreached |
//! | 6 | `status-automated-voice` | status is 自動音声 | Voicemail |
//! | 7 | `summary-no-answer` | summary mentions 応答なし / 応答無し | Unreached |
//! | 8 | `summary-transferred` | summary mentions a transfer/consent | Appointment |
//! | 9 | `talked-no-transfer` | duration > 0, summary lacks 転送 | Declined |
//!
//! Order matters: an acquired call with a decline keyword in its summary
//! is still an appointment, because rule 3 fires before rule 4.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::duration::try_parse_duration;
use crate::models::{CallResultRecord, Outcome};

/// Closed list of decline / call-termination phrases.
pub const DECLINE_KEYWORDS: &[&str] = &[
    "断り",
    "不要",
    "必要ない",
    "結構です",
    "結構",
    "電話が終了",
    "電話を切った",
    "切断",
    "応答なし",
    "応答無し",
    "切られ",
    "切られる",
    "切った",
    "通話が終了",
    "会話が終了",
    "進展しない",
    "通話を終了",
    "進まなかった",
    "切りました",
    "断念",
    "終了",
    "成立しなかった",
    "切",
    "進展はありま",
];

const NO_ANSWER: &[&str] = &["応答なし", "応答無し"];
const TRANSFERRED: &[&str] = &["転送された", "了承しました", "転送されました"];
const TRANSFER: &[&str] = &["転送"];

/// Condition evaluated against one call record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Trimmed status equals one of the values.
    StatusIs(Vec<String>),
    /// Summary contains any of the substrings.
    SummaryContainsAny(Vec<String>),
    /// Parsed duration is zero (missing and malformed included).
    DurationIsZero,
    /// Parsed duration is positive and the summary contains none of the
    /// substrings.
    TalkedWithout(Vec<String>),
}

impl Predicate {
    fn matches(&self, call: &CallView<'_>) -> bool {
        match self {
            Predicate::StatusIs(values) => values.iter().any(|v| v == call.status),
            Predicate::SummaryContainsAny(words) => {
                words.iter().any(|w| call.summary.contains(w.as_str()))
            }
            Predicate::DurationIsZero => call.duration_secs == 0,
            Predicate::TalkedWithout(words) => {
                call.duration_secs > 0 && !words.iter().any(|w| call.summary.contains(w.as_str()))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: &'static str,
    pub predicate: Predicate,
    pub outcome: Outcome,
}

/// Ordered rules plus the fallthrough policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
    /// Assigned when no rule matches. `None` leaves the outcome unset.
    fallback: Option<Outcome>,
}

/// Pre-extracted view of the fields the predicates look at.
struct CallView<'a> {
    status: &'a str,
    summary: &'a str,
    duration_secs: u64,
}

fn strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>, fallback: Option<Outcome>) -> Self {
        Self { rules, fallback }
    }

    /// The standard rule list with a custom decline vocabulary.
    pub fn with_decline_keywords(decline: &[&str], fallback: Option<Outcome>) -> Self {
        let rule = |name, predicate, outcome| Rule {
            name,
            predicate,
            outcome,
        };
        let rules = vec![
            rule(
                "status-answering-machine",
                Predicate::StatusIs(strings(&["留守番電話"])),
                Outcome::Voicemail,
            ),
            rule(
                "status-no-answer",
                Predicate::StatusIs(strings(NO_ANSWER)),
                Outcome::Unreached,
            ),
            rule(
                "status-acquired",
                Predicate::StatusIs(strings(&["獲得"])),
                Outcome::Appointment,
            ),
            rule(
                "summary-decline",
                Predicate::SummaryContainsAny(strings(decline)),
                Outcome::Declined,
            ),
            rule("zero-duration", Predicate::DurationIsZero, Outcome::Unreached),
            rule(
                "status-automated-voice",
                Predicate::StatusIs(strings(&["自動音声"])),
                Outcome::Voicemail,
            ),
            rule(
                "summary-no-answer",
                Predicate::SummaryContainsAny(strings(NO_ANSWER)),
                Outcome::Unreached,
            ),
            rule(
                "summary-transferred",
                Predicate::SummaryContainsAny(strings(TRANSFERRED)),
                Outcome::Appointment,
            ),
            rule(
                "talked-no-transfer",
                Predicate::TalkedWithout(strings(TRANSFER)),
                Outcome::Declined,
            ),
        ];
        Self::new(rules, fallback)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn fallback(&self) -> Option<Outcome> {
        self.fallback
    }

    /// First matching rule for a record, ignoring any existing outcome.
    pub fn evaluate(&self, record: &CallResultRecord) -> Option<&Rule> {
        let view = CallView {
            status: record.status.as_deref().unwrap_or("").trim(),
            summary: record.summary.as_deref().unwrap_or(""),
            duration_secs: try_parse_duration(record.duration.as_deref()).unwrap_or(0),
        };
        self.rules.iter().find(|r| r.predicate.matches(&view))
    }
}

impl Default for RuleSet {
    /// Standard rules; unmatched records get [`Outcome::Unclassified`].
    fn default() -> Self {
        Self::with_decline_keywords(DECLINE_KEYWORDS, Some(Outcome::Unclassified))
    }
}

/// Counters from one classification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassifyReport {
    pub total: usize,
    /// Records that already had an outcome and were left alone.
    pub skipped: usize,
    pub rule_hits: BTreeMap<String, usize>,
    /// Records no rule matched (fallback applied, if any).
    pub unmatched: usize,
    /// Unclassified records whose duration token was malformed.
    pub malformed_durations: usize,
}

/// Classify every unclassified record in place.
pub fn classify(records: &mut [CallResultRecord], rules: &RuleSet) -> ClassifyReport {
    let mut report = ClassifyReport {
        total: records.len(),
        ..Default::default()
    };

    for record in records.iter_mut() {
        if record.is_classified() {
            report.skipped += 1;
            continue;
        }
        if try_parse_duration(record.duration.as_deref()).is_err() {
            report.malformed_durations += 1;
        }
        match rules.evaluate(record) {
            Some(rule) => {
                *report.rule_hits.entry(rule.name.to_string()).or_insert(0) += 1;
                record.outcome = Some(rule.outcome.label().to_string());
            }
            None => {
                report.unmatched += 1;
                if let Some(fallback) = rules.fallback() {
                    record.outcome = Some(fallback.label().to_string());
                }
            }
        }
    }

    report
}
