//! Reconciliation merge: classified calls back onto the originating job.
//!
//! # Algorithm
//!
//! For every call record, in order:
//!
//! 1. Recompute the row key from the call's company and phone.
//! 2. Find the rowmap entry according to the [`JoinStrategy`]:
//!    - [`JoinStrategy::FingerprintFirst`] matches on row key, falling
//!      back to normalized company text when no row key matches.
//!    - [`JoinStrategy::CompanyName`] matches on normalized company text
//!      only.
//! 3. When an entry matched and carries an external id, pull auxiliary
//!    fields from the first contact with that external id.
//!
//! A blank company never joins by name, and a call with neither company
//! nor phone never joins by row key.
//!
//! The join is a left join. Every call produces exactly one output row;
//! unmatched rows keep `external_id = None`. When more than one rowmap
//! entry shares the chosen key the first one wins and the collision is
//! recorded in [`MergeReport::ambiguous`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ReconcileError;
use crate::fingerprint::fingerprint;
use crate::models::{CallResultRecord, ContactRecord, RowMapEntry, StoredJob};
use crate::normalize::{normalize_phone, normalize_text};
use crate::schema::{CallSchema, ContactSchema};
use crate::table::Table;

/// Column header for the recomputed fingerprint in the report.
pub const ROW_KEY_COLUMN: &str = "row_key";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JoinStrategy {
    /// Row key first, normalized company text as fallback.
    #[default]
    #[serde(rename = "fingerprint")]
    FingerprintFirst,
    /// Normalized company text only.
    #[serde(rename = "company")]
    CompanyName,
}

/// How a reconciled row found its rowmap entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    RowKey,
    CompanyName,
    Unmatched,
}

/// One row of the reconciled report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledRecord {
    pub call: CallResultRecord,
    pub external_id: Option<String>,
    /// Company as written in the contact source, when matched.
    pub source_company: Option<String>,
    pub address: Option<String>,
    pub talk_judgement: Option<String>,
    pub validity: Option<String>,
    pub decision_maker: Option<String>,
    pub row_key: String,
    pub matched_by: MatchKind,
}

/// A key that resolved to more than one rowmap entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmbiguousMatch {
    /// Index of the call record in the input.
    pub call_index: usize,
    pub key: String,
    pub candidates: usize,
}

impl From<&AmbiguousMatch> for ReconcileError {
    fn from(m: &AmbiguousMatch) -> Self {
        ReconcileError::AmbiguousMatch {
            key: m.key.clone(),
            candidates: m.candidates,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub total: usize,
    pub matched_by_row_key: usize,
    pub matched_by_company: usize,
    pub unmatched: usize,
    pub ambiguous: Vec<AmbiguousMatch>,
}

impl MergeReport {
    pub fn matched(&self) -> usize {
        self.matched_by_row_key + self.matched_by_company
    }
}

/// Output of [`reconcile`].
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub records: Vec<ReconciledRecord>,
    pub report: MergeReport,
    /// Report columns, in output order, that the inputs actually carry.
    pub columns: Vec<String>,
}

/// Index from a key to every rowmap position that carries it.
fn index_by<F>(rowmap: &[RowMapEntry], key: F) -> HashMap<&str, Vec<usize>>
where
    F: Fn(&RowMapEntry) -> &str,
{
    let mut index: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, entry) in rowmap.iter().enumerate() {
        index.entry(key(entry)).or_default().push(i);
    }
    index
}

pub fn reconcile(
    calls: &[CallResultRecord],
    call_columns: &[String],
    job: &StoredJob,
    call_schema: &CallSchema,
    contact_schema: &ContactSchema,
    strategy: JoinStrategy,
) -> Reconciliation {
    let by_row_key = index_by(&job.rowmap, |e| e.row_key.as_str());
    let by_company = index_by(&job.rowmap, |e| e.company_normalized.as_str());

    let contacts = ContactRecord::from_table(&job.source, contact_schema);
    let mut by_external_id: HashMap<&str, &ContactRecord> = HashMap::new();
    for c in &contacts {
        if let Some(id) = c.external_id.as_deref() {
            by_external_id.entry(id).or_insert(c);
        }
    }

    let mut report = MergeReport {
        total: calls.len(),
        ..Default::default()
    };
    let mut records = Vec::with_capacity(calls.len());

    for (call_index, call) in calls.iter().enumerate() {
        let row_key = fingerprint(call.company.as_deref(), call.phone.as_deref());
        let company_key = normalize_text(call.company.as_deref());
        let has_identity =
            !company_key.is_empty() || !normalize_phone(call.phone.as_deref()).is_empty();

        let mut hit: Option<(MatchKind, &str, &Vec<usize>)> = None;
        if strategy == JoinStrategy::FingerprintFirst && has_identity {
            if let Some(positions) = by_row_key.get(row_key.as_str()) {
                hit = Some((MatchKind::RowKey, row_key.as_str(), positions));
            }
        }
        if hit.is_none() && !company_key.is_empty() {
            if let Some(positions) = by_company.get(company_key.as_str()) {
                hit = Some((MatchKind::CompanyName, company_key.as_str(), positions));
            }
        }

        let (matched_by, entry) = match hit {
            Some((kind, key, positions)) => {
                if positions.len() > 1 {
                    report.ambiguous.push(AmbiguousMatch {
                        call_index,
                        key: key.to_string(),
                        candidates: positions.len(),
                    });
                }
                match kind {
                    MatchKind::RowKey => report.matched_by_row_key += 1,
                    _ => report.matched_by_company += 1,
                }
                (kind, Some(&job.rowmap[positions[0]]))
            }
            None => {
                report.unmatched += 1;
                (MatchKind::Unmatched, None)
            }
        };

        let external_id = entry.and_then(|e| e.external_id.clone());
        let contact = external_id
            .as_deref()
            .and_then(|id| by_external_id.get(id).copied());

        records.push(ReconciledRecord {
            call: call.clone(),
            external_id,
            source_company: entry.and_then(|e| e.company.clone()),
            address: contact.and_then(|c| c.address.clone()),
            talk_judgement: contact.and_then(|c| c.talk_judgement.clone()),
            validity: contact.and_then(|c| c.validity.clone()),
            decision_maker: contact.and_then(|c| c.decision_maker.clone()),
            row_key,
            matched_by,
        });
    }

    let columns = report_columns(call_columns, &job.source, call_schema, contact_schema);
    Reconciliation {
        records,
        report,
        columns,
    }
}

/// The fixed report column order, filtered to what the inputs carry.
///
/// External id and row key are always present; call columns depend on the
/// call table, auxiliary columns on the stored contact table.
fn report_columns(
    call_columns: &[String],
    source: &Table,
    calls: &CallSchema,
    contacts: &ContactSchema,
) -> Vec<String> {
    let has_call = |c: &str| call_columns.iter().any(|x| x == c);
    let mut out = vec![contacts.external_id.clone()];
    for c in [
        &calls.company,
        &calls.phone,
        &calls.status,
        &calls.outcome,
        &calls.summary,
        &calls.duration,
    ] {
        if has_call(c) {
            out.push(c.clone());
        }
    }
    let joins_contacts = source.has_column(&contacts.external_id);
    for c in contacts.auxiliary_columns() {
        if joins_contacts && source.has_column(c) {
            out.push(c.to_string());
        }
    }
    out.push(ROW_KEY_COLUMN.to_string());
    out
}

impl Reconciliation {
    /// Render the report as a table in [`Reconciliation::columns`] order.
    pub fn to_table(&self, calls: &CallSchema, contacts: &ContactSchema) -> Table {
        let mut table = Table::new(self.columns.clone());
        for r in &self.records {
            let row = self
                .columns
                .iter()
                .map(|col| cell_for(r, col, calls, contacts))
                .collect();
            table.push_row(row);
        }
        table
    }
}

fn cell_for(
    r: &ReconciledRecord,
    col: &str,
    calls: &CallSchema,
    contacts: &ContactSchema,
) -> Option<String> {
    let value = if col == contacts.external_id {
        &r.external_id
    } else if col == ROW_KEY_COLUMN {
        return Some(r.row_key.clone());
    } else if col == calls.company {
        &r.call.company
    } else if col == calls.phone {
        &r.call.phone
    } else if col == calls.status {
        &r.call.status
    } else if col == calls.outcome {
        &r.call.outcome
    } else if col == calls.summary {
        &r.call.summary
    } else if col == calls.duration {
        &r.call.duration
    } else if col == contacts.address {
        &r.address
    } else if col == contacts.talk_judgement {
        &r.talk_judgement
    } else if col == contacts.validity {
        &r.validity
    } else if col == contacts.decision_maker {
        &r.decision_maker
    } else {
        return None;
    };
    value.clone()
}
