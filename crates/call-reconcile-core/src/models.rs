//! Core data models for the reconciliation pipeline.
//!
//! Records are typed views over [`Table`] rows. They are built once at the
//! boundary (via a schema) and then flow through classification, merge,
//! and statistics without re-reading column names.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{CallSchema, ContactSchema};
use crate::table::Table;

/// One source-of-truth contact row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub company: Option<String>,
    pub phone: Option<String>,
    pub external_id: Option<String>,
    pub address: Option<String>,
    pub talk_judgement: Option<String>,
    pub validity: Option<String>,
    pub decision_maker: Option<String>,
}

impl ContactRecord {
    /// Read every row of a contact table, resolving the company alias.
    pub fn from_table(table: &Table, schema: &ContactSchema) -> Vec<ContactRecord> {
        let company_col = schema.company_column(table);
        let cell = |row: usize, col: &str| table.get(row, col).map(str::to_string);
        (0..table.len())
            .map(|row| ContactRecord {
                company: cell(row, company_col),
                phone: cell(row, &schema.phone),
                external_id: cell(row, &schema.external_id),
                address: cell(row, &schema.address),
                talk_judgement: cell(row, &schema.talk_judgement),
                validity: cell(row, &schema.validity),
                decision_maker: cell(row, &schema.decision_maker),
            })
            .collect()
    }
}

/// One logged call from the calling platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallResultRecord {
    pub company: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
    /// Classification label; `None` until the classifier (or an operator)
    /// fills it in.
    pub outcome: Option<String>,
    pub summary: Option<String>,
    /// Free-form duration text, parsed on demand.
    pub duration: Option<String>,
}

impl CallResultRecord {
    pub fn from_table(table: &Table, schema: &CallSchema) -> Vec<CallResultRecord> {
        let cell = |row: usize, col: &str| table.get(row, col).map(str::to_string);
        (0..table.len())
            .map(|row| CallResultRecord {
                company: cell(row, &schema.company),
                phone: cell(row, &schema.phone),
                status: cell(row, &schema.status),
                outcome: cell(row, &schema.outcome).filter(|o| !o.eq_ignore_ascii_case("nan")),
                summary: cell(row, &schema.summary),
                duration: cell(row, &schema.duration),
            })
            .collect()
    }

    /// True when an outcome has already been assigned.
    pub fn is_classified(&self) -> bool {
        self.outcome
            .as_deref()
            .map(|o| !o.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Write classified outcomes back into the table they were read from,
/// adding the outcome column if the input lacked it.
pub fn apply_outcomes(table: &Table, records: &[CallResultRecord], schema: &CallSchema) -> Table {
    let mut columns = table.columns().to_vec();
    let outcome_idx = match table.column_index(&schema.outcome) {
        Some(i) => i,
        None => {
            columns.push(schema.outcome.clone());
            columns.len() - 1
        }
    };
    let mut out = Table::new(columns);
    for (row, record) in table.rows().iter().zip(records) {
        let mut row = row.clone();
        row.resize(outcome_idx + 1, None);
        row[outcome_idx] = record.outcome.clone();
        out.push_row(row);
    }
    out
}

/// Classification taxonomy.
///
/// Labels are the strings the originating system expects on re-import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Appointment,
    Declined,
    Voicemail,
    Unreached,
    /// Sentinel for "processed, but no rule matched".
    Unclassified,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Appointment => "AI電話APO",
            Outcome::Declined => "NG",
            Outcome::Voicemail => "留守電",
            Outcome::Unreached => "留守",
            Outcome::Unclassified => "未分類",
        }
    }

    pub fn from_label(label: &str) -> Option<Outcome> {
        match label.trim() {
            "AI電話APO" => Some(Outcome::Appointment),
            "NG" => Some(Outcome::Declined),
            "留守電" => Some(Outcome::Voicemail),
            "留守" => Some(Outcome::Unreached),
            "未分類" => Some(Outcome::Unclassified),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Link from a source row to its fingerprint and external id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowMapEntry {
    pub row_key: String,
    pub company: Option<String>,
    pub company_normalized: String,
    pub phone: Option<String>,
    pub external_id: Option<String>,
    pub index_in_source: usize,
}

impl RowMapEntry {
    pub const COLUMNS: [&'static str; 6] = [
        "row_key",
        "company",
        "company_normalized",
        "phone",
        "external_id",
        "index_in_source",
    ];

    pub fn to_table(entries: &[RowMapEntry]) -> Table {
        let mut table = Table::new(Self::COLUMNS.iter().map(|c| c.to_string()).collect());
        for e in entries {
            table.push_row(vec![
                Some(e.row_key.clone()),
                e.company.clone(),
                Some(e.company_normalized.clone()),
                e.phone.clone(),
                e.external_id.clone(),
                Some(e.index_in_source.to_string()),
            ]);
        }
        table
    }

    /// Inverse of [`RowMapEntry::to_table`]. Rows with an unparseable
    /// source index fall back to their position in the table.
    pub fn from_table(table: &Table) -> Vec<RowMapEntry> {
        let cell = |row: usize, col: &str| table.get(row, col).map(str::to_string);
        (0..table.len())
            .map(|row| RowMapEntry {
                row_key: cell(row, "row_key").unwrap_or_default(),
                company: cell(row, "company"),
                company_normalized: cell(row, "company_normalized").unwrap_or_default(),
                phone: cell(row, "phone"),
                external_id: cell(row, "external_id"),
                index_in_source: table
                    .get(row, "index_in_source")
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(row),
            })
            .collect()
    }
}

/// Logical file references recorded in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFiles {
    pub source: String,
    pub upload: String,
    pub rowmap: String,
}

/// Number of calling robots a job may be dialed with.
pub const ROBOT_COUNT_RANGE: RangeInclusive<u8> = 1..=5;

fn default_robot_count() -> u8 {
    *ROBOT_COUNT_RANGE.start()
}

/// Lifecycle of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Call list exported, no results reconciled yet.
    #[default]
    Created,
    /// At least one result table has been reconciled against the job.
    Analyzed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Created => "created",
            JobStatus::Analyzed => "analyzed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Description of one ingestion batch. Only `status` changes after
/// creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub job_id: String,
    pub created_at: DateTime<Utc>,
    /// Base name of the outbound call-list file.
    pub original_filename: String,
    /// Name of the contact file the job was created from.
    #[serde(default)]
    pub source_filename: String,
    #[serde(default = "default_robot_count")]
    pub robot_count: u8,
    #[serde(default)]
    pub status: JobStatus,
    pub total_rows: usize,
    pub files: ManifestFiles,
}

/// Everything the job store persists for a new job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobBundle {
    pub manifest: Manifest,
    pub source: Table,
    pub upload: Table,
    pub rowmap: Vec<RowMapEntry>,
}

/// What the merger needs back from the store for an existing job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredJob {
    pub manifest: Manifest,
    pub source: Table,
    pub rowmap: Vec<RowMapEntry>,
}

impl From<JobBundle> for StoredJob {
    fn from(bundle: JobBundle) -> Self {
        StoredJob {
            manifest: bundle.manifest,
            source: bundle.source,
            rowmap: bundle.rowmap,
        }
    }
}

/// Generate a job id of the form `YYYYMMDD_HHMM_XXXXX`.
pub fn generate_job_id(now: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(5)
        .collect::<String>()
        .to_uppercase();
    format!("{}_{}", now.format("%Y%m%d_%H%M"), suffix)
}

/// Summary of a classified result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    pub total_calls: usize,
    pub valid_calls: usize,
    pub total_duration_secs: u64,
    /// `total_duration_secs` formatted as `H:MM:SS`.
    pub total_duration: String,
    pub appointments: usize,
    pub invalid_phones: usize,
    pub errors: usize,
    pub outcome_histogram: BTreeMap<String, usize>,
}
