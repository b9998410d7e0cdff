//! Job creation: outbound call list, rowmap, and manifest.
//!
//! Given the raw contact table, [`build_export`] produces everything a
//! job store needs to persist a new [`JobBundle`]:
//!
//! 1. **Upload table**: the alias company column is renamed to the
//!    canonical one, then the table is projected onto the upload
//!    allow-list (only columns that are present).
//! 2. **Rowmap**: one [`RowMapEntry`] per input row, in input order,
//!    carrying the fingerprint and the external id.
//! 3. **Manifest**: job id, timestamp, row count, and file references.
//!
//! The transform is pure: the job id and timestamp are inputs.

use chrono::{DateTime, Utc};

use crate::fingerprint::fingerprint;
use crate::models::{
    ContactRecord, JobBundle, JobStatus, Manifest, ManifestFiles, RowMapEntry, ROBOT_COUNT_RANGE,
};
use crate::normalize::normalize_text;
use crate::schema::{ContactSchema, SchemaReport};
use crate::table::Table;

pub const SOURCE_FILE: &str = "source.csv";
pub const ROWMAP_FILE: &str = "rowmap.csv";

/// Caller-controlled parameters for a new job.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// Base name (no extension) of the outbound call-list file.
    pub output_name: String,
    /// Name of the contact file as uploaded, recorded in the manifest.
    pub source_filename: String,
    pub robot_count: u8,
    pub schema: ContactSchema,
}

impl ExportRequest {
    /// A request with no recorded source file and a single robot.
    pub fn new(output_name: impl Into<String>, schema: ContactSchema) -> Self {
        Self {
            output_name: output_name.into(),
            source_filename: String::new(),
            robot_count: *ROBOT_COUNT_RANGE.start(),
            schema,
        }
    }

    pub fn with_source_filename(mut self, name: impl Into<String>) -> Self {
        self.source_filename = name.into();
        self
    }

    /// Robot count, clamped to [`ROBOT_COUNT_RANGE`].
    pub fn with_robot_count(mut self, count: u8) -> Self {
        self.robot_count = count.clamp(*ROBOT_COUNT_RANGE.start(), *ROBOT_COUNT_RANGE.end());
        self
    }
}

/// Result of [`build_export`]: the bundle to persist plus the schema check.
#[derive(Debug, Clone)]
pub struct ExportBundle {
    pub job: JobBundle,
    pub schema_report: SchemaReport,
}

pub fn build_export(
    contacts: &Table,
    request: &ExportRequest,
    job_id: &str,
    created_at: DateTime<Utc>,
) -> ExportBundle {
    let schema = &request.schema;
    let schema_report = schema.validate(contacts);

    let upload = build_upload(contacts, schema);
    let rowmap = build_rowmap(contacts, schema);

    let manifest = Manifest {
        job_id: job_id.to_string(),
        created_at,
        original_filename: request.output_name.clone(),
        source_filename: request.source_filename.clone(),
        robot_count: request.robot_count,
        status: JobStatus::Created,
        total_rows: contacts.len(),
        files: ManifestFiles {
            source: SOURCE_FILE.to_string(),
            upload: format!("{}.csv", request.output_name),
            rowmap: ROWMAP_FILE.to_string(),
        },
    };

    ExportBundle {
        job: JobBundle {
            manifest,
            source: contacts.clone(),
            upload,
            rowmap,
        },
        schema_report,
    }
}

fn build_upload(contacts: &Table, schema: &ContactSchema) -> Table {
    let mut renamed = contacts.clone();
    if renamed.has_column(&schema.company_alias) && !renamed.has_column(&schema.company) {
        renamed.rename_column(&schema.company_alias, &schema.company);
    }
    let projected = renamed.select(&schema.upload_columns());
    if projected.columns().is_empty() {
        // Nothing recognizable: ship the table as-is rather than an empty file.
        renamed
    } else {
        projected
    }
}

/// One rowmap entry per contact row; never skips a row.
pub fn build_rowmap(contacts: &Table, schema: &ContactSchema) -> Vec<RowMapEntry> {
    ContactRecord::from_table(contacts, schema)
        .into_iter()
        .enumerate()
        .map(|(idx, c)| RowMapEntry {
            row_key: fingerprint(c.company.as_deref(), c.phone.as_deref()),
            company_normalized: normalize_text(c.company.as_deref()),
            company: c.company,
            phone: c.phone,
            external_id: c.external_id,
            index_in_source: idx,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request() -> ExportRequest {
        ExportRequest::new("call-list", ContactSchema::default())
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_alias_renamed_and_projected() {
        let contacts = Table::from_rows(
            &["IDの頭にID", "顧客名", "電話番号", "住所統合", "メモ"],
            &[&["ID1", "A社", "03-1111-2222", "東京都", "x"]],
        );
        let out = build_export(&contacts, &request(), "job1", now());
        let upload = &out.job.upload;
        assert_eq!(
            upload.columns(),
            &["社名".to_string(), "電話番号".to_string(), "住所統合".to_string()]
        );
        assert_eq!(upload.get(0, "社名"), Some("A社"));
    }

    #[test]
    fn test_rowmap_one_entry_per_row() {
        let contacts = Table::from_rows(
            &["IDの頭にID", "社名", "電話番号"],
            &[
                &["ID1", "A社", "03-1111-2222"],
                &["ID2", "", ""],
                &["", "C社", "+81 90-0000-0000"],
            ],
        );
        let out = build_export(&contacts, &request(), "job1", now());
        let rowmap = &out.job.rowmap;
        assert_eq!(rowmap.len(), contacts.len());
        assert_eq!(rowmap[0].external_id.as_deref(), Some("ID1"));
        assert_eq!(rowmap[0].row_key, fingerprint(Some("A社"), Some("0311112222")));
        assert_eq!(rowmap[1].row_key, fingerprint(None, None));
        assert_eq!(rowmap[1].company_normalized, "");
        assert_eq!(rowmap[2].external_id, None);
        assert_eq!(rowmap[2].phone.as_deref(), Some("+81 90-0000-0000"));
        for (i, e) in rowmap.iter().enumerate() {
            assert_eq!(e.index_in_source, i);
        }
    }

    #[test]
    fn test_manifest_fields() {
        let contacts = Table::from_rows(&["社名", "電話番号"], &[&["A社", "0311112222"]]);
        let out = build_export(&contacts, &request(), "20240601_1030_ABCDE", now());
        let m = &out.job.manifest;
        assert_eq!(m.job_id, "20240601_1030_ABCDE");
        assert_eq!(m.total_rows, 1);
        assert_eq!(m.created_at, now());
        assert_eq!(m.files.upload, "call-list.csv");
        assert_eq!(m.files.rowmap, ROWMAP_FILE);
        assert_eq!(m.files.source, SOURCE_FILE);
        assert_eq!(m.status, JobStatus::Created);
        assert_eq!(m.robot_count, 1);
    }

    #[test]
    fn test_job_metadata_recorded() {
        let contacts = Table::from_rows(&["社名", "電話番号"], &[&["A社", "0311112222"]]);
        let req = request()
            .with_source_filename("顧客リスト.csv")
            .with_robot_count(3);
        let m = build_export(&contacts, &req, "job1", now()).job.manifest;
        assert_eq!(m.source_filename, "顧客リスト.csv");
        assert_eq!(m.robot_count, 3);

        assert_eq!(request().with_robot_count(0).robot_count, 1);
        assert_eq!(request().with_robot_count(9).robot_count, 5);
    }

    #[test]
    fn test_missing_columns_degrade_to_partial_projection() {
        let contacts = Table::from_rows(&["社名", "備考"], &[&["A社", "memo"]]);
        let out = build_export(&contacts, &request(), "job1", now());
        assert_eq!(out.job.upload.columns(), &["社名".to_string()]);
        assert!(out
            .schema_report
            .missing_required
            .contains(&"電話番号".to_string()));
        assert_eq!(out.job.rowmap.len(), 1);
    }

    #[test]
    fn test_no_recognized_columns_keeps_table() {
        let contacts = Table::from_rows(&["foo", "bar"], &[&["1", "2"]]);
        let out = build_export(&contacts, &request(), "job1", now());
        assert_eq!(out.job.upload.columns().len(), 2);
        assert_eq!(out.job.rowmap.len(), 1);
    }

    #[test]
    fn test_deterministic_for_same_input() {
        let contacts = Table::from_rows(&["社名", "電話番号"], &[&["A社", "0311112222"]]);
        let a = build_export(&contacts, &request(), "job1", now());
        let b = build_export(&contacts, &request(), "job1", now());
        assert_eq!(a.job, b.job);
    }
}
