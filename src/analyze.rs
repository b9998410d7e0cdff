//! Analysis commands: classify, reconcile, and report.
//!
//! `recon analyze` runs the full analysis pipeline against a stored job:
//!
//! ```text
//! call results ──▶ classify ──▶ reconcile(job) ──▶ report file
//!                      └──────▶ statistics ──────▶ stdout
//! ```
//!
//! `recon classify` runs only the classifier and writes the input table
//! back with the outcome column filled in.

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};

use call_reconcile_core::classify::{classify, ClassifyReport};
use call_reconcile_core::merge::{reconcile, MergeReport, Reconciliation};
use call_reconcile_core::models::{
    apply_outcomes, CallResultRecord, JobStatus, StatisticsSnapshot, StoredJob,
};
use call_reconcile_core::schema::SchemaReport;
use call_reconcile_core::stats;
use call_reconcile_core::store::JobStore;
use call_reconcile_core::table::Table;

use crate::config::Config;
use crate::job_store::FsJobStore;
use crate::stats::print_statistics;
use crate::table_io::{read_table, write_table};

/// Everything one analysis run produces.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub schema_report: SchemaReport,
    pub classify_report: ClassifyReport,
    pub statistics: StatisticsSnapshot,
    pub reconciliation: Reconciliation,
}

/// Machine-readable summary printed by `--json`.
#[derive(Serialize)]
struct AnalysisSummary<'a> {
    job_id: &'a str,
    report_path: String,
    statistics: &'a StatisticsSnapshot,
    classification: &'a ClassifyReport,
    merge: &'a MergeReport,
    missing_columns: Vec<&'a str>,
}

/// Classify a call table in memory, returning the records and the report.
pub fn classify_table(config: &Config, calls: &Table) -> (Vec<CallResultRecord>, ClassifyReport) {
    let mut records = CallResultRecord::from_table(calls, &config.schema.calls);
    let report = classify(&mut records, &config.rule_set());
    (records, report)
}

/// Run classification, statistics, and the merge for one job.
///
/// Pure with respect to its inputs: running it twice on the same tables
/// yields the same analysis.
pub fn analyze(config: &Config, calls: &Table, job: &StoredJob) -> Analysis {
    let schema_report = config.schema.calls.validate(calls);
    let (records, classify_report) = classify_table(config, calls);
    let statistics = stats::compute(&records);
    let reconciliation = reconcile(
        &records,
        calls.columns(),
        job,
        &config.schema.calls,
        &config.schema.contacts,
        config.analysis.join,
    );
    Analysis {
        schema_report,
        classify_report,
        statistics,
        reconciliation,
    }
}

fn log_analysis(job_id: &str, analysis: &Analysis) {
    for column in &analysis.schema_report.missing_required {
        tracing::warn!(%column, "call table is missing a required column");
    }
    let classify = &analysis.classify_report;
    if classify.malformed_durations > 0 {
        tracing::warn!(
            count = classify.malformed_durations,
            "malformed durations treated as zero seconds"
        );
    }
    if classify.unmatched > 0 {
        tracing::info!(count = classify.unmatched, "records matched no classification rule");
    }
    let merge = &analysis.reconciliation.report;
    for ambiguous in &merge.ambiguous {
        tracing::warn!(
            %job_id,
            row = ambiguous.call_index,
            key = %ambiguous.key,
            candidates = ambiguous.candidates,
            "ambiguous match, first rowmap entry used"
        );
    }
    if merge.unmatched > 0 {
        tracing::warn!(%job_id, count = merge.unmatched, "call records without a matching contact");
    }
}

fn default_report_path(store: &FsJobStore, job_id: &str) -> PathBuf {
    let stamp = Utc::now().format("%Y%m%d_%H%M");
    store
        .job_dir(job_id)
        .join(format!("結果_{}_{}.csv", job_id, stamp))
}

/// `recon analyze`: reconcile a call-result table against a stored job.
pub async fn run_analyze(
    config: &Config,
    job_id: &str,
    results_path: &Path,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    let store = FsJobStore::new(&config.store.root, config.export.upload_bom);
    let job = store.get(job_id).await?;
    let calls = read_table(results_path).await?;

    let analysis = analyze(config, &calls, &job);
    log_analysis(job_id, &analysis);

    let report_path = match output {
        Some(p) => p.to_path_buf(),
        None => default_report_path(&store, job_id),
    };
    let report = analysis
        .reconciliation
        .to_table(&config.schema.calls, &config.schema.contacts);
    write_table(&report_path, &report, false).await?;
    store.set_status(job_id, JobStatus::Analyzed).await?;

    let merge = &analysis.reconciliation.report;
    if json {
        let summary = AnalysisSummary {
            job_id,
            report_path: report_path.display().to_string(),
            statistics: &analysis.statistics,
            classification: &analysis.classify_report,
            merge,
            missing_columns: analysis
                .schema_report
                .missing_required
                .iter()
                .chain(&analysis.schema_report.missing_optional)
                .map(String::as_str)
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("analyze {}", job_id);
    println!("  calls: {}", calls.len());
    println!(
        "  classified: {} (already set: {})",
        analysis.classify_report.total - analysis.classify_report.skipped,
        analysis.classify_report.skipped
    );
    println!();
    print_statistics(&analysis.statistics);
    println!();
    println!("  matched: {} / {}", merge.matched(), merge.total);
    println!("    by row key: {}", merge.matched_by_row_key);
    println!("    by company: {}", merge.matched_by_company);
    println!("  ambiguous: {}", merge.ambiguous.len());
    println!("  report: {}", report_path.display());
    println!("ok");
    Ok(())
}

/// `recon classify`: classify a call table without touching any job.
pub async fn run_classify(config: &Config, results_path: &Path, output: Option<&Path>) -> Result<()> {
    let calls = read_table(results_path).await?;
    let (records, report) = classify_table(config, &calls);
    let classified = apply_outcomes(&calls, &records, &config.schema.calls);

    match output {
        Some(path) => {
            write_table(path, &classified, false).await?;
            eprintln!("Classified {} records to {}", report.total, path.display());
        }
        None => {
            let bytes = crate::table_io::encode_csv(&classified, false)?;
            print!("{}", String::from_utf8_lossy(&bytes));
        }
    }

    tracing::info!(
        total = report.total,
        skipped = report.skipped,
        unmatched = report.unmatched,
        "classification finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use call_reconcile_core::export::{build_export, ExportRequest};
    use call_reconcile_core::models::Outcome;

    fn job(config: &Config) -> StoredJob {
        let contacts = Table::from_rows(
            &["IDの頭にID", "顧客名", "電話番号", "住所統合"],
            &[
                &["ID1", "A社", "03-1111-1111", "東京都"],
                &["ID2", "B社", "03-2222-2222", "大阪府"],
            ],
        );
        let request = ExportRequest::new("list", config.schema.contacts.clone());
        build_export(&contacts, &request, "job", Utc::now()).job.into()
    }

    #[test]
    fn test_analyze_end_to_end() {
        let config = Config::default();
        let calls = Table::from_rows(
            &["社名", "電話番号", "ステータス", "架電結果", "要約", "通話時間"],
            &[
                &["A社", "0311111111", "獲得", "", "", "2:00"],
                &["B社", "0322222222", "通話済み", "", "不要です", "0:20"],
                &["X社", "123", "応答なし", "", "", "0"],
            ],
        );
        let analysis = analyze(&config, &calls, &job(&config));

        assert_eq!(analysis.statistics.total_calls, 3);
        assert_eq!(analysis.statistics.appointments, 1);
        assert_eq!(analysis.statistics.valid_calls, 2);
        assert_eq!(analysis.statistics.invalid_phones, 1);
        assert_eq!(analysis.statistics.total_duration, "0:02:20");

        let records = &analysis.reconciliation.records;
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].external_id.as_deref(), Some("ID1"));
        assert_eq!(records[0].call.outcome.as_deref(), Some(Outcome::Appointment.label()));
        assert_eq!(records[1].address.as_deref(), Some("大阪府"));
        assert_eq!(records[2].external_id, None);
        assert_eq!(analysis.reconciliation.report.unmatched, 1);
    }

    #[test]
    fn test_analyze_is_repeatable() {
        let config = Config::default();
        let stored = job(&config);
        let calls = Table::from_rows(
            &["社名", "ステータス", "通話時間"],
            &[&["A社", "自動音声", "0:05"], &["B社", "通話済み", "1:00"]],
        );
        let a = analyze(&config, &calls, &stored);
        let b = analyze(&config, &calls, &stored);
        assert_eq!(a.reconciliation.records, b.reconciliation.records);
        assert_eq!(a.statistics, b.statistics);
        assert!(a.schema_report.missing_optional.contains(&"架電結果".to_string()));
    }
}
