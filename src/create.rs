//! Job creation command.
//!
//! Reads a contact table, runs the core export transform, and persists the
//! resulting bundle through the job store: contact table → upload list +
//! rowmap + manifest → `<store root>/<job_id>/`.

use anyhow::{bail, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};

use call_reconcile_core::export::{build_export, ExportRequest};
use call_reconcile_core::models::{generate_job_id, Manifest, ROBOT_COUNT_RANGE};
use call_reconcile_core::store::JobStore;

use crate::config::Config;
use crate::job_store::FsJobStore;
use crate::table_io::read_table;

/// Outcome of a successful `job create`.
#[derive(Debug, Clone)]
pub struct CreatedJob {
    pub manifest: Manifest,
    pub upload_path: PathBuf,
    pub missing_columns: Vec<String>,
}

/// Create a job from a contact table and store it.
pub async fn create_job(
    config: &Config,
    store: &FsJobStore,
    contacts_path: &Path,
    output_name: Option<&str>,
    robot_count: u8,
) -> Result<CreatedJob> {
    let contacts = read_table(contacts_path).await?;
    if contacts.is_empty() {
        bail!("contact table is empty: {}", contacts_path.display());
    }

    let output_name = output_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(&config.export.default_output_name);
    if output_name.contains(['/', '\\']) {
        bail!("output name must not contain path separators: '{}'", output_name);
    }

    if !ROBOT_COUNT_RANGE.contains(&robot_count) {
        bail!(
            "robot count must be between {} and {}, got {}",
            ROBOT_COUNT_RANGE.start(),
            ROBOT_COUNT_RANGE.end(),
            robot_count
        );
    }
    let source_filename = contacts_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let request = ExportRequest::new(output_name, config.schema.contacts.clone())
        .with_source_filename(source_filename)
        .with_robot_count(robot_count);
    let now = Utc::now();
    let job_id = generate_job_id(now);
    let export = build_export(&contacts, &request, &job_id, now);

    let report = &export.schema_report;
    for column in &report.missing_required {
        tracing::warn!(%column, "contact table is missing a required column");
    }
    for column in &report.missing_optional {
        tracing::info!(%column, "contact table has no optional column");
    }

    let manifest = store.create(&export.job).await?;
    let upload_path = store.job_dir(&job_id).join(&manifest.files.upload);

    let mut missing_columns = report.missing_required.clone();
    missing_columns.extend(report.missing_optional.iter().cloned());

    Ok(CreatedJob {
        manifest,
        upload_path,
        missing_columns,
    })
}

/// `recon job create`: create the job and print a summary.
pub async fn run_create(
    config: &Config,
    contacts_path: &Path,
    name: Option<&str>,
    robot_count: u8,
) -> Result<()> {
    let store = FsJobStore::new(&config.store.root, config.export.upload_bom);
    let created = create_job(config, &store, contacts_path, name, robot_count).await?;

    println!("job create");
    println!("  job id: {}", created.manifest.job_id);
    println!("  rows: {}", created.manifest.total_rows);
    println!("  robots: {}", created.manifest.robot_count);
    println!("  upload: {}", created.upload_path.display());
    if !created.missing_columns.is_empty() {
        println!("  missing columns: {}", created.missing_columns.join(", "));
    }
    println!("ok");
    Ok(())
}
