//! Job history commands: `recon job list`, `show`, `delete`, and `clear`.

use anyhow::{bail, Result};
use chrono::{DateTime, Local, Utc};

use call_reconcile_core::store::JobStore;

use crate::config::Config;
use crate::job_store::FsJobStore;

fn open_store(config: &Config) -> FsJobStore {
    FsJobStore::new(&config.store.root, config.export.upload_bom)
}

pub async fn run_list(config: &Config) -> Result<()> {
    let store = open_store(config);
    let manifests = store.list().await?;

    if manifests.is_empty() {
        println!("No jobs in {}", store.root().display());
        return Ok(());
    }

    let now = Utc::now();
    println!(
        "{:<22} {:>6} {:>6}   {:<9} {:<30} {}",
        "JOB ID", "ROWS", "ROBOTS", "STATUS", "CREATED", "SOURCE"
    );
    println!("{}", "-".repeat(96));
    for m in &manifests {
        println!(
            "{:<22} {:>6} {:>6}   {:<9} {:<30} {}",
            m.job_id,
            m.total_rows,
            m.robot_count,
            m.status,
            format_created_at(m.created_at, now),
            display_source(&m.source_filename)
        );
    }
    println!();
    println!("{} job(s)", manifests.len());
    Ok(())
}

pub async fn run_show(config: &Config, job_id: &str) -> Result<()> {
    let store = open_store(config);
    let job = store.get(job_id).await?;
    let m = &job.manifest;

    let with_id = job.rowmap.iter().filter(|e| e.external_id.is_some()).count();

    println!("--- job ---");
    println!("id: {}", m.job_id);
    println!("status: {}", m.status);
    println!("created_at: {}", format_created_at(m.created_at, Utc::now()));
    println!("source file: {}", display_source(&m.source_filename));
    println!("output: {}", m.original_filename);
    println!("robots: {}", m.robot_count);
    println!("rows: {}", m.total_rows);
    println!("rowmap entries: {} ({} with external id)", job.rowmap.len(), with_id);
    println!("dir: {}", store.job_dir(&m.job_id).display());
    println!("--- files ---");
    println!("source: {}", m.files.source);
    println!("upload: {}", m.files.upload);
    println!("rowmap: {}", m.files.rowmap);
    Ok(())
}

pub async fn run_delete(config: &Config, job_id: &str) -> Result<()> {
    let store = open_store(config);
    store.delete(job_id).await?;
    println!("job delete {}", job_id);
    println!("ok");
    Ok(())
}

/// `recon job clear`: remove every job. Refuses to run without `--yes`.
pub async fn run_clear(config: &Config, confirmed: bool) -> Result<()> {
    if !confirmed {
        bail!("refusing to clear job history without --yes");
    }
    let store = open_store(config);
    let removed = store.clear().await?;
    println!("job clear");
    println!("  removed: {}", removed);
    println!("ok");
    Ok(())
}

fn display_source(name: &str) -> &str {
    if name.is_empty() {
        "-"
    } else {
        name
    }
}

/// Creation time in local time, with the job's age in brackets.
fn format_created_at(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let local = created_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M");
    match job_age(created_at, now) {
        Some(age) => format!("{} ({})", local, age),
        None => local.to_string(),
    }
}

/// Coarse age of a job, or `None` when it is older than a month or dated
/// in the future.
fn job_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> Option<String> {
    let minutes = (now - created_at).num_minutes();
    let plural = |n: i64, unit: &str| format!("{} {}{} ago", n, unit, if n == 1 { "" } else { "s" });
    match minutes {
        m if m < 0 => None,
        0 => Some("just now".to_string()),
        m if m < 60 => Some(plural(m, "min")),
        m if m < 60 * 24 => Some(plural(m / 60, "hour")),
        m if m < 60 * 24 * 30 => Some(plural(m / (60 * 24), "day")),
        _ => None,
    }
}
