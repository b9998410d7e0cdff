//! Directory-backed [`JobStore`] implementation.
//!
//! Each job lives in its own directory under the configured root:
//!
//! ```text
//! <root>/<job_id>/
//!   manifest.json      job id, timestamp, row count, file references
//!   source.csv         the contact table as received
//!   <output>.csv       outbound call list (optionally with a BOM)
//!   rowmap.csv         fingerprint → external id side table
//! ```
//!
//! File names other than `manifest.json` are taken from the manifest, so
//! a job written by an older build stays readable.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use call_reconcile_core::models::{JobBundle, JobStatus, Manifest, RowMapEntry, StoredJob};
use call_reconcile_core::store::{sort_newest_first, JobStore};
use call_reconcile_core::table::Table;
use call_reconcile_core::{ReconcileError, Result};

use crate::table_io::{read_table, write_table};

pub const MANIFEST_FILE: &str = "manifest.json";

pub struct FsJobStore {
    root: PathBuf,
    upload_bom: bool,
}

impl FsJobStore {
    pub fn new(root: impl Into<PathBuf>, upload_bom: bool) -> Self {
        Self {
            root: root.into(),
            upload_bom,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn job_dir(&self, job_id: &str) -> PathBuf {
        self.root.join(job_id)
    }

    async fn read_manifest(&self, job_id: &str) -> Result<Manifest> {
        let path = self.job_dir(job_id).join(MANIFEST_FILE);
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ReconcileError::ManifestNotFound(job_id.to_string()))
            }
            Err(e) => return Err(store_err(&path, e)),
        };
        serde_json::from_slice(&bytes).map_err(|e| store_err(&path, e))
    }

    async fn write_manifest(&self, manifest: &Manifest) -> Result<()> {
        let path = self.job_dir(&manifest.job_id).join(MANIFEST_FILE);
        let json = serde_json::to_vec_pretty(manifest).map_err(|e| store_err(&path, e))?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| store_err(&path, e))
    }
}

fn store_err(path: &Path, e: impl std::fmt::Display) -> ReconcileError {
    ReconcileError::Store(format!("{}: {}", path.display(), e))
}

async fn write_job_table(dir: &Path, name: &str, table: &Table, bom: bool) -> Result<()> {
    let path = dir.join(name);
    write_table(&path, table, bom)
        .await
        .map_err(|e| store_err(&path, format!("{:#}", e)))
}

/// Job ids become directory names; refuse anything that could escape the root.
fn check_job_id(job_id: &str) -> Result<()> {
    let bad = job_id.is_empty()
        || job_id == "."
        || job_id == ".."
        || job_id.contains(['/', '\\']);
    if bad {
        return Err(ReconcileError::Store(format!("invalid job id '{}'", job_id)));
    }
    Ok(())
}

#[async_trait]
impl JobStore for FsJobStore {
    async fn create(&self, job: &JobBundle) -> Result<Manifest> {
        let manifest = &job.manifest;
        check_job_id(&manifest.job_id)?;
        let dir = self.job_dir(&manifest.job_id);
        if tokio::fs::try_exists(dir.join(MANIFEST_FILE))
            .await
            .unwrap_or(false)
        {
            return Err(ReconcileError::Store(format!(
                "job '{}' already exists",
                manifest.job_id
            )));
        }
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| store_err(&dir, e))?;

        write_job_table(&dir, &manifest.files.source, &job.source, false).await?;
        write_job_table(&dir, &manifest.files.upload, &job.upload, self.upload_bom).await?;
        let rowmap = RowMapEntry::to_table(&job.rowmap);
        write_job_table(&dir, &manifest.files.rowmap, &rowmap, false).await?;

        // Manifest last: its presence marks the job as complete.
        self.write_manifest(manifest).await?;

        tracing::info!(job_id = %manifest.job_id, dir = %dir.display(), "job stored");
        Ok(manifest.clone())
    }

    async fn get(&self, job_id: &str) -> Result<StoredJob> {
        check_job_id(job_id)?;
        let manifest = self.read_manifest(job_id).await?;
        let dir = self.job_dir(job_id);

        let source_path = dir.join(&manifest.files.source);
        let source = read_table(&source_path)
            .await
            .map_err(|e| store_err(&source_path, format!("{:#}", e)))?;

        let rowmap_path = dir.join(&manifest.files.rowmap);
        let rowmap = read_table(&rowmap_path)
            .await
            .map(|t| RowMapEntry::from_table(&t))
            .map_err(|e| store_err(&rowmap_path, format!("{:#}", e)))?;

        if rowmap.len() != manifest.total_rows {
            tracing::warn!(
                job_id,
                rowmap = rowmap.len(),
                manifest = manifest.total_rows,
                "rowmap size differs from manifest row count"
            );
        }

        Ok(StoredJob {
            manifest,
            source,
            rowmap,
        })
    }

    async fn list(&self) -> Result<Vec<Manifest>> {
        let mut manifests = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(manifests),
            Err(e) => return Err(store_err(&self.root, e)),
        };
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| store_err(&self.root, e))?
        {
            let Some(job_id) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            match self.read_manifest(&job_id).await {
                Ok(m) => manifests.push(m),
                Err(ReconcileError::ManifestNotFound(_)) => {
                    tracing::debug!(%job_id, "skipping directory without manifest");
                }
                Err(e) => tracing::warn!(%job_id, error = %e, "unreadable manifest"),
            }
        }
        sort_newest_first(&mut manifests);
        Ok(manifests)
    }

    async fn set_status(&self, job_id: &str, status: JobStatus) -> Result<Manifest> {
        check_job_id(job_id)?;
        let mut manifest = self.read_manifest(job_id).await?;
        if manifest.status != status {
            manifest.status = status;
            self.write_manifest(&manifest).await?;
            tracing::debug!(%job_id, %status, "job status updated");
        }
        Ok(manifest)
    }

    async fn delete(&self, job_id: &str) -> Result<()> {
        check_job_id(job_id)?;
        self.read_manifest(job_id).await?;
        let dir = self.job_dir(job_id);
        tokio::fs::remove_dir_all(&dir)
            .await
            .map_err(|e| store_err(&dir, e))?;
        tracing::info!(%job_id, "job deleted");
        Ok(())
    }
}
