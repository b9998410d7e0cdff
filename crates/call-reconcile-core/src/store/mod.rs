//! Job storage abstraction.
//!
//! The [`JobStore`] trait replaces a process-global job registry: the
//! ingestion path hands a [`JobBundle`] to `create`, and the analysis path
//! asks `get` for the manifest, contact table, and rowmap it needs. Core
//! functions stay pure given whatever the store returns.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{JobBundle, JobStatus, Manifest, StoredJob};

/// Abstract storage backend for jobs.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`create`](JobStore::create) | Persist a new job |
/// | [`get`](JobStore::get) | Load a job for analysis, or `ManifestNotFound` |
/// | [`list`](JobStore::list) | All manifests, newest first |
/// | [`set_status`](JobStore::set_status) | Advance a job's status (the only manifest field that changes) |
/// | [`delete`](JobStore::delete) | Remove one job and everything stored with it |
/// | [`clear`](JobStore::clear) | Remove every job |
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persist a new job. Fails if a job with the same id already exists.
    async fn create(&self, job: &JobBundle) -> Result<Manifest>;

    /// Load a job by id.
    async fn get(&self, job_id: &str) -> Result<StoredJob>;

    /// List every stored manifest, newest first.
    async fn list(&self) -> Result<Vec<Manifest>>;

    /// Update a job's status, returning the updated manifest.
    async fn set_status(&self, job_id: &str, status: JobStatus) -> Result<Manifest>;

    /// Remove a job. Fails with `ManifestNotFound` for unknown ids.
    async fn delete(&self, job_id: &str) -> Result<()>;

    /// Remove every listed job, returning how many were removed.
    async fn clear(&self) -> Result<usize> {
        let manifests = self.list().await?;
        for m in &manifests {
            self.delete(&m.job_id).await?;
        }
        Ok(manifests.len())
    }
}

/// Sort manifests newest first, breaking ties by job id for a stable order.
pub fn sort_newest_first(manifests: &mut [Manifest]) {
    manifests.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.job_id.cmp(&a.job_id))
    });
}
