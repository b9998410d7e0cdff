//! In-memory [`JobStore`] implementation for tests and embedding hosts.
//!
//! Uses a `HashMap` behind `std::sync::RwLock` for thread safety.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{ReconcileError, Result};
use crate::models::{JobBundle, JobStatus, Manifest, StoredJob};

use super::{sort_newest_first, JobStore};

pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<String, StoredJob>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryJobStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> ReconcileError {
    ReconcileError::Store("job registry lock poisoned".to_string())
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, job: &JobBundle) -> Result<Manifest> {
        let mut jobs = self.jobs.write().map_err(poisoned)?;
        let id = &job.manifest.job_id;
        if jobs.contains_key(id) {
            return Err(ReconcileError::Store(format!("job '{}' already exists", id)));
        }
        jobs.insert(id.clone(), job.clone().into());
        Ok(job.manifest.clone())
    }

    async fn get(&self, job_id: &str) -> Result<StoredJob> {
        let jobs = self.jobs.read().map_err(poisoned)?;
        jobs.get(job_id)
            .cloned()
            .ok_or_else(|| ReconcileError::ManifestNotFound(job_id.to_string()))
    }

    async fn list(&self) -> Result<Vec<Manifest>> {
        let jobs = self.jobs.read().map_err(poisoned)?;
        let mut manifests: Vec<Manifest> = jobs.values().map(|j| j.manifest.clone()).collect();
        sort_newest_first(&mut manifests);
        Ok(manifests)
    }

    async fn set_status(&self, job_id: &str, status: JobStatus) -> Result<Manifest> {
        let mut jobs = self.jobs.write().map_err(poisoned)?;
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| ReconcileError::ManifestNotFound(job_id.to_string()))?;
        job.manifest.status = status;
        Ok(job.manifest.clone())
    }

    async fn delete(&self, job_id: &str) -> Result<()> {
        let mut jobs = self.jobs.write().map_err(poisoned)?;
        jobs.remove(job_id)
            .map(|_| ())
            .ok_or_else(|| ReconcileError::ManifestNotFound(job_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{build_export, ExportRequest};
    use crate::schema::ContactSchema;
    use crate::table::Table;
    use chrono::{Duration, TimeZone, Utc};

    fn bundle(job_id: &str, minutes: i64) -> JobBundle {
        let contacts = Table::from_rows(&["社名", "電話番号"], &[&["A社", "0311112222"]]);
        let request = ExportRequest::new("list", ContactSchema::default());
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes);
        build_export(&contacts, &request, job_id, at).job
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let store = InMemoryJobStore::new();
        let job = bundle("job-a", 0);
        let manifest = store.create(&job).await.unwrap();
        assert_eq!(manifest.job_id, "job-a");

        let stored = store.get("job-a").await.unwrap();
        assert_eq!(stored.rowmap.len(), 1);
        assert_eq!(stored.source, job.source);
    }

    #[tokio::test]
    async fn test_unknown_job_is_manifest_not_found() {
        let store = InMemoryJobStore::new();
        let err = store.get("missing").await.unwrap_err();
        assert_eq!(err, ReconcileError::ManifestNotFound("missing".to_string()));
    }

    #[tokio::test]
    async fn test_duplicate_create_rejected() {
        let store = InMemoryJobStore::new();
        store.create(&bundle("job-a", 0)).await.unwrap();
        assert!(matches!(
            store.create(&bundle("job-a", 5)).await,
            Err(ReconcileError::Store(_))
        ));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = InMemoryJobStore::new();
        store.create(&bundle("old", 0)).await.unwrap();
        store.create(&bundle("new", 30)).await.unwrap();
        store.create(&bundle("mid", 10)).await.unwrap();
        let ids: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.job_id)
            .collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_set_status() {
        let store = InMemoryJobStore::new();
        store.create(&bundle("job-a", 0)).await.unwrap();
        let m = store.set_status("job-a", JobStatus::Analyzed).await.unwrap();
        assert_eq!(m.status, JobStatus::Analyzed);
        assert_eq!(
            store.get("job-a").await.unwrap().manifest.status,
            JobStatus::Analyzed
        );
        assert!(matches!(
            store.set_status("missing", JobStatus::Analyzed).await,
            Err(ReconcileError::ManifestNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let store = InMemoryJobStore::new();
        store.create(&bundle("a", 0)).await.unwrap();
        store.create(&bundle("b", 1)).await.unwrap();
        store.create(&bundle("c", 2)).await.unwrap();

        store.delete("b").await.unwrap();
        assert!(matches!(
            store.delete("b").await,
            Err(ReconcileError::ManifestNotFound(_))
        ));
        assert_eq!(store.list().await.unwrap().len(), 2);

        assert_eq!(store.clear().await.unwrap(), 2);
        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(store.clear().await.unwrap(), 0);
    }
}
