//! Job persistence.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::JobError;
use crate::job::Job;

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Job store trait for persistence.
///
/// Records are whole-job documents keyed by id; `save` is a full overwrite.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Save (create or overwrite) a job.
    async fn save(&self, job: &Job) -> Result<(), JobError>;

    /// Load a job by ID.
    async fn load(&self, id: &Uuid) -> Result<Option<Job>, JobError>;

    /// Load every persisted job, oldest first.
    async fn load_all(&self) -> Result<Vec<Job>, JobError>;

    /// Load the jobs of one owner, oldest first.
    ///
    /// The default implementation is a full scan over [`load_all`]: cost is
    /// proportional to every job ever stored, and there is no pagination.
    ///
    /// [`load_all`]: JobStore::load_all
    async fn load_by_owner(&self, owner: &str) -> Result<Vec<Job>, JobError> {
        let mut jobs = self.load_all().await?;
        jobs.retain(|job| job.owner() == owner);
        Ok(jobs)
    }
}

fn sort_oldest_first(jobs: &mut [Job]) {
    jobs.sort_by(|a, b| {
        a.created_at()
            .cmp(&b.created_at())
            .then_with(|| a.id().cmp(&b.id()))
    });
}

/// In-memory job store for testing.
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<Uuid, Job>>,
}

impl MemoryJobStore {
    /// Create a new memory store.
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryJobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn save(&self, job: &Job) -> Result<(), JobError> {
        let mut jobs = self.jobs.write().await;
        jobs.insert(job.id(), job.clone());
        Ok(())
    }

    async fn load(&self, id: &Uuid) -> Result<Option<Job>, JobError> {
        let jobs = self.jobs.read().await;
        Ok(jobs.get(id).cloned())
    }

    async fn load_all(&self) -> Result<Vec<Job>, JobError> {
        let jobs = self.jobs.read().await;
        let mut all: Vec<Job> = jobs.values().cloned().collect();
        sort_oldest_first(&mut all);
        Ok(all)
    }
}

/// File system based job store.
///
/// One JSON document per job, named by id:
/// ```text
/// {job_dir}/
/// ├── {uuid}.json
/// └── {uuid}.json
/// ```
/// Writes go to a temporary file that is renamed over the record, so a
/// concurrent reader sees either the previous or the new document.
pub struct FileJobStore {
    job_dir: PathBuf,
}

impl FileJobStore {
    /// Create a new file-based job store, creating `job_dir` if needed.
    pub async fn new(job_dir: impl Into<PathBuf>) -> Result<Self, JobError> {
        let job_dir = job_dir.into();

        fs::create_dir_all(&job_dir).await.map_err(|e| {
            JobError::Storage(format!("Failed to create job directory {:?}: {}", job_dir, e))
        })?;

        debug!("FileJobStore initialized at {:?}", job_dir);

        Ok(Self { job_dir })
    }

    pub fn job_dir(&self) -> &Path {
        &self.job_dir
    }

    fn job_path(&self, id: &Uuid) -> PathBuf {
        self.job_dir.join(format!("{}.json", id))
    }

    async fn read_job(path: &Path) -> Result<Job, JobError> {
        let content = fs::read_to_string(path).await?;
        serde_json::from_str(&content).map_err(|e| {
            JobError::Serialization(format!("Failed to deserialize job {:?}: {}", path, e))
        })
    }
}

#[async_trait]
impl JobStore for FileJobStore {
    async fn save(&self, job: &Job) -> Result<(), JobError> {
        let path = self.job_path(&job.id());
        let tmp = self.job_dir.join(format!(
            "{}.json.{}.tmp",
            job.id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        let content = serde_json::to_string_pretty(job)
            .map_err(|e| JobError::Serialization(format!("Failed to serialize job: {}", e)))?;

        fs::write(&tmp, content)
            .await
            .map_err(|e| JobError::Storage(format!("Failed to write job file: {}", e)))?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(JobError::Storage(format!("Failed to replace job file: {}", e)));
        }

        debug!("Saved job '{}' ({}) to {:?}", job.id(), job.state(), path);
        Ok(())
    }

    async fn load(&self, id: &Uuid) -> Result<Option<Job>, JobError> {
        match Self::read_job(&self.job_path(id)).await {
            Ok(job) => Ok(Some(job)),
            Err(JobError::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(JobError::Io(e)) => Err(JobError::Storage(format!("Failed to read job file: {}", e))),
            Err(e) => Err(e),
        }
    }

    async fn load_all(&self) -> Result<Vec<Job>, JobError> {
        let mut jobs = Vec::new();
        let mut entries = fs::read_dir(&self.job_dir).await.map_err(|e| {
            JobError::Storage(format!("Failed to read job directory: {}", e))
        })?;

        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            JobError::Storage(format!("Failed to read directory entry: {}", e))
        })? {
            let path = entry.path();

            if path.extension().is_some_and(|ext| ext == "json") {
                match Self::read_job(&path).await {
                    Ok(job) => jobs.push(job),
                    Err(e) => warn!("Skipping unreadable job file {:?}: {}", path, e),
                }
            }
        }

        sort_oldest_first(&mut jobs);

        debug!("Scanned {} jobs from {:?}", jobs.len(), self.job_dir);
        Ok(jobs)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
