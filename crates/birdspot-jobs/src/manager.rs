//! Job lifecycle management.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::JobsConfig;
use crate::error::JobError;
use crate::job::{Job, TaskDescriptor};
use crate::registry::TaskRegistry;
use crate::store::JobStore;
use crate::worker::WorkerPool;

/// Creates, starts and answers queries about jobs.
///
/// A manager is an explicit context object: it owns its worker pool and
/// shares its store and registry. One manager should own a job store at a
/// time.
pub struct JobManager {
    store: Arc<dyn JobStore>,
    registry: Arc<TaskRegistry>,
    pool: WorkerPool,
    /// Per-job locks held from the state check until `running` is saved.
    start_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl JobManager {
    pub fn new(config: &JobsConfig, store: Arc<dyn JobStore>, registry: Arc<TaskRegistry>) -> Self {
        info!("Job manager started with {} workers", config.max_workers);
        Self {
            store,
            registry,
            pool: WorkerPool::new(config),
            start_locks: DashMap::new(),
        }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Persist a new, not-started job.
    pub async fn create(&self, owner: impl Into<String>, task: TaskDescriptor) -> Result<Job, JobError> {
        let job = Job::new(owner, task);
        self.store.save(&job).await?;

        info!(
            job_id = %job.id(),
            owner = %job.owner(),
            task = %job.task().task_type,
            "Created job"
        );
        Ok(job)
    }

    /// Read a job. `Ok(None)` when the id is unknown.
    ///
    /// Callers serving other principals must check [`Job::owner`] themselves.
    pub async fn get_by_id(&self, id: &Uuid) -> Result<Option<Job>, JobError> {
        self.store.load(id).await
    }

    /// All jobs of `owner`, oldest first.
    ///
    /// This scans every stored job; there is no owner index.
    pub async fn get_by_owner(&self, owner: &str) -> Result<Vec<Job>, JobError> {
        self.store.load_by_owner(owner).await
    }

    /// Mark a job running and hand it to the worker pool.
    ///
    /// The `running` record is persisted before this returns, so any read of
    /// the id afterwards sees at least `running`. The task executes in the
    /// background; its failure is recorded on the job and never returned
    /// here. Only a job persisted as `not-started` can be started; concurrent
    /// starts of one id are serialized, so exactly one of them succeeds.
    pub async fn start(&self, job: &mut Job) -> Result<(), JobError> {
        let id = job.id();
        let lock = self.start_locks.entry(id).or_default().clone();
        let guard = lock.lock().await;

        let result = self.start_locked(job).await;

        // Only the map and this call still hold the lock: nobody is waiting.
        self.start_locks.remove_if(&id, |_, held| Arc::strong_count(held) == 2);
        drop(guard);
        result
    }

    async fn start_locked(&self, job: &mut Job) -> Result<(), JobError> {
        if !self.pool.is_running() {
            return Err(JobError::WorkerError("Job manager is shut down".to_string()));
        }

        let id = job.id();
        let mut current = self.store.load(&id).await?.ok_or(JobError::NotFound(id))?;
        current.mark_running()?;
        self.store.save(&current).await?;

        let store = self.store.clone();
        let registry = self.registry.clone();
        let task = current.task().clone();

        let submitted = self.pool.submit(id, async move {
            let outcome = execute(&registry, task).await;
            finish(store.as_ref(), id, outcome).await;
        });

        if let Err(e) = submitted {
            current.fail(e.to_string())?;
            self.store.save(&current).await?;
            *job = current;
            return Err(e);
        }

        info!(job_id = %id, "Started job");
        *job = current;
        Ok(())
    }

    /// Create a job and start it right away.
    pub async fn submit(&self, owner: impl Into<String>, task: TaskDescriptor) -> Result<Job, JobError> {
        let mut job = self.create(owner, task).await?;
        self.start(&mut job).await?;
        Ok(job)
    }

    /// Refuse new work and wait for every started job to finish.
    pub async fn shutdown(&self) {
        self.pool.shutdown().await;
    }
}

/// Run the task body, turning errors and panics into a description.
async fn execute(registry: &TaskRegistry, task: TaskDescriptor) -> Result<Value, String> {
    let Some(handler) = registry.get(&task.task_type) else {
        return Err(format!("Unknown task type: {}", task.task_type));
    };

    let task_type = task.task_type;
    let args = task.args;

    match tokio::spawn(async move { handler.run(args).await }).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(format!("{:#}", e)),
        Err(e) if e.is_panic() => Err(format!("Task '{}' panicked", task_type)),
        Err(e) => Err(format!("Task '{}' aborted: {}", task_type, e)),
    }
}

/// Record the terminal state over a fresh read of the job.
async fn finish(store: &dyn JobStore, id: Uuid, outcome: Result<Value, String>) {
    let mut job = match store.load(&id).await {
        Ok(Some(job)) => job,
        Ok(None) => {
            warn!(job_id = %id, "Job record vanished before completion");
            return;
        }
        Err(e) => {
            error!(job_id = %id, "Failed to reload job for completion: {}", e);
            return;
        }
    };

    let recorded = match outcome {
        Ok(value) => job.complete(value),
        Err(description) => {
            warn!(job_id = %id, "Job failed: {}", description);
            job.fail(description)
        }
    };

    if let Err(e) = recorded {
        warn!(job_id = %id, "Not recording completion: {}", e);
        return;
    }

    match store.save(&job).await {
        Ok(()) => info!(job_id = %id, state = %job.state(), "Job finished"),
        Err(e) => error!(job_id = %id, "Failed to persist terminal state: {}", e),
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
