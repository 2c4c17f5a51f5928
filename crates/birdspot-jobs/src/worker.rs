//! Worker pool for job execution.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::JobsConfig;
use crate::error::JobError;

/// Bounded pool for concurrent job execution.
///
/// A submitted job waits for one of `max_workers` slots and holds it until
/// its body and completion write are done. Submission itself never waits.
pub struct WorkerPool {
    max_workers: usize,
    semaphore: Arc<Semaphore>,
    tracker: TaskTracker,
    total_processed: Arc<AtomicU64>,
}

impl WorkerPool {
    /// Create a new worker pool.
    pub fn new(config: &JobsConfig) -> Self {
        let max_workers = config.max_workers.max(1) as usize;
        Self {
            max_workers,
            semaphore: Arc::new(Semaphore::new(max_workers)),
            tracker: TaskTracker::new(),
            total_processed: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Check if the pool still accepts work.
    pub fn is_running(&self) -> bool {
        !self.tracker.is_closed()
    }

    /// Get number of idle worker slots.
    pub fn available_workers(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Jobs submitted and not yet finished, including those waiting for a slot.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Get total processed job count.
    pub fn total_processed(&self) -> u64 {
        self.total_processed.load(Ordering::SeqCst)
    }

    /// Submit work for a job.
    pub fn submit<F>(&self, job_id: Uuid, work: F) -> Result<(), JobError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if !self.is_running() {
            return Err(JobError::WorkerError("Pool is shut down".to_string()));
        }

        let semaphore = self.semaphore.clone();
        let total_processed = self.total_processed.clone();

        self.tracker.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!("No worker slot for job {}: {}", job_id, e);
                    return;
                }
            };

            debug!("Worker slot acquired for job {}", job_id);
            work.await;
            total_processed.fetch_add(1, Ordering::SeqCst);
        });

        Ok(())
    }

    /// Stop accepting work and wait for everything in flight.
    pub async fn shutdown(&self) {
        self.tracker.close();
        info!("Worker pool draining {} jobs", self.tracker.len());
        self.tracker.wait().await;
        info!("Worker pool stopped");
    }
}
