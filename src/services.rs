//! Builds the jobs and cache services from configuration.

use std::sync::Arc;

use birdspot_cache::{Cache, CacheError, CacheKey, CacheProvider, FileCacheProvider, MemoryCacheProvider};
use birdspot_config::{CacheSection, Config};
use birdspot_jobs::{FileJobStore, JobError, JobManager, TaskRegistry};
use tracing::debug;

/// A job manager over the configured file job store.
pub(crate) async fn job_manager(config: &Config, registry: TaskRegistry) -> Result<JobManager, JobError> {
    let store = FileJobStore::new(&config.jobs.directory).await?;
    debug!("Job store at {}", config.jobs.directory.display());

    Ok(JobManager::new(&config.jobs.pool, Arc::new(store), Arc::new(registry)))
}

/// A cache over the configured backend and namespace.
pub(crate) async fn cache(section: &CacheSection) -> Result<Cache, CacheError> {
    let provider: Arc<dyn CacheProvider> = match section.backend.as_str() {
        "file" => {
            debug!("File cache at {}", section.directory.display());
            Arc::new(FileCacheProvider::new(&section.directory).await?)
        }
        "memory" => Arc::new(MemoryCacheProvider::new()),
        other => {
            return Err(CacheError::Backend(format!("Unknown cache backend '{}'", other)));
        }
    };

    Ok(Cache::new(CacheKey::new(section.prefix.clone(), section.version), provider))
}
