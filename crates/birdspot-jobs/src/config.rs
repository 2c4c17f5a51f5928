//! Job execution configuration.

use serde::{Deserialize, Serialize};

/// Worker pool settings for a [`JobManager`](crate::JobManager).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Maximum number of job bodies running at once.
    #[serde(default = "default_max_workers")]
    pub max_workers: u32,
}

fn default_max_workers() -> u32 {
    4
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
        }
    }
}
