//! Configuration schema definitions.

use birdspot_jobs::JobsConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub jobs: JobsSection,

    #[serde(default)]
    pub cache: CacheSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

/// Job store and worker pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsSection {
    /// Root directory of the file job store.
    #[serde(default = "default_jobs_directory")]
    pub directory: PathBuf,

    /// Worker pool settings (`max_workers`), handed to the job manager as is.
    #[serde(flatten)]
    pub pool: JobsConfig,
}

impl Default for JobsSection {
    fn default() -> Self {
        Self {
            directory: default_jobs_directory(),
            pool: JobsConfig::default(),
        }
    }
}

fn default_jobs_directory() -> PathBuf {
    home_relative(".birdspot/jobs")
}

/// Cache backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSection {
    /// `"file"` or `"memory"`.
    #[serde(default = "default_cache_backend")]
    pub backend: String,

    /// Root directory of the file cache backend.
    #[serde(default = "default_cache_directory")]
    pub directory: PathBuf,

    #[serde(default = "default_cache_prefix")]
    pub prefix: String,

    /// Bumping the version invalidates every entry under the prefix.
    #[serde(default = "default_cache_version")]
    pub version: u32,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            backend: default_cache_backend(),
            directory: default_cache_directory(),
            prefix: default_cache_prefix(),
            version: default_cache_version(),
        }
    }
}

fn default_cache_backend() -> String {
    "file".to_string()
}

fn default_cache_directory() -> PathBuf {
    home_relative(".birdspot/cache")
}

fn default_cache_prefix() -> String {
    "birdspot".to_string()
}

fn default_cache_version() -> u32 {
    1
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Default filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Write daily-rotated log files here as well as to the console.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn home_relative(path: &str) -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(path))
        .unwrap_or_else(|| PathBuf::from(path))
}
