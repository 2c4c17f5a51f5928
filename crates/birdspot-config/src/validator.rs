//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Cache backends the service knows how to build.
pub const CACHE_BACKENDS: [&str; 2] = ["file", "memory"];

/// Worker counts above this are accepted with a warning.
const MAX_REASONABLE_WORKERS: u32 = 64;

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration, collecting every error and warning.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_jobs(config, &mut result);
        Self::validate_cache(config, &mut result);
        Self::validate_logging(config, &mut result);

        Ok(result)
    }

    /// Like [`validate`](Self::validate), but the first error becomes
    /// [`ConfigError::InvalidValue`].
    pub fn ensure_valid(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = Self::validate(config)?;
        if result.errors.is_empty() {
            return Ok(result);
        }
        let first = result.errors.remove(0);
        Err(ConfigError::InvalidValue {
            field: first.path,
            message: first.message,
        })
    }

    fn validate_jobs(config: &Config, result: &mut ValidationResult) {
        if config.jobs.pool.max_workers == 0 {
            result.add_error(ValidationError::new(
                "jobs.max_workers",
                "max_workers must be greater than 0",
            ));
        }

        if config.jobs.pool.max_workers > MAX_REASONABLE_WORKERS {
            result.add_warning(ValidationWarning::new(
                "jobs.max_workers",
                format!(
                    "max_workers is very high (>{}), jobs may exhaust upstream rate limits",
                    MAX_REASONABLE_WORKERS
                ),
            ));
        }

        if config.jobs.directory.as_os_str().is_empty() {
            result.add_error(ValidationError::new(
                "jobs.directory",
                "Job directory cannot be empty",
            ));
        }
    }

    fn validate_cache(config: &Config, result: &mut ValidationResult) {
        if !CACHE_BACKENDS.contains(&config.cache.backend.as_str()) {
            result.add_error(ValidationError::new(
                "cache.backend",
                format!(
                    "Unknown cache backend '{}', valid values: {:?}",
                    config.cache.backend, CACHE_BACKENDS
                ),
            ));
        }

        if config.cache.prefix.is_empty() {
            result.add_error(ValidationError::new("cache.prefix", "Cache prefix cannot be empty"));
        }

        if config.cache.version == 0 {
            result.add_error(ValidationError::new(
                "cache.version",
                "version must be greater than 0",
            ));
        }

        if config.cache.backend == "file" && config.cache.directory.as_os_str().is_empty() {
            result.add_error(ValidationError::new(
                "cache.directory",
                "File cache backend needs a directory",
            ));
        }

        if config.cache.backend == "memory" {
            result.add_warning(ValidationWarning::new(
                "cache.backend",
                "Memory cache is not shared between processes and is lost on restart",
            ));
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        if config.logging.level.trim().is_empty() {
            result.add_warning(ValidationWarning::new(
                "logging.level",
                "Log level is empty, falling back to info",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
