//! # BirdSpot Config
//!
//! Configuration management for the BirdSpot jobs and cache services.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_CONFIG_PATH, ENV_FILE_CACHE_DIRECTORY, ENV_JOB_DIRECTORY};
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
