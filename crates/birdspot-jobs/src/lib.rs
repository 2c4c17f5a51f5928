//! # BirdSpot Jobs
//!
//! Deferred work for the BirdSpot service.
//!
//! ## Features
//!
//! - Durable job records (`not-started → running → completed | failed`)
//! - Named task registry instead of serialized closures
//! - Bounded worker pool with graceful shutdown
//! - File-backed (one JSON document per job) and in-memory stores

pub mod config;
pub mod error;
pub mod job;
pub mod manager;
pub mod registry;
pub mod store;
pub mod worker;

pub use config::JobsConfig;
pub use error::JobError;
pub use job::{Job, JobOutcome, JobState, TaskDescriptor};
pub use manager::JobManager;
pub use registry::{FnTaskHandler, TaskHandler, TaskRegistry};
pub use store::{FileJobStore, JobStore, MemoryJobStore};
pub use worker::WorkerPool;
