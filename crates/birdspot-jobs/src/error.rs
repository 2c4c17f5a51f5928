//! Job errors.

use thiserror::Error;
use uuid::Uuid;

use crate::job::JobState;

/// Job error types.
///
/// Task failures are not errors here: they are recorded on the job as a
/// `failed` state.
#[derive(Debug, Error)]
pub enum JobError {
    /// Job not found.
    #[error("Job not found: {0}")]
    NotFound(Uuid),

    /// Illegal state machine move.
    #[error("Job {id} cannot move from {from} to {to}")]
    InvalidTransition { id: Uuid, from: JobState, to: JobState },

    /// Job store failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Task arguments or job records could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A handler is already registered for this task type.
    #[error("Task type already registered: {0}")]
    AlreadyRegistered(String),

    /// Worker pool error.
    #[error("Worker error: {0}")]
    WorkerError(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for JobError {
    fn from(err: serde_json::Error) -> Self {
        JobError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_display() {
        let id = Uuid::new_v4();
        let err = JobError::InvalidTransition {
            id,
            from: JobState::Completed,
            to: JobState::Running,
        };
        let display = err.to_string();
        assert!(display.contains(&id.to_string()));
        assert!(display.contains("completed"));
        assert!(display.contains("running"));
    }

    #[test]
    fn test_not_found_display() {
        let id = Uuid::new_v4();
        assert!(JobError::NotFound(id).to_string().contains(&id.to_string()));
    }
}
