//! Job records and their state machine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::JobError;

/// Job lifecycle state.
///
/// `NotStarted → Running → Completed | Failed`. Every move is one-way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobState {
    /// Created, not yet submitted.
    #[default]
    NotStarted,
    /// Submitted to the worker pool.
    Running,
    /// Task returned a value.
    Completed,
    /// Task returned an error or panicked.
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::NotStarted => "not-started",
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        }
    }

    /// Completed or failed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }

    fn can_move_to(&self, next: JobState) -> bool {
        matches!(
            (self, next),
            (JobState::NotStarted, JobState::Running)
                | (JobState::Running, JobState::Completed)
                | (JobState::Running, JobState::Failed)
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a job runs: a registered task type plus JSON arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    /// Key into the [`TaskRegistry`](crate::TaskRegistry).
    #[serde(rename = "type")]
    pub task_type: String,
    /// Arguments handed to the handler.
    #[serde(default)]
    pub args: Value,
}

impl TaskDescriptor {
    pub fn new(task_type: impl Into<String>, args: Value) -> Self {
        Self {
            task_type: task_type.into(),
            args,
        }
    }

    /// Build a descriptor from any serializable argument struct.
    pub fn with_args<T: Serialize>(task_type: impl Into<String>, args: &T) -> Result<Self, JobError> {
        Ok(Self::new(task_type, serde_json::to_value(args)?))
    }

    /// Decode the arguments into a concrete type.
    pub fn args_as<T: DeserializeOwned>(&self) -> Result<T, JobError> {
        Ok(serde_json::from_value(self.args.clone())?)
    }
}

/// Result of a finished job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOutcome {
    /// Value returned by a completed task.
    Value(Value),
    /// Description of the error that failed the task.
    Error(String),
}

/// A durable record of one unit of deferred work.
///
/// `id`, `owner` and `task` never change after creation. `result` is set only
/// in a terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    id: Uuid,
    owner: String,
    state: JobState,
    task: TaskDescriptor,
    result: Option<JobOutcome>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a new, not-started job with a fresh id.
    pub fn new(owner: impl Into<String>, task: TaskDescriptor) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            state: JobState::NotStarted,
            task,
            result: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn task(&self) -> &TaskDescriptor {
        &self.task
    }

    pub fn result(&self) -> Option<&JobOutcome> {
        self.result.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// The value of a completed job.
    pub fn value(&self) -> Option<&Value> {
        match &self.result {
            Some(JobOutcome::Value(value)) => Some(value),
            _ => None,
        }
    }

    /// The error description of a failed job.
    pub fn error(&self) -> Option<&str> {
        match &self.result {
            Some(JobOutcome::Error(error)) => Some(error),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub(crate) fn mark_running(&mut self) -> Result<(), JobError> {
        self.transition(JobState::Running, None)
    }

    pub(crate) fn complete(&mut self, value: Value) -> Result<(), JobError> {
        self.transition(JobState::Completed, Some(JobOutcome::Value(value)))
    }

    pub(crate) fn fail(&mut self, error: impl Into<String>) -> Result<(), JobError> {
        self.transition(JobState::Failed, Some(JobOutcome::Error(error.into())))
    }

    fn transition(&mut self, next: JobState, result: Option<JobOutcome>) -> Result<(), JobError> {
        if !self.state.can_move_to(next) {
            return Err(JobError::InvalidTransition {
                id: self.id,
                from: self.state,
                to: next,
            });
        }

        self.state = next;
        self.result = result;
        self.updated_at = Utc::now();
        Ok(())
    }
}
