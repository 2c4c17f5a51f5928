//! Named task handlers.
//!
//! Jobs never carry executable code. They name a task type, and the handler
//! registered under that name runs with the job's JSON arguments.

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::JobError;

/// Handler for one task type.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    /// Run the task. An `Err` fails the job with the error's description.
    async fn run(&self, args: Value) -> anyhow::Result<Value>;
}

/// Adapts an async closure into a [`TaskHandler`].
pub struct FnTaskHandler<F> {
    f: F,
}

impl<F> FnTaskHandler<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> TaskHandler for FnTaskHandler<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send,
{
    async fn run(&self, args: Value) -> anyhow::Result<Value> {
        (self.f)(args).await
    }
}

/// Registry mapping task types to handlers.
pub struct TaskRegistry {
    handlers: DashMap<String, Arc<dyn TaskHandler>>,
}

impl TaskRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }

    /// Register a handler.
    ///
    /// Returns an error if the task type is already taken.
    pub fn register(
        &self,
        task_type: impl Into<String>,
        handler: Arc<dyn TaskHandler>,
    ) -> Result<(), JobError> {
        let task_type = task_type.into();

        if self.handlers.contains_key(&task_type) {
            return Err(JobError::AlreadyRegistered(task_type));
        }

        self.handlers.insert(task_type, handler);
        Ok(())
    }

    /// Register an async closure over raw JSON arguments.
    pub fn register_fn<F, Fut>(&self, task_type: impl Into<String>, f: F) -> Result<(), JobError>
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.register(task_type, Arc::new(FnTaskHandler::new(f)))
    }

    /// Register an async closure over typed arguments and result.
    ///
    /// Arguments that do not decode into `A` fail the job.
    pub fn register_typed<A, R, F, Fut>(&self, task_type: impl Into<String>, f: F) -> Result<(), JobError>
    where
        A: DeserializeOwned + Send + 'static,
        R: Serialize + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
    {
        self.register_fn(task_type, move |args: Value| {
            let pending = serde_json::from_value::<A>(args).map(&f);
            async move {
                let output = pending.context("Invalid task arguments")?.await?;
                Ok::<Value, anyhow::Error>(serde_json::to_value(output)?)
            }
        })
    }

    /// Get the handler for a task type.
    pub fn get(&self, task_type: &str) -> Option<Arc<dyn TaskHandler>> {
        self.handlers.get(task_type).map(|handler| handler.clone())
    }

    pub fn contains(&self, task_type: &str) -> bool {
        self.handlers.contains_key(task_type)
    }

    /// Registered task types, sorted.
    pub fn task_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.handlers.iter().map(|entry| entry.key().clone()).collect();
        types.sort();
        types
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct SumArgs {
        a: i64,
        b: i64,
    }

    struct EchoHandler;

    #[async_trait]
    impl TaskHandler for EchoHandler {
        async fn run(&self, args: Value) -> anyhow::Result<Value> {
            Ok(args)
        }
    }

    #[test]
    fn test_registry_creation() {
        let registry = TaskRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("sum").is_none());
    }

    #[tokio::test]
    async fn test_register_handler() {
        let registry = TaskRegistry::new();
        registry.register("echo", Arc::new(EchoHandler)).unwrap();

        assert!(registry.contains("echo"));
        let handler = registry.get("echo").unwrap();
        assert_eq!(handler.run(json!({"x": 1})).await.unwrap(), json!({"x": 1}));
    }

    #[test]
    fn test_duplicate_registration() {
        let registry = TaskRegistry::new();
        registry.register("echo", Arc::new(EchoHandler)).unwrap();

        let result = registry.register("echo", Arc::new(EchoHandler));
        assert!(matches!(result, Err(JobError::AlreadyRegistered(t)) if t == "echo"));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_register_typed() {
        let registry = TaskRegistry::new();
        registry
            .register_typed("sum", |args: SumArgs| async move { Ok::<_, anyhow::Error>(args.a + args.b) })
            .unwrap();

        let handler = registry.get("sum").unwrap();
        assert_eq!(handler.run(json!({"a": 2, "b": 3})).await.unwrap(), json!(5));
    }

    #[tokio::test]
    async fn test_register_typed_rejects_bad_arguments() {
        let registry = TaskRegistry::new();
        registry
            .register_typed("sum", |args: SumArgs| async move { Ok::<_, anyhow::Error>(args.a + args.b) })
            .unwrap();

        let err = registry.get("sum").unwrap().run(json!({"a": "two"})).await.unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid task arguments"));
    }

    #[test]
    fn test_task_types_sorted() {
        let registry = TaskRegistry::new();
        registry.register("score_region", Arc::new(EchoHandler)).unwrap();
        registry.register("fetch_hotspots", Arc::new(EchoHandler)).unwrap();

        assert_eq!(registry.task_types(), vec!["fetch_hotspots", "score_region"]);
    }
}
