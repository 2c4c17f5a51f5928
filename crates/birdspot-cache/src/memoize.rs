//! Explicit memoization of async operations.

use std::future::Future;

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::cache::Cache;
use crate::error::CacheError;
use crate::value::CacheValue;

type KeyFn<A> = Box<dyn Fn(&A) -> Result<String, CacheError> + Send + Sync>;
type OperationFn<A, R, E> = Box<dyn Fn(A) -> BoxFuture<'static, Result<R, E>> + Send + Sync>;

/// Deterministic key for any serializable argument set.
///
/// Objects are rendered with sorted keys, so logically equal arguments give
/// the same string regardless of field or map insertion order.
pub fn json_key<T: Serialize + ?Sized>(args: &T) -> Result<String, CacheError> {
    Ok(serde_json::to_value(args)?.to_string())
}

/// An async operation wrapped with a cache.
///
/// Each call derives `operation_name:serialized_args` from its arguments.
/// On a hit the cached result is decoded and returned without running the
/// operation. On a miss the operation runs, its result is stored, and then
/// returned. Operation errors propagate and nothing is stored.
///
/// There is no single-flight coalescing: concurrent calls that both miss
/// both run the operation and both write, and the last write wins.
pub struct Memoized<A, R, E> {
    cache: Cache,
    operation_name: String,
    key_serializer: KeyFn<A>,
    operation: OperationFn<A, R, E>,
}

impl<A, R, E> Memoized<A, R, E>
where
    A: 'static,
    R: Serialize + DeserializeOwned + Send + 'static,
    E: From<CacheError> + 'static,
{
    /// Wrap `operation`, keying calls with `key_serializer`.
    ///
    /// The serializer decides which arguments vary the cache slot, e.g. an
    /// API credential can be left out.
    pub fn new<K, F, Fut>(
        cache: Cache,
        operation_name: impl Into<String>,
        key_serializer: K,
        operation: F,
    ) -> Self
    where
        K: Fn(&A) -> String + Send + Sync + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
    {
        Self::build(
            cache,
            operation_name.into(),
            Box::new(move |args: &A| Ok::<_, CacheError>(key_serializer(args))),
            operation,
        )
    }

    /// Wrap `operation`, keying calls with [`json_key`] over all arguments.
    pub fn with_json_key<F, Fut>(cache: Cache, operation_name: impl Into<String>, operation: F) -> Self
    where
        A: Serialize,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
    {
        Self::build(cache, operation_name.into(), Box::new(|args: &A| json_key(args)), operation)
    }

    fn build<F, Fut>(cache: Cache, operation_name: String, key_serializer: KeyFn<A>, operation: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
    {
        Self {
            cache,
            operation_name,
            key_serializer,
            operation: Box::new(move |args: A| -> BoxFuture<'static, Result<R, E>> {
                Box::pin(operation(args))
            }),
        }
    }

    pub fn operation_name(&self) -> &str {
        &self.operation_name
    }

    /// The raw cache key a call with `args` reads and writes.
    pub fn cache_key(&self, args: &A) -> Result<String, CacheError> {
        Ok(format!("{}:{}", self.operation_name, (self.key_serializer)(args)?))
    }

    /// Run the operation, or serve its result from the cache.
    pub async fn call(&self, args: A) -> Result<R, E> {
        let key = self.cache_key(&args)?;

        if let Some(cached) = self.cache.get(&key).await? {
            debug!(operation = %self.operation_name, "Cache hit for '{}'", key);
            return Ok(cached.decode()?);
        }

        debug!(operation = %self.operation_name, "Cache miss for '{}'", key);
        let result = (self.operation)(args).await?;
        self.cache.set(&key, CacheValue::from_serialize(&result)?).await?;

        Ok(result)
    }
}

#[cfg(test)]
#[path = "memoize_tests.rs"]
mod tests;
