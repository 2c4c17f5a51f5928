//! Namespaced cache over a provider.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CacheError;
use crate::key::CacheKey;
use crate::memoize::Memoized;
use crate::provider::CacheProvider;
use crate::value::CacheValue;

/// A [`CacheProvider`] seen through one versioned namespace.
///
/// Cheap to clone; clones share the provider.
#[derive(Clone)]
pub struct Cache {
    key: CacheKey,
    provider: Arc<dyn CacheProvider>,
}

impl Cache {
    pub fn new(key: CacheKey, provider: Arc<dyn CacheProvider>) -> Self {
        Self { key, provider }
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Read `raw_key` under this namespace.
    ///
    /// A stored JSON `null` is reported as absent, exactly like a miss, so a
    /// `null` result can never be served from the cache.
    pub async fn get(&self, raw_key: &str) -> Result<Option<CacheValue>, CacheError> {
        let key = self.key.derive(raw_key);
        match self.provider.get(&key).await? {
            Some(value) if value.is_null() => Ok(None),
            other => Ok(other),
        }
    }

    /// Write `raw_key` under this namespace.
    pub async fn set(&self, raw_key: &str, value: impl Into<CacheValue>) -> Result<(), CacheError> {
        let key = self.key.derive(raw_key);
        self.provider.set(&key, value.into()).await
    }

    /// Wrap `operation` so results are served from this cache.
    ///
    /// See [`Memoized`] for the hit/miss semantics.
    pub fn memoize<A, R, E, K, F, Fut>(
        &self,
        operation_name: impl Into<String>,
        key_serializer: K,
        operation: F,
    ) -> Memoized<A, R, E>
    where
        A: 'static,
        R: Serialize + DeserializeOwned + Send + 'static,
        E: From<CacheError> + 'static,
        K: Fn(&A) -> String + Send + Sync + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
    {
        Memoized::new(self.clone(), operation_name, key_serializer, operation)
    }
}
