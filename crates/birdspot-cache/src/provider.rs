//! Cache provider contract and in-memory provider.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CacheError;
use crate::value::CacheValue;

/// Storage backend for a [`Cache`](crate::Cache).
///
/// Implementations map string keys to [`CacheValue`]s. A missing key is
/// `Ok(None)`; `Err` is reserved for real failures. Backends that cannot
/// store structured values natively serialize them internally. No ordering
/// or transactional guarantees are required.
#[async_trait]
pub trait CacheProvider: Send + Sync {
    /// Read a key.
    async fn get(&self, key: &str) -> Result<Option<CacheValue>, CacheError>;

    /// Write a key, overwriting any existing value.
    async fn set(&self, key: &str, value: CacheValue) -> Result<(), CacheError>;
}

/// Process-local provider, mainly for tests and single-process deployments.
pub struct MemoryCacheProvider {
    entries: RwLock<HashMap<String, CacheValue>>,
}

impl MemoryCacheProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored keys across all namespaces and versions.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for MemoryCacheProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> Result<Option<CacheValue>, CacheError> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: CacheValue) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_provider_miss() {
        let provider = MemoryCacheProvider::new();
        assert!(provider.get("absent").await.unwrap().is_none());
        assert!(provider.is_empty().await);
    }

    #[tokio::test]
    async fn test_memory_provider_set_get() {
        let provider = MemoryCacheProvider::new();
        provider
            .set("k", CacheValue::from(json!({"a": [1, 2]})))
            .await
            .unwrap();

        let value = provider.get("k").await.unwrap().unwrap();
        assert_eq!(value.as_json(), Some(&json!({"a": [1, 2]})));
        assert_eq!(provider.len().await, 1);
    }

    #[tokio::test]
    async fn test_memory_provider_overwrite() {
        let provider = MemoryCacheProvider::new();
        provider.set("k", CacheValue::from(1i64)).await.unwrap();
        provider.set("k", CacheValue::from(vec![9u8])).await.unwrap();

        let value = provider.get("k").await.unwrap().unwrap();
        assert_eq!(value.as_bytes(), Some(&[9u8][..]));
        assert_eq!(provider.len().await, 1);
    }
}
