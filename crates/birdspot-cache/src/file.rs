//! File-backed cache provider.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::debug;

use crate::error::CacheError;
use crate::provider::CacheProvider;
use crate::value::CacheValue;

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// File system based cache provider.
///
/// Each key is one file named after the SHA-256 of the key, so arbitrary key
/// text (colons, slashes, JSON) is safe on disk:
/// ```text
/// {cache_dir}/
/// ├── {sha256(key)}.json   # CacheValue::Json
/// └── {sha256(key)}.bin    # CacheValue::Bytes
/// ```
/// A key holds at most one of the two files.
pub struct FileCacheProvider {
    cache_dir: PathBuf,
}

impl FileCacheProvider {
    /// Create a provider rooted at `cache_dir`, creating the directory.
    pub async fn new(cache_dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let cache_dir = cache_dir.into();
        fs::create_dir_all(&cache_dir).await?;

        debug!("FileCacheProvider initialized at {:?}", cache_dir);

        Ok(Self { cache_dir })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn file_stem(key: &str) -> String {
        hex::encode(Sha256::digest(key.as_bytes()))
    }

    fn json_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", Self::file_stem(key)))
    }

    fn bin_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.bin", Self::file_stem(key)))
    }

    async fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>, CacheError> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove_if_exists(path: &Path) -> Result<(), CacheError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write through a uniquely named temporary file so readers never see a
    /// partial entry and concurrent writers of one key do not collide.
    async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), CacheError> {
        let mut tmp = OsString::from(path.as_os_str());
        tmp.push(format!(".{}.tmp", TMP_COUNTER.fetch_add(1, Ordering::Relaxed)));
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, contents).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl CacheProvider for FileCacheProvider {
    async fn get(&self, key: &str) -> Result<Option<CacheValue>, CacheError> {
        if let Some(raw) = Self::read_if_exists(&self.json_path(key)).await? {
            let json = serde_json::from_slice(&raw)
                .map_err(|e| CacheError::Backend(format!("Corrupt cache entry '{}': {}", key, e)))?;
            return Ok(Some(CacheValue::Json(json)));
        }

        Ok(Self::read_if_exists(&self.bin_path(key))
            .await?
            .map(CacheValue::Bytes))
    }

    async fn set(&self, key: &str, value: CacheValue) -> Result<(), CacheError> {
        match value {
            CacheValue::Json(json) => {
                let content = serde_json::to_vec(&json)?;
                Self::write_atomic(&self.json_path(key), &content).await?;
                Self::remove_if_exists(&self.bin_path(key)).await?;
            }
            CacheValue::Bytes(bytes) => {
                Self::write_atomic(&self.bin_path(key), &bytes).await?;
                Self::remove_if_exists(&self.json_path(key)).await?;
            }
        }

        debug!("Cached key '{}'", key);
        Ok(())
    }
}
