//! Versioned cache key namespaces.

use std::fmt;

/// A namespace plus version for derived cache keys.
///
/// Bumping `version` orphans every entry written under the old version. Old
/// entries are not deleted, they just become unreachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    prefix: String,
    version: u32,
}

impl CacheKey {
    pub fn new(prefix: impl Into<String>, version: u32) -> Self {
        Self {
            prefix: prefix.into(),
            version,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Derive the provider key: `prefix:raw:vVersion`.
    pub fn derive(&self, raw: &str) -> String {
        format!("{}:{}:v{}", self.prefix, raw, self.version)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:v{}", self.prefix, self.version)
    }
}
