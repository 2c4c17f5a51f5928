//! # BirdSpot Cache
//!
//! Provider-agnostic caching for BirdSpot data access and task bodies.
//!
//! ## Features
//!
//! - Pluggable storage through the [`CacheProvider`] trait
//! - Namespaced, versioned keys (`prefix:key:vN`)
//! - Explicit memoization of async operations with call-site key design
//! - Bundled in-memory and file-backed providers

pub mod cache;
pub mod error;
pub mod file;
pub mod key;
pub mod memoize;
pub mod provider;
pub mod value;

pub use cache::Cache;
pub use error::CacheError;
pub use file::FileCacheProvider;
pub use key::CacheKey;
pub use memoize::{json_key, Memoized};
pub use provider::{CacheProvider, MemoryCacheProvider};
pub use value::CacheValue;
