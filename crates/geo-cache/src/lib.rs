//! Geo Cache - plan fingerprints and artifact storage
//!
//! - [`CacheKey`]: `<namespace>:<digest>` derived from the order-independent
//!   fields of a plan
//! - [`CacheStore`]: bounded, TTL-expiring in-process store
//! - [`ResultCache`]: the seam the pipeline depends on
//!
//! # Example
//!
//! ```rust,ignore
//! use geo_cache::{CacheKey, CacheStore};
//! use std::time::Duration;
//!
//! let store = CacheStore::new(100, Duration::from_secs(3600));
//! let key = CacheKey::analysis(&plan);
//! store.set(key.clone(), artifact);
//! assert!(store.has(&key));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod key;
mod store;

pub use key::{CacheKey, KeyError, Namespace, DIGEST_LEN};
pub use store::{CacheConfig, CacheEntry, CacheStats, CacheStore, ResultCache};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
