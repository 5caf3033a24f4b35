//! Cache gateway and store backends.
//!
//! [`CacheStore`] is the seam to the external cache: anything that can get,
//! put and invalidate by tag. Two backends ship with the crate:
//!
//! - [`MemoryStore`]: moka-backed in-process store with per-entry TTL and
//!   namespace-versioned tags.
//! - [`NullStore`]: stores nothing; every read misses.
//!
//! [`CacheGateway`] sits between the proxy and the store and owns the
//! failure semantics: a store that errors on `get` is treated as a miss, and
//! errors on `put` or `invalidate` are logged and counted but never reach the
//! caller. Cache-layer trouble degrades to "always call through".
//!
//! # Tag invalidation blast radius
//!
//! Invalidating a tag clears every entry associated with it, including
//! entries written by other proxies (or any other client of the same store)
//! that share the tag. Design tag groups with that in mind.

mod memory;
mod null;

pub use memory::{MemoryStore, MemoryStoreConfig};
pub use null::NullStore;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::telemetry;
use crate::types::TagSet;
use crate::Result;

/// External cache store.
///
/// Implementations provide their own internal concurrency safety. An empty
/// `tags` set addresses the global (untagged) key space; a non-empty set
/// scopes the key to that tag group, so the same key under different tag
/// sets names different entries.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Short backend name used in logs and metric labels.
    fn name(&self) -> &'static str;

    /// Look up `key`. `Ok(None)` is a miss.
    async fn get(&self, key: &str, tags: &TagSet) -> Result<Option<Value>>;

    /// Store `value` under `key` for `ttl`, associated with `tags`.
    async fn put(&self, key: &str, value: Value, ttl: Duration, tags: &TagSet) -> Result<()>;

    /// Remove every entry associated with any of `tags`, whoever wrote it.
    async fn invalidate(&self, tags: &TagSet) -> Result<()>;

    /// Remove every entry.
    async fn flush(&self) -> Result<()>;
}

/// Failure-absorbing front for a [`CacheStore`].
pub struct CacheGateway {
    store: Arc<dyn CacheStore>,
    debug: bool,
}

impl CacheGateway {
    /// Wrap a store. `debug` controls whether recovered failures are logged.
    pub fn new(store: Arc<dyn CacheStore>, debug: bool) -> Self {
        Self { store, debug }
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Read `key`; a store failure is reported as a miss.
    pub async fn get(&self, key: &str, tags: &TagSet) -> Option<Value> {
        match self.store.get(key, tags).await {
            Ok(value) => value,
            Err(e) => {
                self.record_failure("get", key, &e);
                None
            }
        }
    }

    /// Write `key`. Returns whether the store accepted it.
    pub async fn put(&self, key: &str, value: Value, ttl: Duration, tags: &TagSet) -> bool {
        match self.store.put(key, value, ttl, tags).await {
            Ok(()) => true,
            Err(e) => {
                self.record_failure("put", key, &e);
                false
            }
        }
    }

    /// Invalidate the tag group. An empty set is a no-op.
    pub async fn invalidate_tags(&self, tags: &TagSet) -> bool {
        if tags.is_empty() {
            return true;
        }
        match self.store.invalidate(tags).await {
            Ok(()) => true,
            Err(e) => {
                self.record_failure("invalidate", &tags.to_string(), &e);
                false
            }
        }
    }

    fn record_failure(&self, operation: &'static str, target: &str, error: &crate::CacheError) {
        metrics::counter!(telemetry::STORE_ERRORS_TOTAL,
            "store" => self.store.name(),
            "operation" => operation,
        )
        .increment(1);
        if self.debug {
            warn!(
                store = self.store.name(),
                operation,
                target,
                error = %error,
                "cache store failure recovered"
            );
        }
    }
}

/// Whether a value counts as "empty" for the `cache_empty = false` mode.
pub(crate) fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
