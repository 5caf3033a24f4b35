//! In-process cache store backed by moka.
//!
//! # Tag namespaces
//!
//! Each tag carries a generation number. A tagged entry is stored under a
//! key that embeds the current generation of every tag in its set
//! (`"photos"@3,"users"@0|{key}`); untagged entries live under `|{key}`.
//! Tag names are JSON-quoted, so a name containing `@`, `,` or `|` cannot
//! impersonate another tag set.
//! Invalidating a tag bumps its generation, so every entry written under the
//! old namespace becomes unreachable at once, no matter which proxy wrote
//! it. Orphaned entries are not removed eagerly; they age out through their
//! TTL or the LRU capacity bound.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use serde_json::Value;

use super::CacheStore;
use crate::Result;
use crate::types::TagSet;

/// Configuration for [`MemoryStore`].
///
/// ```rust
/// # use repocache::MemoryStoreConfig;
/// # use std::time::Duration;
/// let config = MemoryStoreConfig::new()
///     .max_entries(5_000)
///     .max_ttl(Duration::from_secs(3600));
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStoreConfig {
    /// Maximum number of cached entries. Default: 10,000.
    pub max_entries: u64,
    /// Upper bound applied to every entry's TTL. Default: none.
    pub max_ttl: Option<Duration>,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            max_ttl: None,
        }
    }
}

impl MemoryStoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Cap every entry's TTL.
    pub fn max_ttl(mut self, ttl: Duration) -> Self {
        self.max_ttl = Some(ttl);
        self
    }
}

#[derive(Clone, Debug)]
struct StoredEntry {
    value: Value,
    ttl: Duration,
}

struct EntryExpiry;

impl Expiry<String, StoredEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Thread-safe in-memory store with per-entry TTL and tag invalidation.
pub struct MemoryStore {
    entries: Cache<String, StoredEntry>,
    generations: Mutex<HashMap<String, u64>>,
    max_ttl: Option<Duration>,
}

impl MemoryStore {
    /// Create a store with the default configuration.
    pub fn new() -> Self {
        Self::with_config(&MemoryStoreConfig::default())
    }

    pub fn with_config(config: &MemoryStoreConfig) -> Self {
        let entries = Cache::builder()
            .max_capacity(config.max_entries)
            .expire_after(EntryExpiry)
            .build();
        Self {
            entries,
            generations: Mutex::new(HashMap::new()),
            max_ttl: config.max_ttl,
        }
    }

    /// Approximate number of live entries, orphaned tag namespaces included.
    pub async fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }

    fn scoped_key(&self, key: &str, tags: &TagSet) -> String {
        if tags.is_empty() {
            return format!("|{key}");
        }
        let generations = self
            .generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let namespace = tags
            .iter()
            .map(|tag| {
                let generation = generations.get(tag).copied().unwrap_or(0);
                format!("{}@{generation}", Value::from(tag))
            })
            .collect::<Vec<_>>()
            .join(",");
        format!("{namespace}|{key}")
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str, tags: &TagSet) -> Result<Option<Value>> {
        let scoped = self.scoped_key(key, tags);
        Ok(self.entries.get(&scoped).await.map(|entry| entry.value))
    }

    async fn put(&self, key: &str, value: Value, ttl: Duration, tags: &TagSet) -> Result<()> {
        let ttl = match self.max_ttl {
            Some(max) => ttl.min(max),
            None => ttl,
        };
        let scoped = self.scoped_key(key, tags);
        self.entries.insert(scoped, StoredEntry { value, ttl }).await;
        Ok(())
    }

    async fn invalidate(&self, tags: &TagSet) -> Result<()> {
        let mut generations = self
            .generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for tag in tags {
            *generations.entry(tag.clone()).or_insert(0) += 1;
        }
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        self.entries.invalidate_all();
        Ok(())
    }
}
