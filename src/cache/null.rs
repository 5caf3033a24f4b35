//! Store that caches nothing.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::CacheStore;
use crate::Result;
use crate::types::TagSet;

/// No-op store: every read misses, every write is discarded.
///
/// Useful for wiring a proxy in environments where caching should be
/// structurally absent rather than switched off through settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

#[async_trait]
impl CacheStore for NullStore {
    fn name(&self) -> &'static str {
        "null"
    }

    async fn get(&self, _key: &str, _tags: &TagSet) -> Result<Option<Value>> {
        Ok(None)
    }

    async fn put(&self, _key: &str, _value: Value, _ttl: Duration, _tags: &TagSet) -> Result<()> {
        Ok(())
    }

    async fn invalidate(&self, _tags: &TagSet) -> Result<()> {
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}
