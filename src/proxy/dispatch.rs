//! The caching proxy and its dispatch path.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use super::CacheProxyBuilder;
use crate::cache::{CacheGateway, CacheStore, is_empty_value};
use crate::key::KeyGenerator;
use crate::policy::Policy;
use crate::repository::Repository;
use crate::telemetry;
use crate::{CacheError, Result};

/// Caching decorator around a [`Repository`].
///
/// Every call routed through [`invoke`](Self::invoke) is memoized unless the
/// method is excluded or caching is disabled; methods declared as tag
/// cleaners flush the proxy's tag group after they succeed.
///
/// Tag invalidation is coarse: it clears every entry under the tags,
/// including entries other proxies wrote to the same store with a shared tag.
///
/// There is no request coalescing. Concurrent misses on the same key each
/// call the repository.
pub struct CacheProxy<R> {
    pub(super) repository: R,
    pub(super) gateway: CacheGateway,
    pub(super) keys: KeyGenerator,
    pub(super) policy: Policy,
}

impl<R: Repository> CacheProxy<R> {
    /// Start building a proxy around `repository`.
    pub fn builder(repository: R) -> CacheProxyBuilder<R> {
        CacheProxyBuilder::new(repository)
    }

    /// Route one call through the cache.
    ///
    /// 1. A method the repository does not expose fails with
    ///    [`CacheError::MethodNotFound`] before any cache access.
    /// 2. Excluded methods and a disabled proxy skip the cache.
    /// 3. Otherwise the derived key is looked up; a hit skips the repository.
    /// 4. On a miss the repository is called and its result stored.
    /// 5. Tag-cleaning methods invalidate the tag group once a result is in
    ///    hand, whether it came from the cache or the repository.
    ///
    /// Repository errors are returned unchanged and nothing is cached for them.
    #[instrument(skip(self, args), fields(prefix = %self.policy.key_prefix()))]
    pub async fn invoke(&self, method: &str, args: &[Value]) -> Result<Value> {
        let trace = self.policy.debug_logging();
        if trace {
            debug!(method, ?args, "starting invoke");
        }

        if !self.repository.has_method(method) {
            if trace {
                debug!(method, "method missing from repository");
            }
            return Err(CacheError::MethodNotFound(method.to_string()));
        }

        // Snapshot mutable settings once per call.
        let enabled = self.policy.is_enabled();
        let ttl = self.policy.ttl();

        let key = if !enabled {
            self.record_bypass(method, "disabled");
            None
        } else if self.policy.is_excluded(method) {
            self.record_bypass(method, "excluded");
            None
        } else {
            if trace {
                debug!(method, "method cacheable");
            }
            Some(self.keys.derive(method, args))
        };

        let tags = self.policy.tags();

        let cached = match &key {
            Some(key) => self.lookup(method, key).await,
            None => None,
        };

        let result = match cached {
            Some(hit) => hit,
            None => {
                let result = self.repository.call(method, args).await?;
                if let Some(key) = &key {
                    if self.servable(&result) {
                        if trace {
                            debug!(key = %key, ?ttl, "storing result");
                        }
                        self.gateway.put(key, result.clone(), ttl, tags).await;
                    } else if trace {
                        debug!(key = %key, "empty result not cached");
                    }
                }
                result
            }
        };

        if self.policy.clears_tags(method) {
            if trace {
                debug!(method, "method clears tags");
            }
            self.clear_tags().await;
        }

        Ok(result)
    }

    /// Read `key` under this proxy's tags, counting the hit or miss.
    async fn lookup(&self, method: &str, key: &str) -> Option<Value> {
        let trace = self.policy.debug_logging();
        let tags = self.policy.tags();
        if trace {
            debug!(key, tags = %tags, "looking up cache");
        }
        match self.gateway.get(key, tags).await {
            Some(hit) if self.servable(&hit) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL,
                    "prefix" => self.policy.key_prefix().to_owned(),
                    "method" => method.to_owned(),
                )
                .increment(1);
                if trace {
                    debug!(key, "cache hit");
                }
                Some(hit)
            }
            _ => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL,
                    "prefix" => self.policy.key_prefix().to_owned(),
                    "method" => method.to_owned(),
                )
                .increment(1);
                if trace {
                    debug!(key, "cache miss, asking repository");
                }
                None
            }
        }
    }

    /// Invalidate this proxy's tag group now. No-op when untagged.
    ///
    /// Returns `false` if the store failed to invalidate.
    pub async fn clear_tags(&self) -> bool {
        let tags = self.policy.tags();
        if tags.is_empty() {
            return true;
        }
        metrics::counter!(telemetry::TAG_INVALIDATIONS_TOTAL,
            "prefix" => self.policy.key_prefix().to_owned(),
        )
        .increment(1);
        if self.policy.debug_logging() {
            debug!(tags = %tags, "clearing tag cache");
        }
        self.gateway.invalidate_tags(tags).await
    }

    /// The key `method` called with `args` is cached under.
    pub fn cache_key(&self, method: &str, args: &[Value]) -> String {
        self.keys.derive(method, args)
    }

    /// Set the TTL used for entries written from now on.
    pub fn set_ttl(&self, ttl: Duration) {
        self.policy.set_ttl(ttl);
    }

    pub fn ttl(&self) -> Duration {
        self.policy.ttl()
    }

    /// Turn caching on or off for subsequent calls.
    pub fn set_enabled(&self, enabled: bool) {
        self.policy.set_enabled(enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.policy.is_enabled()
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// The wrapped repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// The store behind this proxy.
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        self.gateway.store()
    }

    fn servable(&self, value: &Value) -> bool {
        self.policy.cache_empty_results() || !is_empty_value(value)
    }

    fn record_bypass(&self, method: &str, reason: &'static str) {
        metrics::counter!(telemetry::CACHE_BYPASS_TOTAL,
            "prefix" => self.policy.key_prefix().to_owned(),
            "method" => method.to_owned(),
            "reason" => reason,
        )
        .increment(1);
        if self.policy.debug_logging() {
            debug!(method, reason, "bypassing cache");
        }
    }
}

/// A proxy is itself a repository, so proxies can be stored behind
/// `Arc<dyn Repository>` or stacked.
#[async_trait]
impl<R: Repository> Repository for CacheProxy<R> {
    fn has_method(&self, method: &str) -> bool {
        self.repository.has_method(method)
    }

    async fn call(&self, method: &str, args: &[Value]) -> Result<Value> {
        self.invoke(method, args).await
    }
}
