//! Per-proxy caching policy.
//!
//! A [`Policy`] is assembled once, when a proxy is built, from the global
//! [`CacheSettings`] and the repository's own [`CacheProfile`]. Afterwards
//! only the TTL and the enabled flag can change, through
//! [`Policy::set_ttl`] and [`Policy::set_enabled`]. Both are stored
//! atomically, so they may be flipped while other tasks are dispatching;
//! a call in flight keeps the values it read when it started.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crate::config::CacheSettings;
use crate::types::TagSet;

/// Names of the proxy's own management operations.
///
/// Always part of the excluded set so the proxy never caches its own API,
/// whatever a profile declares.
pub const MANAGEMENT_METHODS: &[&str] = &[
    "repository",
    "invoke",
    "set_ttl",
    "set_enabled",
    "ttl",
    "is_enabled",
    "policy",
    "cache_key",
    "clear_tags",
];

/// Per-repository cache declaration.
///
/// Describes one repository type: the key prefix shared by all its proxies,
/// the methods that must never be cached (inserts, setters, anything with
/// side effects), the methods that flush the tag group after they run, and
/// the tags scoping its entries.
///
/// ```rust
/// # use repocache::CacheProfile;
/// let profile = CacheProfile::new("users")
///     .exclude(["insert", "delete"])
///     .clear_tags_on(["insert", "delete"])
///     .tags(["users"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheProfile {
    pub prefix: String,
    pub excludes: Vec<String>,
    pub tag_cleaners: Vec<String>,
    pub tags: TagSet,
}

impl CacheProfile {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    /// Add methods that always bypass the cache.
    pub fn exclude<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes.extend(methods.into_iter().map(Into::into));
        self
    }

    /// Add methods that invalidate the tag group after a successful call.
    pub fn clear_tags_on<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tag_cleaners.extend(methods.into_iter().map(Into::into));
        self
    }

    /// Add tags scoping this repository's entries.
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for tag in tags {
            self.tags.insert(tag);
        }
        self
    }
}

/// Resolved caching policy for one proxy instance.
#[derive(Debug)]
pub struct Policy {
    ttl_nanos: AtomicU64,
    enabled: AtomicBool,
    excluded_methods: BTreeSet<String>,
    tag_clearing_methods: BTreeSet<String>,
    tags: TagSet,
    key_prefix: String,
    debug_logging: bool,
    cache_empty_results: bool,
}

impl Policy {
    /// Assemble the policy from settings and a repository profile.
    ///
    /// When `settings.use_tags` is false, tags and tag cleaners are dropped
    /// regardless of what the profile declares.
    pub fn load(settings: &CacheSettings, profile: &CacheProfile) -> Self {
        let excluded_methods = MANAGEMENT_METHODS
            .iter()
            .map(|m| m.to_string())
            .chain(profile.excludes.iter().cloned())
            .collect();

        let (tags, tag_clearing_methods) = if settings.use_tags {
            (
                profile.tags.clone(),
                profile.tag_cleaners.iter().cloned().collect(),
            )
        } else {
            (TagSet::new(), BTreeSet::new())
        };

        Self {
            ttl_nanos: AtomicU64::new(duration_to_nanos(settings.ttl_duration())),
            enabled: AtomicBool::new(settings.enabled),
            excluded_methods,
            tag_clearing_methods,
            tags,
            key_prefix: profile.prefix.clone(),
            debug_logging: settings.debug,
            cache_empty_results: settings.cache_empty,
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_nanos(self.ttl_nanos.load(Ordering::Acquire))
    }

    /// Set the TTL for entries written from now on. Durations beyond
    /// `u64::MAX` nanoseconds (about 584 years) saturate.
    pub fn set_ttl(&self, ttl: Duration) {
        self.ttl_nanos
            .store(duration_to_nanos(ttl), Ordering::Release);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    pub fn is_excluded(&self, method: &str) -> bool {
        self.excluded_methods.contains(method)
    }

    pub fn clears_tags(&self, method: &str) -> bool {
        self.tag_clearing_methods.contains(method)
    }

    pub fn excluded_methods(&self) -> &BTreeSet<String> {
        &self.excluded_methods
    }

    pub fn tag_clearing_methods(&self) -> &BTreeSet<String> {
        &self.tag_clearing_methods
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    pub fn debug_logging(&self) -> bool {
        self.debug_logging
    }

    pub fn cache_empty_results(&self) -> bool {
        self.cache_empty_results
    }
}

fn duration_to_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}
