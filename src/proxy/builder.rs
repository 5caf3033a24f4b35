//! Builder for configuring proxy instances

use std::sync::Arc;

use super::CacheProxy;
use crate::cache::{CacheGateway, CacheStore, MemoryStore};
use crate::config::CacheSettings;
use crate::key::KeyGenerator;
use crate::policy::{CacheProfile, Policy};
use crate::repository::Repository;
use crate::{CacheError, Result};

/// Builder for [`CacheProxy`].
///
/// ```rust
/// # use std::sync::Arc;
/// # use repocache::{CacheProfile, CacheProxy, CacheSettings, MemoryStore, MethodTable};
/// # use serde_json::json;
/// let repo = MethodTable::new(()).method("all", |_, _| Ok(json!([1, 2, 3])));
/// let proxy = CacheProxy::builder(repo)
///     .store(Arc::new(MemoryStore::new()))
///     .settings(CacheSettings::new().ttl_minutes(5))
///     .profile(CacheProfile::new("numbers").tags(["numbers"]))
///     .build()
///     .unwrap();
/// # let _ = proxy;
/// ```
pub struct CacheProxyBuilder<R> {
    repository: R,
    store: Option<Arc<dyn CacheStore>>,
    settings: CacheSettings,
    profile: CacheProfile,
}

impl<R: Repository> CacheProxyBuilder<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            store: None,
            settings: CacheSettings::default(),
            profile: CacheProfile::default(),
        }
    }

    /// Use `store` for entries. Share one store between proxies for tag
    /// invalidation to reach across them. Default: a private [`MemoryStore`].
    pub fn store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Global settings (TTL, enabled, tags, debug). Default: [`CacheSettings::default`].
    pub fn settings(mut self, settings: CacheSettings) -> Self {
        self.settings = settings;
        self
    }

    /// The repository's cache declaration. A non-empty prefix is required.
    pub fn profile(mut self, profile: CacheProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Build the proxy.
    ///
    /// Fails with [`CacheError::Configuration`] if the profile has no prefix.
    pub fn build(self) -> Result<CacheProxy<R>> {
        if self.profile.prefix.is_empty() {
            return Err(CacheError::Configuration(
                "cache profile needs a non-empty key prefix".to_string(),
            ));
        }

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()) as Arc<dyn CacheStore>);
        let policy = Policy::load(&self.settings, &self.profile);

        Ok(CacheProxy {
            repository: self.repository,
            gateway: CacheGateway::new(store, policy.debug_logging()),
            keys: KeyGenerator::new(policy.key_prefix()),
            policy,
        })
    }
}
