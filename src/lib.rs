//! repocache - transparent caching proxy for repositories
//!
//! Wrap any [`Repository`] in a [`CacheProxy`] and every read-style call is
//! memoized in a [`CacheStore`], keyed by method name and arguments. Methods
//! declared as excluded always hit the repository; methods declared as tag
//! cleaners flush the proxy's tag group after they run.
//!
//! # Example
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//!
//! use repocache::{CacheProfile, CacheProxy, CacheSettings, MemoryStore, MethodTable};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> repocache::Result<()> {
//!     let repo = MethodTable::new(Mutex::new(vec![1, 2, 3]))
//!         .method("all", |items, _| Ok(json!(*items.lock().unwrap())))
//!         .method("insert", |items, _| {
//!             let mut items = items.lock().unwrap();
//!             let next = items.last().copied().unwrap_or(0) + 1;
//!             items.push(next);
//!             Ok(json!(true))
//!         });
//!
//!     let proxy = CacheProxy::builder(repo)
//!         .store(Arc::new(MemoryStore::new()))
//!         .settings(CacheSettings::new().ttl_minutes(5))
//!         .profile(
//!             CacheProfile::new("numbers")
//!                 .exclude(["insert"])
//!                 .clear_tags_on(["insert"])
//!                 .tags(["numbers"]),
//!         )
//!         .build()?;
//!
//!     assert_eq!(proxy.invoke("all", &[]).await?, json!([1, 2, 3]));
//!     proxy.invoke("insert", &[]).await?;
//!     assert_eq!(proxy.invoke("all", &[]).await?, json!([1, 2, 3, 4]));
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod key;
pub mod policy;
pub mod proxy;
pub mod repository;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use cache::{CacheGateway, CacheStore, MemoryStore, MemoryStoreConfig, NullStore};
pub use config::CacheSettings;
pub use error::{CacheError, Result};
pub use policy::{CacheProfile, Policy};
pub use proxy::{CacheProxy, CacheProxyBuilder};
pub use repository::{MethodTable, Repository};
pub use types::TagSet;
