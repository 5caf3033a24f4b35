//! Caching proxy

mod builder;
mod dispatch;

pub use builder::CacheProxyBuilder;
pub use dispatch::CacheProxy;
