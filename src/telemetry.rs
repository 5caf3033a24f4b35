//! Telemetry metric name constants.
//!
//! Centralised metric names for repocache. Consumers install their own
//! `metrics` recorder (e.g. prometheus, statsd); without a recorder
//! installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `repocache_`. Counters end in `_total`.
//!
//! # Common labels
//!
//! - `prefix`: the proxy's key prefix (one per repository type)
//! - `method`: repository method name
//! - `operation`: store operation: "get", "put" or "invalidate"
//! - `reason`: why a call bypassed the cache: "excluded" or "disabled"

/// Total cache hits served without calling the repository.
///
/// Labels: `prefix`, `method`.
pub const CACHE_HITS_TOTAL: &str = "repocache_cache_hits_total";

/// Total cache misses that fell through to the repository.
///
/// Labels: `prefix`, `method`.
pub const CACHE_MISSES_TOTAL: &str = "repocache_cache_misses_total";

/// Total calls that skipped the cache path entirely.
///
/// Labels: `prefix`, `method`, `reason` ("excluded" | "disabled").
pub const CACHE_BYPASS_TOTAL: &str = "repocache_cache_bypass_total";

/// Total store operations that failed and were recovered locally.
///
/// Labels: `store`, `operation` ("get" | "put" | "invalidate").
pub const STORE_ERRORS_TOTAL: &str = "repocache_store_errors_total";

/// Total tag-group invalidations issued.
///
/// Labels: `prefix`.
pub const TAG_INVALIDATIONS_TOTAL: &str = "repocache_tag_invalidations_total";
