//! repocache error types

/// repocache error types
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    // Dispatch errors
    #[error("method '{0}' does not exist in the repository")]
    MethodNotFound(String),

    // Store errors (recovered by the gateway, never surfaced from `invoke`)
    #[error("cache read failed: {0}")]
    CacheRead(String),

    #[error("cache write failed: {0}")]
    CacheWrite(String),

    // Repository errors, passed through untouched
    #[error("repository error: {0}")]
    Repository(String),

    /// Error raised by a repository operation, keeping its original source.
    #[error("operation '{method}' failed: {source}")]
    Operation {
        method: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An argument could not be decoded into the type a registered method expects.
    #[error("invalid argument {index} for '{method}': {reason}")]
    InvalidArgument {
        method: String,
        index: usize,
        reason: String,
    },

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl CacheError {
    /// Wrap an arbitrary error raised inside a repository operation.
    pub fn operation(
        method: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        CacheError::Operation {
            method: method.into(),
            source: source.into(),
        }
    }

    /// Whether this error came from the cache store rather than the repository.
    ///
    /// Cache failures are recovered locally by the gateway: a failed read is a
    /// miss, a failed write or invalidation is logged and dropped.
    pub fn is_cache_failure(&self) -> bool {
        matches!(self, CacheError::CacheRead(_) | CacheError::CacheWrite(_))
    }
}

/// Result type alias for repocache operations
pub type Result<T> = std::result::Result<T, CacheError>;
