use thiserror::Error;

/// Errors surfaced by repository operations.
///
/// Cache-layer problems (unreadable or expired entries) are absorbed as cache
/// misses and never reach this enum; a failed operation leaves all
/// previously-committed local state untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Transport-level failure: the request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx response or an `{error: ...}` payload. The server's message
    /// is passed through verbatim.
    #[error("{0}")]
    Server(String),

    /// Update rejected because the submitted version is stale. The caller
    /// must refetch the current event and retry or abandon.
    #[error("conflicting update: {0}")]
    Conflict(String),

    /// Client-side precondition failure, raised before any network call.
    #[error("{0}")]
    Validation(String),
}
