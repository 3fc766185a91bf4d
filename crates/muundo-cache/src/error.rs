//! Proxy error types

use std::time::Duration;

use thiserror::Error;

/// Errors raised while fetching or caching assets.
///
/// `AssetProxy::handle` never returns these; it answers with a 503 instead.
#[derive(Debug, Clone, Error)]
pub enum ProxyError {
    /// The network did not answer before the fetch timeout elapsed
    #[error("fetch timeout after {timeout:?}: {url}")]
    FetchTimeout { url: String, timeout: Duration },

    /// Transport-level failure
    #[error("network error: {0}")]
    NetworkError(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// A manifest entry could not be cached during install
    #[error("install failed for {entry}: {reason}")]
    InstallFailed { entry: String, reason: String },
}

pub type ProxyResult<T> = Result<T, ProxyError>;
