//! Request and response values passed through the proxy

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use url::Url;

/// An outgoing asset request.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl AssetRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }
}

/// A fully buffered response.
///
/// The body is reference counted, so cloning a cached response is cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl AssetResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// `503 Service Unavailable` with body `Network error`, answered when a
    /// request cannot be served from cache or network.
    pub fn network_error() -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "Network error")
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_response() {
        let response = AssetResponse::network_error();
        assert_eq!(response.status.as_u16(), 503);
        assert_eq!(response.status.canonical_reason(), Some("Service Unavailable"));
        assert_eq!(&response.body[..], b"Network error");
        assert!(!response.is_success());
    }
}
