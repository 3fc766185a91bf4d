//! Network access
//!
//! [`Fetcher`] is the seam between the proxy and the network. [`HttpFetcher`]
//! is the real implementation; tests substitute scripted fetchers.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ProxyError, ProxyResult};
use crate::message::{AssetRequest, AssetResponse};
use crate::LOG_PREFIX;

/// Performs one network round trip.
///
/// Any HTTP status is a successful fetch; only transport failures are errors.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &AssetRequest) -> ProxyResult<AssetResponse>;
}

/// `reqwest`-backed fetcher.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &AssetRequest) -> ProxyResult<AssetResponse> {
        debug!("{} {} {}", LOG_PREFIX, request.method, request.url);

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ProxyError::NetworkError(e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| ProxyError::NetworkError(e.to_string()))?;

        Ok(AssetResponse {
            status,
            headers,
            body,
        })
    }
}

/// Fetch, failing with `FetchTimeout` if no response arrives within
/// `timeout`.
///
/// The in-flight fetch is dropped when the timeout wins.
pub async fn fetch_with_timeout(
    fetcher: &dyn Fetcher,
    request: &AssetRequest,
    timeout: Duration,
) -> ProxyResult<AssetResponse> {
    tokio::time::timeout(timeout, fetcher.fetch(request))
        .await
        .map_err(|_| ProxyError::FetchTimeout {
            url: request.url.to_string(),
            timeout,
        })?
}
