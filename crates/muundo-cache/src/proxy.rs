//! Cache-first asset proxy
//!
//! Requests are answered in this order:
//!
//! 1. URLs matching the denylist go straight to the network, untouched by
//!    the cache.
//! 2. A cached response for the exact method and URL is returned as is.
//! 3. Otherwise the network is asked, bounded by the fetch timeout. A `200`
//!    to a `GET` from the app's own host (or `localhost`) is cached before it
//!    is returned; anything else is passed through uncached.
//!
//! Failures never escape [`AssetProxy::handle`]; they become a
//! `503 Service Unavailable` response.

use std::sync::Arc;

use http::{Method, StatusCode};
use tracing::{debug, error, info};

use crate::cache::{Cache, CacheStorage};
use crate::config::ProxyConfig;
use crate::error::ProxyResult;
use crate::fetch::{fetch_with_timeout, Fetcher, HttpFetcher};
use crate::filter;
use crate::message::{AssetRequest, AssetResponse};
use crate::LOG_PREFIX;

/// The asset proxy. Clones share configuration, caches and fetcher.
#[derive(Clone)]
pub struct AssetProxy {
    config: Arc<ProxyConfig>,
    storage: CacheStorage,
    fetcher: Arc<dyn Fetcher>,
}

impl std::fmt::Debug for AssetProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetProxy")
            .field("config", &self.config)
            .field("caches", &self.storage.keys())
            .finish_non_exhaustive()
    }
}

impl AssetProxy {
    pub fn new(config: ProxyConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            config: Arc::new(config),
            storage: CacheStorage::new(),
            fetcher,
        }
    }

    /// Proxy that fetches over HTTP with a default `reqwest` client.
    pub fn with_http(config: ProxyConfig) -> Self {
        Self::new(config, Arc::new(HttpFetcher::new()))
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    /// The cache this proxy installs into and fills.
    pub fn cache(&self) -> Cache {
        self.storage.open(&self.config.cache_name)
    }

    /// Fetch and cache every manifest entry.
    ///
    /// # Errors
    ///
    /// `InstallFailed` naming the first entry that could not be fetched with
    /// a success status. Nothing is cached in that case.
    pub async fn install(&self) -> ProxyResult<usize> {
        info!("{} Install", LOG_PREFIX);

        let requests = self
            .config
            .manifest_urls()?
            .into_iter()
            .map(AssetRequest::get)
            .collect();

        info!("{} Caching all: app shell and content", LOG_PREFIX);
        let count = self
            .cache()
            .add_all(Arc::clone(&self.fetcher), requests, self.config.fetch_timeout)
            .await?;

        info!("{} Installed {} entries into {}", LOG_PREFIX, count, self.config.cache_name);
        Ok(count)
    }

    /// Answer one intercepted request. Never fails.
    pub async fn handle(&self, request: AssetRequest) -> AssetResponse {
        let url = request.url.to_string();

        if filter::should_bypass(&url, &self.config.denylist) {
            info!("{} Skipping problematic URL: {}", LOG_PREFIX, url);
            return match self.fetcher.fetch(&request).await {
                Ok(response) => response,
                Err(e) => {
                    error!("{} Fetch failed for {}: {}", LOG_PREFIX, url, e);
                    AssetResponse::network_error()
                }
            };
        }

        match self.cache_first(request).await {
            Ok(response) => response,
            Err(e) => {
                error!("{} Fetch failed for {}: {}", LOG_PREFIX, url, e);
                AssetResponse::network_error()
            }
        }
    }

    async fn cache_first(&self, request: AssetRequest) -> ProxyResult<AssetResponse> {
        if let Some(cached) = self.storage.match_request(&request) {
            debug!("{} Serving from cache: {}", LOG_PREFIX, request.url);
            return Ok(cached);
        }

        debug!("{} Fetching resource: {}", LOG_PREFIX, request.url);
        let response =
            fetch_with_timeout(self.fetcher.as_ref(), &request, self.config.fetch_timeout).await?;

        // Only GET responses are cacheable
        if request.method == Method::GET
            && response.status == StatusCode::OK
            && filter::is_same_origin(&request.url, &self.config.origin)
        {
            info!("{} Caching new resource: {}", LOG_PREFIX, request.url);
            self.cache().put(&request, response.clone());
        }

        Ok(response)
    }
}
