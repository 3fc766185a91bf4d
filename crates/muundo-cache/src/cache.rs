//! Named in-memory response caches
//!
//! [`CacheStorage`] maps cache names to [`Cache`]s. A cache maps a request's
//! method and full URL to a buffered response. There is no eviction and no
//! freshness check: an entry stays until it is deleted or replaced.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use http::Method;
use parking_lot::RwLock;
use tokio::task::JoinSet;
use tracing::debug;
use url::Url;

use crate::error::{ProxyError, ProxyResult};
use crate::fetch::{fetch_with_timeout, Fetcher};
use crate::message::{AssetRequest, AssetResponse};
use crate::LOG_PREFIX;

type CacheKey = (Method, Url);

fn key_of(request: &AssetRequest) -> CacheKey {
    (request.method.clone(), request.url.clone())
}

/// One named cache. Clones share the same entries.
#[derive(Debug, Clone)]
pub struct Cache {
    name: Arc<str>,
    entries: Arc<RwLock<HashMap<CacheKey, AssetResponse>>>,
}

impl Cache {
    fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cached response for exactly this method and URL.
    pub fn match_request(&self, request: &AssetRequest) -> Option<AssetResponse> {
        self.entries.read().get(&key_of(request)).cloned()
    }

    /// Store `response` under `request`, replacing any previous entry.
    pub fn put(&self, request: &AssetRequest, response: AssetResponse) {
        self.entries.write().insert(key_of(request), response);
    }

    /// Fetch every request and store all responses, or store nothing.
    ///
    /// All fetches run concurrently, each bounded by `timeout`. Any transport
    /// failure, timeout or non-success status fails the whole batch with
    /// `InstallFailed` naming the offending URL.
    pub async fn add_all(
        &self,
        fetcher: Arc<dyn Fetcher>,
        requests: Vec<AssetRequest>,
        timeout: Duration,
    ) -> ProxyResult<usize> {
        let mut fetches = JoinSet::new();
        for request in requests {
            let fetcher = Arc::clone(&fetcher);
            fetches.spawn(async move {
                let outcome = fetch_with_timeout(fetcher.as_ref(), &request, timeout).await;
                (request, outcome)
            });
        }

        let mut fetched = Vec::with_capacity(fetches.len());
        while let Some(joined) = fetches.join_next().await {
            let (request, outcome) = joined.map_err(|e| ProxyError::InstallFailed {
                entry: "<worker>".into(),
                reason: e.to_string(),
            })?;
            let failed = |reason: String| ProxyError::InstallFailed {
                entry: request.url.to_string(),
                reason,
            };
            let response = outcome.map_err(|e| failed(e.to_string()))?;
            if !response.is_success() {
                return Err(failed(format!("status {}", response.status)));
            }
            fetched.push((request, response));
        }

        let count = fetched.len();
        let mut entries = self.entries.write();
        for (request, response) in fetched {
            entries.insert(key_of(&request), response);
        }
        debug!("{} Cached {} entries in {}", LOG_PREFIX, count, self.name);
        Ok(count)
    }

    /// Requests with a cached response, in no particular order.
    pub fn keys(&self) -> Vec<AssetRequest> {
        self.entries
            .read()
            .keys()
            .map(|(method, url)| AssetRequest::new(method.clone(), url.clone()))
            .collect()
    }

    /// Remove the entry for this request. Returns whether one existed.
    pub fn delete(&self, request: &AssetRequest) -> bool {
        self.entries.write().remove(&key_of(request)).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// Registry of named caches. Clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct CacheStorage {
    caches: Arc<RwLock<HashMap<String, Cache>>>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache called `name`, created empty on first open.
    pub fn open(&self, name: &str) -> Cache {
        if let Some(cache) = self.caches.read().get(name) {
            return cache.clone();
        }
        self.caches
            .write()
            .entry(name.to_string())
            .or_insert_with(|| Cache::new(name))
            .clone()
    }

    pub fn has(&self, name: &str) -> bool {
        self.caches.read().contains_key(name)
    }

    pub fn delete(&self, name: &str) -> bool {
        self.caches.write().remove(name).is_some()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut names: Vec<String> = self.caches.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// First cached response for `request` across all caches, searched in
    /// name order.
    pub fn match_request(&self, request: &AssetRequest) -> Option<AssetResponse> {
        let caches = self.caches.read();
        let mut names: Vec<&String> = caches.keys().collect();
        names.sort();
        names
            .into_iter()
            .find_map(|name| caches.get(name)?.match_request(request))
    }
}
