//! Proxy configuration

use std::time::Duration;

use url::Url;

use crate::error::{ProxyError, ProxyResult};

/// Name of the cache the app shell is installed into.
pub const CACHE_NAME: &str = "Saltvision-Papadatos-1.0.0";

/// App shell entries installed up front, relative to the origin.
pub const MANIFEST: &[&str] = &[
    "Build/WebGl_Build.loader.js",
    "Build/WebGl_Build.framework.js",
    "Build/WebGl_Build.data",
    "Build/WebGl_Build.wasm",
    "TemplateData/style.css",
];

/// Substrings marking URLs that go straight to the network, never cached.
pub const DENYLIST: &[&str] = &[
    // Firebase SDK
    "firebasejs",
    "firebase-app.js",
    "firebase-database.js",
    "firebase-auth.js",
    "firebase-firestore.js",
    "gstatic.com/firebasejs",
    "googleapis.com",
    "google.com",
    // Browser extensions
    "chrome-extension://",
    "moz-extension://",
    // Third-party services
    "analytics.google.com",
    "fonts.googleapis.com",
    "fonts.gstatic.com",
    // Large build files requested with a query string
    ".wasm?",
    ".data?",
];

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Asset proxy settings.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub cache_name: String,
    /// The app's own origin; manifest entries resolve against it and only
    /// responses from its host are cached.
    pub origin: Url,
    pub manifest: Vec<String>,
    pub fetch_timeout: Duration,
    pub denylist: Vec<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            cache_name: CACHE_NAME.to_string(),
            origin: Url::parse("http://localhost/").expect("static origin url is valid"),
            manifest: MANIFEST.iter().map(|s| s.to_string()).collect(),
            fetch_timeout: FETCH_TIMEOUT,
            denylist: DENYLIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ProxyConfig {
    /// Default settings for the app served at `origin`.
    pub fn for_origin(origin: &str) -> ProxyResult<Self> {
        let origin = Url::parse(origin).map_err(|e| ProxyError::InvalidUrl(format!("{}: {}", origin, e)))?;
        Ok(Self {
            origin,
            ..Self::default()
        })
    }

    /// Resolve a path (manifest entry or request target) against the origin.
    pub fn resolve(&self, path: &str) -> ProxyResult<Url> {
        self.origin
            .join(path)
            .map_err(|e| ProxyError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Manifest entries as absolute URLs.
    pub fn manifest_urls(&self) -> ProxyResult<Vec<Url>> {
        self.manifest.iter().map(|entry| self.resolve(entry)).collect()
    }
}
