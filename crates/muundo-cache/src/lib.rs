//! Cache-first asset proxy for the Muundo configurator
//!
//! The configurator's web build is a handful of large static files (loader,
//! framework, data and wasm bundles plus a stylesheet). This crate installs
//! them into a named cache up front and then serves intercepted requests
//! cache-first, falling back to the network under a timeout.
//!
//! # Example
//!
//! ```rust,no_run
//! use muundo_cache::{AssetProxy, AssetRequest, ProxyConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProxyConfig::for_origin("https://configurator.example.com/")?;
//! let proxy = AssetProxy::with_http(config);
//! proxy.install().await?;
//!
//! let url = proxy.config().resolve("Build/WebGl_Build.data")?;
//! let response = proxy.handle(AssetRequest::get(url)).await;
//! assert!(response.is_success());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod message;
pub mod proxy;
pub mod server;

// Re-export main types
pub use cache::{Cache, CacheStorage};
pub use config::{ProxyConfig, CACHE_NAME, DENYLIST, FETCH_TIMEOUT, MANIFEST};
pub use error::{ProxyError, ProxyResult};
pub use fetch::{fetch_with_timeout, Fetcher, HttpFetcher};
pub use message::{AssetRequest, AssetResponse};
pub use proxy::AssetProxy;
pub use server::router;

/// Log prefix for proxy operations.
pub const LOG_PREFIX: &str = "[Service Worker]";
