//! Logging setup and prefixes.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing with the given default filter.
///
/// `RUST_LOG` overrides `default_filter` when set. Logs go to stderr so
/// command output on stdout stays machine-readable.
pub fn init(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .init();
}

/// Log prefixes, one per subsystem.
pub mod prefix {
    /// Store operations
    pub const DB: &str = muundo_sqlite::LOG_PREFIX;
    /// Asset proxy
    pub const SERVICE_WORKER: &str = muundo_cache::LOG_PREFIX;
    /// Loader bootstrap
    pub const LOADER: &str = "[Loader]";
}
