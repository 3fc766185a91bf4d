//! URL classification: denylist bypass and same-origin check

use url::Url;

/// True if `url` contains any of `patterns` as a plain substring.
///
/// Matching URLs skip the cache entirely.
pub fn should_bypass(url: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| url.contains(pattern.as_str()))
}

/// True if `url` is served by the origin's host or by `localhost`.
///
/// Only the host is compared; scheme and port are ignored. A URL without a
/// host is never same-origin.
pub fn is_same_origin(url: &Url, origin: &Url) -> bool {
    match url.host_str() {
        Some(host) => host == "localhost" || Some(host) == origin.host_str(),
        None => false,
    }
}
