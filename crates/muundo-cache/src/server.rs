//! HTTP surface for the proxy
//!
//! Every request goes through [`AssetProxy::handle`]. Absolute-form targets
//! (`GET http://host/path`, as sent to a forward proxy) are fetched as given;
//! origin-form targets (`GET /path`) resolve against the configured origin
//! and never leave it.

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use axum::Router;
use http::header::{self, HeaderMap, HeaderName};
use http::{Method, StatusCode};
use tracing::warn;
use url::Url;

use crate::message::AssetRequest;
use crate::proxy::AssetProxy;
use crate::LOG_PREFIX;

/// Largest request body forwarded upstream.
const MAX_REQUEST_BODY: usize = 16 * 1024 * 1024;

/// Router sending every request through `proxy`.
pub fn router(proxy: AssetProxy) -> Router {
    Router::new().fallback(proxy_request).with_state(proxy)
}

async fn proxy_request(State(proxy): State<AssetProxy>, request: Request) -> Response {
    if request.method() == Method::CONNECT {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let url = match target_url(&proxy, &request) {
        Some(url) => url,
        None => {
            warn!("{} Rejecting request for {}", LOG_PREFIX, request.uri());
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, MAX_REQUEST_BODY).await {
        Ok(body) => body,
        Err(_) => return StatusCode::PAYLOAD_TOO_LARGE.into_response(),
    };

    let asset = proxy
        .handle(AssetRequest {
            method: parts.method,
            url,
            headers: forwardable(&parts.headers),
            body,
        })
        .await;

    let mut response = Response::new(Body::from(asset.body));
    *response.status_mut() = asset.status;
    *response.headers_mut() = forwardable(&asset.headers);
    response
}

fn target_url(proxy: &AssetProxy, request: &Request) -> Option<Url> {
    let uri = request.uri();
    if uri.scheme().is_some() && uri.authority().is_some() {
        return Url::parse(&uri.to_string()).ok();
    }
    // A leading `//` would make the join scheme-relative and leave the origin
    let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let path = format!("/{}", path.trim_start_matches('/'));
    proxy.config().resolve(&path).ok()
}

/// Copy of `headers` without the ones that describe a single connection.
fn forwardable(headers: &HeaderMap) -> HeaderMap {
    let hop_by_hop: [HeaderName; 10] = [
        header::CONNECTION,
        header::HOST,
        header::PROXY_AUTHORIZATION,
        header::TE,
        header::TRAILER,
        header::TRANSFER_ENCODING,
        header::UPGRADE,
        header::CONTENT_LENGTH,
        HeaderName::from_static("keep-alive"),
        HeaderName::from_static("proxy-connection"),
    ];

    let mut forwarded = headers.clone();
    for name in hop_by_hop {
        forwarded.remove(name);
    }
    forwarded
}
