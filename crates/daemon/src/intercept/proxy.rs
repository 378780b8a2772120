// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP front end for the interceptor.
//!
//! Every request is routed through [`Interceptor::handle`]. Origin-form
//! requests (`GET /app.js`) are resolved against the upstream origin.
//! Absolute-form requests (`GET http://host/app.js`, forward-proxy usage)
//! keep their own target.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::{HeaderName, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use url::Url;

use super::fetch::{is_hop_by_hop, FetchRequest, FetchResponse, Fetcher};
use super::interceptor::{Intercepted, Interceptor};

/// Response header naming where the response came from.
pub const SOURCE_HEADER: &str = "x-stowaway-source";

/// Largest request body the proxy will buffer.
const MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

struct ProxyState<F> {
    interceptor: Arc<Interceptor<F>>,
    upstream: Option<Url>,
}

/// Build the proxy router.
pub fn router<F: Fetcher + 'static>(
    interceptor: Arc<Interceptor<F>>,
    upstream: Option<Url>,
) -> Router {
    let state = Arc::new(ProxyState {
        interceptor,
        upstream,
    });
    Router::new()
        .fallback(handle_request::<F>)
        .with_state(state)
}

/// Serve the proxy until `shutdown` resolves.
pub async fn serve<S>(listener: TcpListener, app: Router, shutdown: S) -> std::io::Result<()>
where
    S: std::future::Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("proxy listening on {}", addr);
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolve the request target.
pub fn target_url(uri: &Uri, upstream: Option<&Url>) -> Option<Url> {
    if uri.scheme().is_some() {
        return Url::parse(&uri.to_string()).ok();
    }
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    upstream?.join(path).ok()
}

async fn handle_request<F: Fetcher + 'static>(
    State(state): State<Arc<ProxyState<F>>>,
    request: Request,
) -> Response {
    let Some(url) = target_url(request.uri(), state.upstream.as_ref()) else {
        return (StatusCode::BAD_REQUEST, "no upstream for request").into_response();
    };

    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, MAX_BODY_SIZE).await {
        Ok(bytes) => bytes.to_vec(),
        Err(e) => {
            tracing::debug!(%url, "failed to read request body: {}", e);
            return (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response();
        }
    };
    let headers = parts
        .headers
        .iter()
        .filter(|(name, _)| !is_hop_by_hop(name.as_str()))
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    let fetch = FetchRequest {
        method: parts.method.as_str().to_string(),
        url,
        headers,
        body,
    };
    let method = fetch.method.clone();
    let target = fetch.url.to_string();

    match state.interceptor.handle(fetch).await {
        Ok(intercepted) => {
            tracing::debug!(
                %method,
                %target,
                status = intercepted.response.status,
                source = %intercepted.source,
                "proxied request"
            );
            into_response(intercepted)
        }
        Err(e) => {
            tracing::debug!(%method, %target, "passthrough failed: {}", e);
            (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
        }
    }
}

fn into_response(intercepted: Intercepted) -> Response {
    let Intercepted { response, source } = intercepted;
    let FetchResponse {
        status,
        headers,
        body,
    } = response;

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut builder = axum::http::Response::builder().status(status);
    for (name, value) in &headers {
        if is_hop_by_hop(name) || name.eq_ignore_ascii_case("content-length") {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            builder = builder.header(name, value);
        }
    }
    builder = builder.header(SOURCE_HEADER, source.as_str());

    match builder.body(Body::from(body)) {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("failed to build proxy response: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
