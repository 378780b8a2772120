// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Network fetch abstraction used by the interceptor.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use sw_core::{request_key, CachedResponse};
use url::Url;

/// Headers that describe a single hop and are never forwarded or cached.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Whether a header must be dropped when relaying a request or response.
pub fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| h.eq_ignore_ascii_case(name))
}

/// An intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub method: String,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl FetchRequest {
    /// A bodiless GET.
    pub fn get(url: Url) -> Self {
        FetchRequest {
            method: "GET".to_string(),
            url,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }

    /// Cache key identifying this request.
    pub fn key(&self) -> String {
        request_key(&self.method, self.url.as_str())
    }
}

/// A response, live or reconstructed from the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Synthetic reply used when neither network nor cache can answer.
    pub fn unavailable() -> Self {
        FetchResponse {
            status: 503,
            headers: vec![(
                "content-type".to_string(),
                "text/plain; charset=utf-8".to_string(),
            )],
            body: b"Offline".to_vec(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Copy of this response suitable for the asset cache.
    pub fn to_cached(&self) -> CachedResponse {
        CachedResponse::new(self.status, self.headers.clone(), self.body.clone())
    }
}

impl From<CachedResponse> for FetchResponse {
    fn from(cached: CachedResponse) -> Self {
        FetchResponse {
            status: cached.status,
            headers: cached.headers,
            body: cached.body,
        }
    }
}

/// Failure to obtain any response from the network.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("network error: {0}")]
    Network(String),
}

/// Performs network requests on behalf of the interceptor.
pub trait Fetcher: Send + Sync {
    fn fetch(
        &self,
        request: FetchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<FetchResponse, FetchError>> + Send + '_>>;
}

/// Fetcher backed by reqwest. Redirects are returned, not followed.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .build()?;
        Ok(HttpFetcher { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(
        &self,
        request: FetchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<FetchResponse, FetchError>> + Send + '_>> {
        Box::pin(async move {
            let method = reqwest::Method::from_bytes(request.method.as_bytes())
                .map_err(|e| FetchError::InvalidRequest(e.to_string()))?;

            let mut builder = self.client.request(method, request.url);
            for (name, value) in &request.headers {
                if is_hop_by_hop(name) || name.eq_ignore_ascii_case("host") {
                    continue;
                }
                builder = builder.header(name.as_str(), value.as_str());
            }
            if !request.body.is_empty() {
                builder = builder.body(request.body);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter(|(name, _)| !is_hop_by_hop(name.as_str()))
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response
                .bytes()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?
                .to_vec();

            Ok(FetchResponse {
                status,
                headers,
                body,
            })
        })
    }
}
