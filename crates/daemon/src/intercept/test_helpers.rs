// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for interception tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sw_core::{AssetCache, CachedResponse};

use super::fetch::{FetchError, FetchRequest, FetchResponse, Fetcher};
use crate::config::AgentConfig;

pub const ORIGIN: &str = "https://app.test";

/// Fetcher serving fixed responses by URL. Unknown URLs are network errors.
#[derive(Clone, Default)]
pub struct MockFetcher {
    routes: Arc<Mutex<HashMap<String, FetchResponse>>>,
    requests: Arc<Mutex<Vec<FetchRequest>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&self, url: &str, status: u16, body: &str) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), response(status, body));
        self
    }

    /// Make every request fail from now on.
    pub fn go_offline(&self) {
        self.routes.lock().unwrap().clear();
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Fetcher for MockFetcher {
    fn fetch(
        &self,
        request: FetchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<FetchResponse, FetchError>> + Send + '_>> {
        Box::pin(async move {
            let found = self.routes.lock().unwrap().get(request.url.as_str()).cloned();
            self.requests.lock().unwrap().push(request);
            found.ok_or_else(|| FetchError::Network("connection refused".to_string()))
        })
    }
}

pub fn response(status: u16, body: &str) -> FetchResponse {
    FetchResponse {
        status,
        headers: vec![("content-type".to_string(), "text/html".to_string())],
        body: body.as_bytes().to_vec(),
    }
}

pub fn cached(body: &str) -> CachedResponse {
    CachedResponse::new(
        200,
        vec![("content-type".to_string(), "text/html".to_string())],
        body.as_bytes().to_vec(),
    )
}

pub fn config() -> AgentConfig {
    AgentConfig {
        excluded_hosts: vec!["api.example.com".to_string()],
        ..AgentConfig::default()
    }
}

/// Poll until the cache holds `key` under `cache_name`.
pub async fn wait_for_cached(cache: &AssetCache, cache_name: &str, key: &str) -> CachedResponse {
    for _ in 0..200 {
        if let Some(found) = cache.lookup(cache_name, key).unwrap() {
            return found;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("{key} was never cached");
}
