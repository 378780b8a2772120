// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Network-first request policy with cache and offline-shell fallback.

use std::fmt;

use sw_core::{request_key, AssetCache};
use url::Url;

use super::fetch::{FetchError, FetchRequest, FetchResponse, Fetcher};
use crate::config::AgentConfig;

/// Where an intercepted response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    /// Live response from the network.
    Network,
    /// Live response for an excluded host, never cached.
    Passthrough,
    /// Stored copy of this exact request.
    Cache,
    /// The cached offline shell.
    OfflineShell,
    /// Synthetic 503.
    Unavailable,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Network => "network",
            ResponseSource::Passthrough => "passthrough",
            ResponseSource::Cache => "cache",
            ResponseSource::OfflineShell => "offline-shell",
            ResponseSource::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A response plus its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intercepted {
    pub response: FetchResponse,
    pub source: ResponseSource,
}

impl Intercepted {
    fn new(response: FetchResponse, source: ResponseSource) -> Self {
        Intercepted { response, source }
    }
}

/// Applies the interception policy to requests.
pub struct Interceptor<F> {
    pub(super) fetcher: F,
    pub(super) cache: AssetCache,
    pub(super) cache_name: String,
    pub(super) offline_shell: String,
    excluded_hosts: Vec<String>,
}

impl<F: Fetcher> Interceptor<F> {
    pub fn new(fetcher: F, cache: AssetCache, config: &AgentConfig) -> Self {
        Interceptor {
            fetcher,
            cache,
            cache_name: config.cache_name.clone(),
            offline_shell: config.offline_shell.clone(),
            excluded_hosts: config
                .excluded_hosts
                .iter()
                .map(|h| h.to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    /// Whether requests to this URL bypass interception.
    pub fn is_excluded(&self, url: &Url) -> bool {
        url.host_str().is_some_and(|host| {
            let host = host.to_ascii_lowercase();
            self.excluded_hosts.iter().any(|h| *h == host)
        })
    }

    /// Handle one request.
    ///
    /// Only excluded hosts can yield an error: their failures are passed back
    /// unmodified instead of being answered from the cache.
    pub async fn handle(&self, request: FetchRequest) -> Result<Intercepted, FetchError> {
        if self.is_excluded(&request.url) {
            let response = self.fetcher.fetch(request).await?;
            return Ok(Intercepted::new(response, ResponseSource::Passthrough));
        }

        let key = request.key();
        let shell_key = self.shell_key(&request.url);
        let cacheable = request.is_get();

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if cacheable && response.is_success() {
                    self.store_in_background(key, &response);
                }
                Ok(Intercepted::new(response, ResponseSource::Network))
            }
            Err(e) => {
                tracing::debug!(%key, "network fetch failed, using cache: {}", e);
                Ok(self.fallback(&key, shell_key.as_deref()))
            }
        }
    }

    fn fallback(&self, key: &str, shell_key: Option<&str>) -> Intercepted {
        if let Some(cached) = self.lookup(key) {
            return Intercepted::new(cached.into(), ResponseSource::Cache);
        }
        if let Some(shell) = shell_key.and_then(|k| self.lookup(k)) {
            return Intercepted::new(shell.into(), ResponseSource::OfflineShell);
        }
        Intercepted::new(FetchResponse::unavailable(), ResponseSource::Unavailable)
    }

    fn lookup(&self, key: &str) -> Option<sw_core::CachedResponse> {
        match self.cache.lookup(&self.cache_name, key) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(%key, "cache lookup failed: {}", e);
                None
            }
        }
    }

    /// Cache key of the offline shell on the same origin as `url`.
    fn shell_key(&self, url: &Url) -> Option<String> {
        url.join(&self.offline_shell)
            .ok()
            .map(|shell| request_key("GET", shell.as_str()))
    }

    // Write the copy off the request path. Failures are logged and ignored.
    fn store_in_background(&self, key: String, response: &FetchResponse) {
        let cache = self.cache.clone();
        let cache_name = self.cache_name.clone();
        let cached = response.to_cached();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = cache.put(&cache_name, &key, &cached) {
                tracing::debug!(%key, "failed to cache response: {}", e);
            }
        });
    }
}
