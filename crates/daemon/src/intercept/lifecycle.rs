// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Cache install and activation.
//!
//! `install` fills the current cache from the upstream origin; `activate`
//! drops every cache left behind by a previous cache name.

use url::Url;

use super::fetch::{FetchRequest, Fetcher};
use super::interceptor::Interceptor;

/// Outcome of [`Interceptor::install`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Keys stored in the current cache.
    pub cached: Vec<String>,
    /// Paths that could not be fetched or returned a non-2xx status.
    pub failed: Vec<String>,
}

impl<F: Fetcher> Interceptor<F> {
    /// Pre-cache `paths` and the offline shell from `origin`.
    ///
    /// Failures are recorded in the report and do not stop the install.
    pub async fn install(&self, origin: &Url, paths: &[String]) -> InstallReport {
        let mut report = InstallReport::default();

        let mut targets: Vec<&str> = paths.iter().map(String::as_str).collect();
        if !targets.contains(&self.offline_shell.as_str()) {
            targets.push(&self.offline_shell);
        }

        for path in targets {
            let url = match origin.join(path) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!(path, "cannot resolve precache path: {}", e);
                    report.failed.push(path.to_string());
                    continue;
                }
            };
            let request = FetchRequest::get(url);
            let key = request.key();

            let response = match self.fetcher.fetch(request).await {
                Ok(response) if response.is_success() => response,
                Ok(response) => {
                    tracing::warn!(path, status = response.status, "precache fetch rejected");
                    report.failed.push(path.to_string());
                    continue;
                }
                Err(e) => {
                    tracing::warn!(path, "precache fetch failed: {}", e);
                    report.failed.push(path.to_string());
                    continue;
                }
            };

            match self.cache.put(&self.cache_name, &key, &response.to_cached()) {
                Ok(()) => report.cached.push(key),
                Err(e) => {
                    tracing::warn!(path, "failed to store precached asset: {}", e);
                    report.failed.push(path.to_string());
                }
            }
        }

        tracing::info!(
            cache = %self.cache_name,
            cached = report.cached.len(),
            failed = report.failed.len(),
            "precache finished"
        );
        report
    }

    /// Delete every cache except the current one. Returns the names removed.
    pub fn activate(&self) -> sw_core::Result<Vec<String>> {
        let mut removed = Vec::new();
        for name in self.cache.cache_names()? {
            if name == self.cache_name {
                continue;
            }
            let entries = self.cache.delete_cache(&name)?;
            tracing::info!(cache = %name, entries, "removed stale cache");
            removed.push(name);
        }
        Ok(removed)
    }
}
