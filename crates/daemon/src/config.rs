// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Agent configuration.
//!
//! Configuration is read from `<state_dir>/config.toml` unless `--config`
//! points elsewhere. Every field has a default, so a missing file yields a
//! working agent with the proxy disabled until `upstream_origin` is set.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Config filename within the state directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Agent configuration stored in `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Unix socket applications connect to. Defaults to `<state_dir>/stowd.sock`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket: Option<PathBuf>,
    /// Address the interception proxy listens on (default: 127.0.0.1:8787).
    #[serde(default = "default_proxy_bind")]
    pub proxy_bind: SocketAddr,
    /// Origin that origin-form proxy requests are resolved against.
    /// The proxy is not started when this is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_origin: Option<Url>,
    /// Hosts whose requests pass through without caching.
    #[serde(default)]
    pub excluded_hosts: Vec<String>,
    /// Path of the offline shell resource (default: "/offline.html").
    #[serde(default = "default_offline_shell")]
    pub offline_shell: String,
    /// Current asset cache name (default: "stowaway-v1").
    #[serde(default = "default_cache_name")]
    pub cache_name: String,
    /// Asset paths fetched into the cache when the agent starts.
    #[serde(default)]
    pub precache: Vec<String>,
    /// Upper bound on one proxied network fetch (default: 15000).
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
    /// How long to wait for an application to answer a credential request (default: 5000).
    #[serde(default = "default_credential_timeout_ms")]
    pub credential_timeout_ms: u64,
    /// Upper bound on one delivery request (default: 30000).
    #[serde(default = "default_delivery_timeout_ms")]
    pub delivery_timeout_ms: u64,
    /// Trigger a sync after every SAVE_OFFLINE (default: true).
    #[serde(default = "default_sync_on_save")]
    pub sync_on_save: bool,
    /// URL probed with HEAD to detect reconnection. Monitoring is off when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_url: Option<Url>,
    /// Seconds between connectivity probes (default: 30).
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
    /// Upper bound on one connectivity probe (default: 5000).
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

fn default_proxy_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8787))
}

fn default_offline_shell() -> String {
    "/offline.html".to_string()
}

fn default_cache_name() -> String {
    "stowaway-v1".to_string()
}

fn default_fetch_timeout_ms() -> u64 {
    15000
}

fn default_credential_timeout_ms() -> u64 {
    5000
}

fn default_delivery_timeout_ms() -> u64 {
    30000
}

fn default_sync_on_save() -> bool {
    true
}

fn default_probe_interval_secs() -> u64 {
    30
}

fn default_probe_timeout_ms() -> u64 {
    5000
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            socket: None,
            proxy_bind: default_proxy_bind(),
            upstream_origin: None,
            excluded_hosts: Vec::new(),
            offline_shell: default_offline_shell(),
            cache_name: default_cache_name(),
            precache: Vec::new(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            credential_timeout_ms: default_credential_timeout_ms(),
            delivery_timeout_ms: default_delivery_timeout_ms(),
            sync_on_save: default_sync_on_save(),
            probe_url: None,
            probe_interval_secs: default_probe_interval_secs(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

impl AgentConfig {
    /// Load configuration from a file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(AgentConfig::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AgentConfig =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that parse but cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.cache_name.trim().is_empty() {
            return Err(Error::Config("cache_name must not be empty".to_string()));
        }
        if !self.offline_shell.starts_with('/') {
            return Err(Error::Config(format!(
                "offline_shell must be an absolute path, got '{}'",
                self.offline_shell
            )));
        }
        if let Some(path) = self.precache.iter().find(|p| !p.starts_with('/')) {
            return Err(Error::Config(format!(
                "precache entries must be absolute paths, got '{path}'"
            )));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(Error::Config(
                "fetch_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.credential_timeout_ms == 0 {
            return Err(Error::Config(
                "credential_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.delivery_timeout_ms == 0 {
            return Err(Error::Config(
                "delivery_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.probe_url.is_some() && self.probe_interval_secs == 0 {
            return Err(Error::Config(
                "probe_interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.probe_url.is_some() && self.probe_timeout_ms == 0 {
            return Err(Error::Config(
                "probe_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if let Some(origin) = &self.upstream_origin {
            if origin.host_str().is_none() {
                return Err(Error::Config(format!(
                    "upstream_origin has no host: {origin}"
                )));
            }
        }
        Ok(())
    }

    /// Socket path, resolved against the state directory.
    pub fn socket_path(&self, state_dir: &Path) -> PathBuf {
        self.socket
            .clone()
            .unwrap_or_else(|| crate::lifecycle::socket_path(state_dir))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn credential_timeout(&self) -> Duration {
        Duration::from_millis(self.credential_timeout_ms)
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }

    /// Probe timeout, never longer than the interval between probes.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms).min(self.probe_interval())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
