// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity monitor.
//!
//! Probes a URL on an interval and triggers a sync whenever the network
//! comes back. The agent starts out assuming it is offline, so the first
//! successful probe also triggers.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use url::Url;

use crate::sync::{SyncHandle, TriggerReason};

/// Answers whether the network is reachable right now.
pub trait Probe: Send + Sync {
    fn check(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;
}

/// HEAD request against a fixed URL. Any HTTP response counts as online.
pub struct HttpProbe {
    client: reqwest::Client,
    url: Url,
}

impl HttpProbe {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpProbe { client, url })
    }
}

impl Probe for HttpProbe {
    fn check(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move {
            match self.client.head(self.url.clone()).send().await {
                Ok(_) => true,
                Err(e) => {
                    tracing::trace!(url = %self.url, "probe failed: {}", e);
                    false
                }
            }
        })
    }
}

/// Tracks the last observed connectivity state.
#[derive(Debug, Default)]
pub struct ConnectivityMonitor {
    online: bool,
}

impl ConnectivityMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a probe result. Returns true on an offline to online transition.
    pub fn observe(&mut self, online: bool) -> bool {
        let reconnected = online && !self.online;
        if online != self.online {
            tracing::info!(online, "connectivity changed");
        }
        self.online = online;
        reconnected
    }
}

/// Probe forever, triggering a sync on every reconnection.
pub async fn run<P: Probe>(probe: P, interval: Duration, sync: SyncHandle) {
    let mut monitor = ConnectivityMonitor::new();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if monitor.observe(probe.check().await) {
            sync.trigger(TriggerReason::Reconnected);
        }
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
