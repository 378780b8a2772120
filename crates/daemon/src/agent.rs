// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wiring of the agent's long-running tasks.

use std::fs;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use sw_core::Database;
use tokio::net::{TcpListener, UnixListener};
use tokio::sync::watch;

use crate::config::AgentConfig;
use crate::connectivity::{self, HttpProbe};
use crate::context::AgentContext;
use crate::error::Result;
use crate::intercept::{self, HttpFetcher, Interceptor};
use crate::lifecycle;
use crate::server;
use crate::sync::HttpTransport;

/// Run the agent until `shutdown` resolves.
///
/// Opens the database, starts the sync worker, the interception proxy (when
/// an upstream origin is configured), the connectivity monitor (when a probe
/// URL is configured), and serves the application socket.
pub async fn run<S>(state_dir: &Path, config: AgentConfig, shutdown: S) -> Result<()>
where
    S: Future<Output = ()>,
{
    let db = Database::open(&lifecycle::db_path(state_dir))?;
    let (ctx, worker) = AgentContext::start(config.clone(), db, HttpTransport::new()?);

    let interceptor = Arc::new(Interceptor::new(
        HttpFetcher::new(config.fetch_timeout())?,
        ctx.cache.clone(),
        &config,
    ));
    let stale = interceptor.activate()?;
    if !stale.is_empty() {
        tracing::info!(removed = ?stale, cache = %config.cache_name, "activated cache");
    }

    let (stop_tx, stop_rx) = watch::channel(false);

    let proxy = match config.upstream_origin.clone() {
        Some(origin) => {
            let listener = TcpListener::bind(config.proxy_bind).await?;

            let installer = Arc::clone(&interceptor);
            let precache = config.precache.clone();
            let install_origin = origin.clone();
            tokio::spawn(async move {
                installer.install(&install_origin, &precache).await;
            });

            let app = intercept::router(interceptor, Some(origin));
            let stopped = wait_for_stop(stop_rx.clone());
            Some(tokio::spawn(async move {
                if let Err(e) = intercept::serve(listener, app, stopped).await {
                    tracing::error!("proxy server failed: {}", e);
                }
            }))
        }
        None => {
            tracing::info!("no upstream_origin configured, proxy disabled");
            None
        }
    };

    let monitor = match config.probe_url.clone() {
        Some(url) => {
            let probe = HttpProbe::new(url, config.probe_timeout())?;
            Some(tokio::spawn(connectivity::run(
                probe,
                config.probe_interval(),
                ctx.sync.clone(),
            )))
        }
        None => None,
    };

    let socket_path = config.socket_path(state_dir);
    // Remove stale socket if it exists
    let _ = fs::remove_file(&socket_path);
    let listener = UnixListener::bind(&socket_path)?;
    tracing::info!("listening on {}", socket_path.display());

    server::serve(listener, Arc::clone(&ctx), shutdown).await;

    let _ = stop_tx.send(true);
    if let Some(proxy) = proxy {
        let _ = proxy.await;
    }
    if let Some(monitor) = monitor {
        monitor.abort();
    }
    worker.abort();
    Ok(())
}

async fn wait_for_stop(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stopped| *stopped).await;
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
