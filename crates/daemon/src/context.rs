// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared agent state handed to every connection handler.

use std::sync::Arc;

use sw_core::{AssetCache, Database, QueueStore};
use tokio::task::JoinHandle;

use crate::clients::ClientRegistry;
use crate::config::AgentConfig;
use crate::sync::{self, DeliveryTransport, SyncHandle, SyncManager};

/// Everything a handler needs, built once at startup.
pub struct AgentContext {
    pub config: AgentConfig,
    pub store: QueueStore,
    pub cache: AssetCache,
    pub clients: ClientRegistry,
    pub sync: SyncHandle,
}

impl AgentContext {
    /// Build the context over an open database and start the sync worker.
    pub fn start<T>(config: AgentConfig, db: Database, transport: T) -> (Arc<Self>, JoinHandle<()>)
    where
        T: DeliveryTransport + 'static,
    {
        let store = QueueStore::new(db.clone());
        let cache = AssetCache::new(db);
        let clients = ClientRegistry::new(config.credential_timeout());

        let manager = SyncManager::new(
            store.clone(),
            transport,
            clients.clone(),
            config.delivery_timeout(),
        );
        let (sync, worker) = sync::spawn(manager);

        let ctx = AgentContext {
            config,
            store,
            cache,
            clients,
            sync,
        };
        (Arc::new(ctx), worker)
    }
}

/// Run a queue operation on the blocking pool.
///
/// Every write is fsynced (`synchronous = FULL`) under the connection mutex,
/// so store calls stay off the async workers.
pub async fn with_store<T, F>(store: &QueueStore, f: F) -> sw_core::Result<T>
where
    F: FnOnce(&QueueStore) -> sw_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let store = store.clone();
    tokio::task::spawn_blocking(move || f(&store))
        .await
        .map_err(|e| sw_core::Error::Io(std::io::Error::other(e)))?
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
