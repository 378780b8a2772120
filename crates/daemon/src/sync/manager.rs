// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The sync manager and its trigger worker.

use std::sync::Arc;
use std::time::Duration;

use sw_core::{DeliveryResponse, QueueStore, SyncBatch};
use sw_ipc::{AgentMessage, CredentialKind};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::state::{SharedSyncState, SyncState};
use super::transport::{DeliveryTransport, TransportError};
use crate::clients::Clients;
use crate::context::with_store;

/// Why a sync attempt failed. None of these change the queue.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The queue store could not be read or updated.
    #[error(transparent)]
    Storage(#[from] sw_core::Error),

    /// No application supplied the endpoint or token.
    #[error("delivery credentials unavailable")]
    CredentialsUnavailable,

    /// The request failed, timed out, or was not confirmed.
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),

    /// The endpoint answered with something other than the expected JSON.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<TransportError> for SyncError {
    fn from(err: TransportError) -> Self {
        SyncError::DeliveryFailed(err.to_string())
    }
}

/// Result of a sync attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Nothing was queued. No credentials were requested.
    Empty,
    /// This many operations were delivered and removed.
    Delivered(usize),
}

/// Endpoint and token obtained from an application for one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryCredentials {
    pub endpoint: String,
    pub token: String,
}

/// Drives sync attempts against the queue.
pub struct SyncManager<T, C> {
    store: QueueStore,
    transport: T,
    clients: C,
    delivery_timeout: Duration,
    state: Arc<SharedSyncState>,
}

impl<T: DeliveryTransport, C: Clients> SyncManager<T, C> {
    pub fn new(store: QueueStore, transport: T, clients: C, delivery_timeout: Duration) -> Self {
        SyncManager {
            store,
            transport,
            clients,
            delivery_timeout,
            state: Arc::new(SharedSyncState::new()),
        }
    }

    pub fn state(&self) -> SyncState {
        self.state.get()
    }

    pub fn shared_state(&self) -> Arc<SharedSyncState> {
        Arc::clone(&self.state)
    }

    /// Run one sync attempt. Always leaves the manager idle.
    pub async fn attempt(&self) -> Result<SyncOutcome, SyncError> {
        let result = self.run_attempt().await;
        self.state.set(SyncState::Idle);
        result
    }

    async fn run_attempt(&self) -> Result<SyncOutcome, SyncError> {
        self.state.set(SyncState::Collecting);
        let batch = SyncBatch::new(with_store(&self.store, |s| s.list_all()).await?);
        if batch.is_empty() {
            return Ok(SyncOutcome::Empty);
        }

        self.state.set(SyncState::Delivering);
        let credentials = self
            .acquire_credentials()
            .await
            .ok_or(SyncError::CredentialsUnavailable)?;

        let body = batch
            .to_request(&credentials.token)
            .to_json()
            .map_err(|e| SyncError::DeliveryFailed(format!("failed to encode batch: {e}")))?;

        tracing::debug!(operations = batch.len(), "delivering batch");
        let delivery = self.transport.deliver(credentials.endpoint, body);
        let text = tokio::time::timeout(self.delivery_timeout, delivery)
            .await
            .map_err(|_| {
                SyncError::DeliveryFailed(format!(
                    "no response within {}ms",
                    self.delivery_timeout.as_millis()
                ))
            })??;

        let response = DeliveryResponse::from_json(&text)
            .map_err(|e| SyncError::MalformedResponse(e.to_string()))?;
        if !response.is_success() {
            return Err(SyncError::DeliveryFailed(
                "endpoint did not confirm success".to_string(),
            ));
        }

        self.state.set(SyncState::Reconciling);
        let ids = batch.ids();
        let removed = with_store(&self.store, move |s| s.delete_by_ids(&ids)).await?;
        let delivered = batch.len();
        let notified = self.clients.broadcast(AgentMessage::sync_complete(delivered));
        tracing::info!(delivered, removed, notified, "offline data synced");

        Ok(SyncOutcome::Delivered(delivered))
    }

    /// Endpoint first, then token. Stops at the first missing value.
    async fn acquire_credentials(&self) -> Option<DeliveryCredentials> {
        let endpoint = self
            .clients
            .request_credential(CredentialKind::Endpoint)
            .await?;
        let token = self.clients.request_credential(CredentialKind::Token).await?;
        Some(DeliveryCredentials { endpoint, token })
    }
}

/// What caused a sync trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// The connectivity monitor saw the network come back.
    Reconnected,
    /// An application reported `ONLINE`.
    Online,
    /// An application sent `REQUEST_SYNC`.
    Requested,
    /// An operation was just saved.
    Saved,
}

/// Result of [`SyncHandle::trigger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// An attempt will run for this trigger.
    Queued,
    /// An attempt is already queued; this trigger folds into it.
    Coalesced,
    /// The worker is gone.
    Stopped,
}

/// Cloneable handle for triggering the sync worker.
#[derive(Clone)]
pub struct SyncHandle {
    tx: mpsc::Sender<TriggerReason>,
    state: Arc<SharedSyncState>,
}

impl SyncHandle {
    pub fn trigger(&self, reason: TriggerReason) -> TriggerOutcome {
        match self.tx.try_send(reason) {
            Ok(()) => {
                tracing::debug!(?reason, "sync queued");
                TriggerOutcome::Queued
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::trace!(?reason, "sync already queued");
                TriggerOutcome::Coalesced
            }
            Err(mpsc::error::TrySendError::Closed(_)) => TriggerOutcome::Stopped,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state.get()
    }
}

#[cfg(test)]
impl SyncHandle {
    /// Handle with no worker behind it. Triggers land on the returned receiver.
    pub(crate) fn detached() -> (Self, mpsc::Receiver<TriggerReason>) {
        let (tx, rx) = mpsc::channel(1);
        let handle = SyncHandle {
            tx,
            state: Arc::new(SharedSyncState::new()),
        };
        (handle, rx)
    }
}

/// Start the sync worker.
///
/// The worker runs one attempt per received trigger, one at a time. It exits
/// once every [`SyncHandle`] is dropped.
pub fn spawn<T, C>(manager: SyncManager<T, C>) -> (SyncHandle, JoinHandle<()>)
where
    T: DeliveryTransport + 'static,
    C: Clients + 'static,
{
    // Depth one: at most one attempt waits behind the running one.
    let (tx, rx) = mpsc::channel(1);
    let handle = SyncHandle {
        tx,
        state: manager.shared_state(),
    };
    let task = tokio::spawn(run_worker(manager, rx));
    (handle, task)
}

async fn run_worker<T, C>(manager: SyncManager<T, C>, mut rx: mpsc::Receiver<TriggerReason>)
where
    T: DeliveryTransport,
    C: Clients,
{
    while let Some(reason) = rx.recv().await {
        match manager.attempt().await {
            Ok(SyncOutcome::Empty) => tracing::debug!(?reason, "nothing to sync"),
            Ok(SyncOutcome::Delivered(count)) => {
                tracing::debug!(?reason, count, "sync attempt delivered")
            }
            Err(SyncError::CredentialsUnavailable) => {
                tracing::debug!(?reason, "sync skipped: credentials unavailable")
            }
            Err(e) => tracing::warn!(?reason, "sync attempt failed: {}", e),
        }
    }
    tracing::debug!("sync worker stopped");
}
