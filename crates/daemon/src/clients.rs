// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Registry of connected application instances.
//!
//! Each socket connection registers an outbound channel here. The registry
//! broadcasts completion notices to every instance and runs credential
//! round-trips against the most recently connected one, correlating
//! `CREDENTIAL_REPLY` messages by request id.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use sw_ipc::{AgentMessage, CredentialKind};
use tokio::sync::{mpsc, oneshot};

/// Identifier assigned to a connection when it registers.
pub type ClientId = u64;

/// What the sync manager needs from connected applications.
pub trait Clients: Send + Sync {
    /// Ask an application for a credential.
    ///
    /// Resolves to `None` when no application can answer, the answer is
    /// null or empty, or the round-trip times out.
    fn request_credential(
        &self,
        kind: CredentialKind,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + '_>>;

    /// Send a message to every connected application. Returns how many received it.
    fn broadcast(&self, msg: AgentMessage) -> usize;
}

struct PendingCredential {
    client: ClientId,
    reply: oneshot::Sender<Option<String>>,
}

#[derive(Default)]
struct RegistryState {
    /// Connected clients in connection order.
    clients: Vec<(ClientId, mpsc::UnboundedSender<AgentMessage>)>,
    pending: HashMap<u64, PendingCredential>,
}

struct Inner {
    state: Mutex<RegistryState>,
    next_client: AtomicU64,
    next_request: AtomicU64,
    credential_timeout: Duration,
}

/// Shared handle to the client registry.
#[derive(Clone)]
pub struct ClientRegistry {
    inner: Arc<Inner>,
}

impl ClientRegistry {
    pub fn new(credential_timeout: Duration) -> Self {
        ClientRegistry {
            inner: Arc::new(Inner {
                state: Mutex::new(RegistryState::default()),
                next_client: AtomicU64::new(1),
                next_request: AtomicU64::new(1),
                credential_timeout,
            }),
        }
    }

    // A panic while holding the lock leaves the maps consistent, so keep going.
    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new connection. Messages for it arrive on the returned receiver.
    pub fn register(&self) -> (ClientId, mpsc::UnboundedReceiver<AgentMessage>) {
        let id = self.inner.next_client.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().clients.push((id, tx));
        tracing::debug!(client = id, "client registered");
        (id, rx)
    }

    /// Remove a connection. Credential requests it still owes resolve as unavailable.
    pub fn unregister(&self, id: ClientId) {
        let mut state = self.lock();
        state.clients.retain(|(client, _)| *client != id);
        // Dropping the reply senders wakes the waiting requesters with an error.
        state.pending.retain(|_, pending| pending.client != id);
        tracing::debug!(client = id, "client unregistered");
    }

    /// Number of connected clients.
    pub fn len(&self) -> usize {
        self.lock().clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Send a message to one client. Returns false if it is gone.
    pub fn send_to(&self, id: ClientId, msg: AgentMessage) -> bool {
        let state = self.lock();
        state
            .clients
            .iter()
            .find(|(client, _)| *client == id)
            .is_some_and(|(_, tx)| tx.send(msg).is_ok())
    }

    /// Deliver a credential reply from `client`.
    ///
    /// Returns false when no matching request is outstanding, e.g. it already
    /// timed out or was addressed to another client.
    pub fn complete(&self, client: ClientId, request_id: u64, value: Option<String>) -> bool {
        let mut state = self.lock();
        match state.pending.get(&request_id) {
            Some(pending) if pending.client == client => {}
            _ => return false,
        }
        match state.pending.remove(&request_id) {
            Some(pending) => pending.reply.send(value).is_ok(),
            None => false,
        }
    }

    /// Send a message to every client. Returns how many received it.
    pub fn broadcast(&self, msg: AgentMessage) -> usize {
        let state = self.lock();
        state
            .clients
            .iter()
            .filter(|(_, tx)| tx.send(msg.clone()).is_ok())
            .count()
    }

    /// Run one credential round-trip against the most recently connected client.
    pub async fn request_credential(&self, kind: CredentialKind) -> Option<String> {
        let request_id = self.inner.next_request.fetch_add(1, Ordering::Relaxed);
        let (reply_tx, reply_rx) = oneshot::channel();

        {
            let mut state = self.lock();
            let Some((client, tx)) = state.clients.last().map(|(id, tx)| (*id, tx.clone())) else {
                tracing::debug!(credential = %kind, "no connected client to ask");
                return None;
            };
            let request = AgentMessage::CredentialRequest {
                request_id,
                credential: kind,
            };
            if tx.send(request).is_err() {
                tracing::debug!(client, credential = %kind, "client went away before request");
                return None;
            }
            state.pending.insert(
                request_id,
                PendingCredential {
                    client,
                    reply: reply_tx,
                },
            );
        }

        let value = match tokio::time::timeout(self.inner.credential_timeout, reply_rx).await {
            Ok(Ok(value)) => value,
            Ok(Err(_)) => {
                tracing::debug!(request_id, credential = %kind, "client disconnected before replying");
                None
            }
            Err(_) => {
                self.lock().pending.remove(&request_id);
                tracing::debug!(request_id, credential = %kind, "credential request timed out");
                None
            }
        };

        value.filter(|v| !v.is_empty())
    }

    #[cfg(test)]
    fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }
}

impl Clients for ClientRegistry {
    fn request_credential(
        &self,
        kind: CredentialKind,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + '_>> {
        Box::pin(ClientRegistry::request_credential(self, kind))
    }

    fn broadcast(&self, msg: AgentMessage) -> usize {
        ClientRegistry::broadcast(self, msg)
    }
}

#[cfg(test)]
#[path = "clients_tests.rs"]
mod tests;
