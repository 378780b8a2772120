// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sw_ipc::{AgentMessage, CredentialKind};
use tokio::sync::Semaphore;

use super::transport::{DeliveryTransport, TransportError, TransportResult};
use crate::clients::Clients;

pub const ENDPOINT: &str = "https://api.test/exec";
pub const TOKEN: &str = "secret-token";

/// One recorded delivery.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub endpoint: String,
    pub body: serde_json::Value,
}

#[derive(Default)]
struct TransportState {
    responses: VecDeque<TransportResult<String>>,
    deliveries: Vec<Delivery>,
    in_flight: usize,
    max_in_flight: usize,
}

/// Mock transport that records deliveries and replays scripted responses.
///
/// Without scripted responses every delivery answers `{"success":true}`.
#[derive(Clone)]
pub struct MockTransport {
    state: Arc<Mutex<TransportState>>,
    gate: Option<Arc<Semaphore>>,
}

impl MockTransport {
    pub fn new() -> Self {
        MockTransport {
            state: Arc::new(Mutex::new(TransportState::default())),
            gate: None,
        }
    }

    /// A transport whose deliveries block until [`MockTransport::release`].
    pub fn gated() -> Self {
        MockTransport {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::new()
        }
    }

    pub fn respond(&self, response: TransportResult<String>) {
        self.state.lock().unwrap().responses.push_back(response);
    }

    pub fn respond_text(&self, text: &str) {
        self.respond(Ok(text.to_string()));
    }

    /// Let `n` blocked deliveries finish.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.state.lock().unwrap().deliveries.clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.state.lock().unwrap().max_in_flight
    }

    /// Wait until at least `n` deliveries have started.
    pub async fn wait_for_deliveries(&self, n: usize) {
        for _ in 0..500 {
            if self.deliveries().len() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("timed out waiting for {n} deliveries");
    }
}

impl DeliveryTransport for MockTransport {
    fn deliver(
        &self,
        endpoint: String,
        body: String,
    ) -> Pin<Box<dyn Future<Output = TransportResult<String>> + Send + '_>> {
        Box::pin(async move {
            {
                let mut state = self.state.lock().unwrap();
                state.deliveries.push(Delivery {
                    endpoint,
                    body: serde_json::from_str(&body).unwrap(),
                });
                state.in_flight += 1;
                state.max_in_flight = state.max_in_flight.max(state.in_flight);
            }

            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }

            let mut state = self.state.lock().unwrap();
            state.in_flight -= 1;
            state
                .responses
                .pop_front()
                .unwrap_or_else(|| Ok(r#"{"success":true}"#.to_string()))
        })
    }
}

#[derive(Default)]
struct ClientsState {
    endpoint: Option<String>,
    token: Option<String>,
    requests: Vec<CredentialKind>,
    broadcasts: Vec<AgentMessage>,
}

/// Mock application side: answers credential requests from fixed values.
#[derive(Clone, Default)]
pub struct MockClients {
    state: Arc<Mutex<ClientsState>>,
}

impl MockClients {
    pub fn with_credentials(endpoint: Option<&str>, token: Option<&str>) -> Self {
        let clients = MockClients::default();
        {
            let mut state = clients.state.lock().unwrap();
            state.endpoint = endpoint.map(str::to_string);
            state.token = token.map(str::to_string);
        }
        clients
    }

    pub fn valid() -> Self {
        Self::with_credentials(Some(ENDPOINT), Some(TOKEN))
    }

    /// No application connected.
    pub fn unavailable() -> Self {
        Self::with_credentials(None, None)
    }

    pub fn requests(&self) -> Vec<CredentialKind> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn broadcasts(&self) -> Vec<AgentMessage> {
        self.state.lock().unwrap().broadcasts.clone()
    }
}

impl Clients for MockClients {
    fn request_credential(
        &self,
        kind: CredentialKind,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + '_>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.requests.push(kind);
            match kind {
                CredentialKind::Endpoint => state.endpoint.clone(),
                CredentialKind::Token => state.token.clone(),
            }
        })
    }

    fn broadcast(&self, msg: AgentMessage) -> usize {
        self.state.lock().unwrap().broadcasts.push(msg);
        1
    }
}

/// Convenience for scripting transport failures.
pub fn connection_refused() -> TransportResult<String> {
    Err(TransportError::ConnectionFailed("connection refused".to_string()))
}
