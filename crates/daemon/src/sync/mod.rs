// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery of queued operations to the remote endpoint.
//!
//! # Architecture
//!
//! ```text
//! triggers ──► [depth-1 channel] ──► worker ──► SyncManager::attempt
//!                                                  │
//!            ┌─────────────┬───────────────────────┼──────────────┐
//!            ▼             ▼                       ▼              ▼
//!       QueueStore     Clients              DeliveryTransport  Clients
//!       (collect)   (endpoint, token)         (POST batch)    (broadcast)
//! ```
//!
//! An attempt moves `Idle → Collecting → Delivering → Reconciling → Idle`.
//! Anything short of an explicit `"success": true` leaves the queue untouched.

mod manager;
mod state;
mod transport;

pub use manager::{
    spawn, DeliveryCredentials, SyncError, SyncHandle, SyncManager, SyncOutcome, TriggerOutcome,
    TriggerReason,
};
pub use state::{SharedSyncState, SyncState};
pub use transport::{DeliveryTransport, HttpTransport, TransportError, TransportResult};

#[cfg(test)]
pub(crate) mod test_helpers;
