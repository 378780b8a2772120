// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync batches and the delivery wire format.
//!
//! A [`SyncBatch`] is a snapshot of the queue taken when a sync attempt
//! starts. It is never persisted. Its identifiers are what reconciliation
//! deletes, regardless of what was enqueued while the batch was in flight.
//!
//! Wire format of one delivery:
//!
//! ```text
//! POST <endpoint>   Content-Type: text/plain
//! {"action":"syncOfflineData","token":"...","offlineData":[{"id":1,...}]}
//!
//! 200 OK
//! {"success":true, ...}
//! ```

use serde::{Deserialize, Serialize};

use crate::operation::{OperationId, PendingOperation};

/// Action discriminator carried in every delivery body.
pub const SYNC_ACTION: &str = "syncOfflineData";

/// In-memory snapshot of the pending operations for one sync attempt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncBatch {
    operations: Vec<PendingOperation>,
}

impl SyncBatch {
    /// Wrap a freshly collected list of operations.
    pub fn new(operations: Vec<PendingOperation>) -> Self {
        SyncBatch { operations }
    }

    /// Operations in the batch.
    pub fn operations(&self) -> &[PendingOperation] {
        &self.operations
    }

    /// Identifiers of every operation in the batch.
    pub fn ids(&self) -> Vec<OperationId> {
        self.operations.iter().map(|op| op.id).collect()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Build the delivery body for this batch.
    pub fn to_request<'a>(&'a self, token: &'a str) -> DeliveryRequest<'a> {
        DeliveryRequest {
            action: SYNC_ACTION,
            token,
            offline_data: &self.operations,
        }
    }
}

/// Body of a delivery POST.
#[derive(Debug, Serialize)]
pub struct DeliveryRequest<'a> {
    pub action: &'a str,
    pub token: &'a str,
    #[serde(rename = "offlineData")]
    pub offline_data: &'a [PendingOperation],
}

impl DeliveryRequest<'_> {
    /// Serializes the request to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Structured reply from the remote endpoint.
///
/// Only an explicit `"success": true` counts as confirmation. Any other
/// fields are kept for logging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DeliveryResponse {
    /// Deserializes a response body.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Whether the endpoint confirmed receipt.
    pub fn is_success(&self) -> bool {
        self.success
    }
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
