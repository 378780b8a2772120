// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending operations queued while the application is offline.
//!
//! The payload is opaque to the agent: it is stored and delivered exactly as
//! the application supplied it.

use serde::{Deserialize, Serialize};

/// Identifier assigned by the store at insert time.
///
/// Identifiers increase monotonically and are never reused.
pub type OperationId = i64;

/// A user-originated write awaiting delivery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingOperation {
    /// Store-assigned identifier.
    pub id: OperationId,
    /// Application-defined payload.
    pub payload: serde_json::Value,
    /// Insertion time in epoch milliseconds.
    pub timestamp: i64,
}

impl PendingOperation {
    /// Creates a record from its stored parts.
    pub fn new(id: OperationId, payload: serde_json::Value, timestamp: i64) -> Self {
        PendingOperation {
            id,
            payload,
            timestamp,
        }
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;
