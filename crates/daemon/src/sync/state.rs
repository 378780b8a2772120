// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Observable sync state.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Phase of the sync manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No attempt in flight.
    Idle,
    /// Reading the queue snapshot.
    Collecting,
    /// Acquiring credentials and waiting on the endpoint.
    Delivering,
    /// Removing the delivered operations.
    Reconciling,
}

impl SyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::Idle => "idle",
            SyncState::Collecting => "collecting",
            SyncState::Delivering => "delivering",
            SyncState::Reconciling => "reconciling",
        }
    }

    fn to_u8(self) -> u8 {
        match self {
            SyncState::Idle => 0,
            SyncState::Collecting => 1,
            SyncState::Delivering => 2,
            SyncState::Reconciling => 3,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => SyncState::Collecting,
            2 => SyncState::Delivering,
            3 => SyncState::Reconciling,
            _ => SyncState::Idle,
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sync state visible to both the worker and IPC handlers.
///
/// Uses an atomic for lock-free reads.
#[derive(Debug)]
pub struct SharedSyncState {
    state: AtomicU8,
}

impl SharedSyncState {
    /// Create a new shared state initialized to idle.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(SyncState::Idle.to_u8()),
        }
    }

    pub fn get(&self) -> SyncState {
        SyncState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn set(&self, state: SyncState) {
        self.state.store(state.to_u8(), Ordering::Release);
    }
}

impl Default for SharedSyncState {
    fn default() -> Self {
        Self::new()
    }
}
