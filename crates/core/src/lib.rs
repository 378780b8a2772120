// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! sw-core: Shared library for the stowaway offline agent.
//!
//! This crate provides the data model, the durable pending-operation queue,
//! the asset cache store, and the batch wire types used by the `stowd` agent.

pub mod batch;
pub mod cache;
pub mod db;
pub mod error;
pub mod operation;
pub mod store;

pub use batch::{DeliveryRequest, DeliveryResponse, SyncBatch, SYNC_ACTION};
pub use cache::{request_key, AssetCache, CachedResponse};
pub use db::Database;
pub use error::{Error, Result, StorageError};
pub use operation::{OperationId, PendingOperation};
pub use store::QueueStore;
