// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! stowd: offline-support agent.
//!
//! Applications hand the agent actions they could not deliver while offline.
//! The agent keeps them in a durable queue, delivers them as one batch when
//! connectivity returns, and serves cached assets through an intercepting
//! proxy while the network is down.

pub mod agent;
pub mod clients;
pub mod config;
pub mod connectivity;
pub mod context;
pub mod env;
pub mod error;
pub mod intercept;
pub mod lifecycle;
pub mod server;
pub mod sync;

pub use config::AgentConfig;
pub use context::AgentContext;
pub use error::{Error, Result};
