// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the agent.

use thiserror::Error;

/// Errors surfaced while starting or running the agent.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration file is unreadable or invalid.
    #[error("config error: {0}")]
    Config(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Queue store or asset cache failure.
    #[error(transparent)]
    Core(#[from] sw_core::Error),

    /// HTTP client construction or request failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Another agent already holds the state directory lock.
    #[error("another stowd instance is already running")]
    AlreadyRunning,
}

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
