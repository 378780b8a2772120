// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the agent.
//!
//! Variable name constants are generated by `build.rs` into [`names`].

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod names {
    include!(concat!(env!("OUT_DIR"), "/env_names.rs"));
}

/// Returns the value of `STOWAWAY_STATE_DIR` if set.
pub fn state_dir() -> Option<PathBuf> {
    std::env::var(names::STOWAWAY_STATE_DIR)
        .ok()
        .map(PathBuf::from)
}

/// Returns the value of `XDG_STATE_HOME` if set.
pub fn xdg_state_home() -> Option<PathBuf> {
    std::env::var(names::XDG_STATE_HOME).ok().map(PathBuf::from)
}

/// Resolve the default state directory.
///
/// Order: `STOWAWAY_STATE_DIR`, `$XDG_STATE_HOME/stowaway`,
/// `~/.local/state/stowaway`, then a relative fallback.
pub fn default_state_dir() -> PathBuf {
    if let Some(dir) = state_dir() {
        return dir;
    }
    if let Some(dir) = xdg_state_home() {
        return dir.join("stowaway");
    }
    dirs::home_dir()
        .map(|h| h.join(".local/state/stowaway"))
        .unwrap_or_else(|| PathBuf::from(".local/state/stowaway"))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
