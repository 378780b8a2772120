// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Agent lifecycle files: lock, PID, socket, log and database paths.
//!
//! All of them live in the state directory (`~/.local/state/stowaway/` by default).

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Socket filename within the state directory.
const SOCKET_NAME: &str = "stowd.sock";
/// PID filename within the state directory.
const PID_NAME: &str = "stowd.pid";
/// Lock filename for single instance guarantee.
const LOCK_NAME: &str = "stowd.lock";
/// Log filename within the state directory.
const LOG_NAME: &str = "stowd.log";
/// Queue and cache database filename.
const DB_NAME: &str = "stowaway.db";

pub fn socket_path(state_dir: &Path) -> PathBuf {
    state_dir.join(SOCKET_NAME)
}

pub fn pid_path(state_dir: &Path) -> PathBuf {
    state_dir.join(PID_NAME)
}

pub fn lock_path(state_dir: &Path) -> PathBuf {
    state_dir.join(LOCK_NAME)
}

pub fn log_path(state_dir: &Path) -> PathBuf {
    state_dir.join(LOG_NAME)
}

pub fn db_path(state_dir: &Path) -> PathBuf {
    state_dir.join(DB_NAME)
}

/// Take the exclusive instance lock. The lock is held until the file is dropped.
pub fn acquire_lock(lock_path: &Path) -> Result<fs::File> {
    use fs2::FileExt;

    if let Some(parent) = lock_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(lock_path)?;
    file.try_lock_exclusive()
        .map_err(|_| Error::AlreadyRunning)?;
    Ok(file)
}

pub fn write_pid_file(pid_path: &Path) -> Result<()> {
    fs::write(pid_path, format!("{}", std::process::id()))?;
    Ok(())
}

/// Remove the PID file and socket. Missing files are ignored.
pub fn cleanup(pid_path: &Path, socket_path: &Path) {
    let _ = fs::remove_file(pid_path);
    let _ = fs::remove_file(socket_path);
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
