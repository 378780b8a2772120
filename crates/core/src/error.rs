// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for sw-core operations.

use thiserror::Error;

/// Underlying cause of an [`Error::StorageUnavailable`].
#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("cannot create store directory: {0}")]
    Directory(std::io::Error),

    #[error("connection lock poisoned")]
    LockPoisoned,
}

/// All possible errors that can occur in sw-core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The durable store could not be opened, read, or written.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::StorageUnavailable(StorageError::Sqlite(err))
    }
}

/// A specialized Result type for sw-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
