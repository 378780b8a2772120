// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable queue of pending operations.
//!
//! Every enqueue is committed before the call returns. Deletion is by
//! identifier only, so a caller can remove exactly the records it delivered
//! without touching anything enqueued in the meantime.

use chrono::Utc;
use rusqlite::{params, params_from_iter};
use std::path::Path;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::operation::{OperationId, PendingOperation};

/// Parse a stored JSON payload, returning a rusqlite error on failure.
fn parse_payload(value: &str) -> std::result::Result<serde_json::Value, rusqlite::Error> {
    serde_json::from_str(value).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid JSON '{value}' in column 'payload'"
            ))),
        )
    })
}

/// Durable store for [`PendingOperation`] records.
#[derive(Clone)]
pub struct QueueStore {
    db: Database,
}

impl QueueStore {
    /// Open (or create) the queue in the database file at `path`.
    ///
    /// Opening an existing store leaves its records untouched.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(QueueStore {
            db: Database::open(path)?,
        })
    }

    /// Build a queue over an already-open database.
    pub fn new(db: Database) -> Self {
        QueueStore { db }
    }

    /// Open an in-memory queue (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Ok(QueueStore {
            db: Database::open_in_memory()?,
        })
    }

    /// Persist a new operation and return the stored record.
    pub fn enqueue(&self, payload: &serde_json::Value) -> Result<PendingOperation> {
        let text = serde_json::to_string(payload)?;
        let timestamp = Utc::now().timestamp_millis();

        let id = self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO pending_operations (payload, timestamp) VALUES (?1, ?2)",
                params![text, timestamp],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        Ok(PendingOperation::new(id, payload.clone(), timestamp))
    }

    /// Number of pending operations.
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self.db.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM pending_operations", [], |row| {
                row.get(0)
            })?)
        })?;
        usize::try_from(count)
            .map_err(|_| Error::CorruptedData(format!("negative row count {count}")))
    }

    /// Every pending operation, in insertion order.
    pub fn list_all(&self) -> Result<Vec<PendingOperation>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, payload, timestamp FROM pending_operations ORDER BY id",
            )?;
            let rows = stmt.query_map([], |row| {
                let payload: String = row.get(1)?;
                Ok(PendingOperation {
                    id: row.get(0)?,
                    payload: parse_payload(&payload)?,
                    timestamp: row.get(2)?,
                })
            })?;
            Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
        })
    }

    /// Remove exactly the given identifiers.
    ///
    /// Identifiers that are not present are ignored. Returns the number of
    /// records actually removed.
    pub fn delete_by_ids(&self, ids: &[OperationId]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        self.db.with_conn(|conn| {
            let tx = conn.transaction()?;
            let mut removed = 0;
            // SQLite caps bound parameters per statement
            for chunk in ids.chunks(500) {
                let placeholders = vec!["?"; chunk.len()].join(", ");
                let sql = format!("DELETE FROM pending_operations WHERE id IN ({placeholders})");
                removed += tx.execute(&sql, params_from_iter(chunk.iter()))?;
            }
            tx.commit()?;
            Ok(removed)
        })
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
