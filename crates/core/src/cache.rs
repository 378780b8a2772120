// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Asset cache for the interception layer.
//!
//! Responses are stored per cache name, keyed by request identity
//! (see [`request_key`]). Changing the cache name and deleting the old one
//! is how a new asset version replaces the previous one.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::error::{Error, Result};

/// Build the cache key for a request.
///
/// The method is upper-cased so `get` and `GET` map to the same entry.
pub fn request_key(method: &str, url: &str) -> String {
    format!("{} {}", method.to_ascii_uppercase(), url)
}

/// A stored copy of a response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CachedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, in their original order.
    pub headers: Vec<(String, String)>,
    /// Raw response body.
    pub body: Vec<u8>,
    /// When the copy was stored (epoch milliseconds).
    pub stored_at: i64,
}

impl CachedResponse {
    /// Creates a response stamped with the current time.
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        CachedResponse {
            status,
            headers,
            body,
            stored_at: Utc::now().timestamp_millis(),
        }
    }
}

/// Persistent response cache.
#[derive(Clone)]
pub struct AssetCache {
    db: Database,
}

impl AssetCache {
    /// Build a cache over an already-open database.
    pub fn new(db: Database) -> Self {
        AssetCache { db }
    }

    /// Open an in-memory cache (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Ok(AssetCache {
            db: Database::open_in_memory()?,
        })
    }

    /// Store a response, replacing any previous entry for the same key.
    pub fn put(&self, cache_name: &str, key: &str, response: &CachedResponse) -> Result<()> {
        let headers = serde_json::to_string(&response.headers)?;
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO assets
                 (cache_name, request_key, status, headers, body, stored_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    cache_name,
                    key,
                    response.status,
                    headers,
                    response.body,
                    response.stored_at
                ],
            )?;
            Ok(())
        })
    }

    /// Find a stored response.
    pub fn lookup(&self, cache_name: &str, key: &str) -> Result<Option<CachedResponse>> {
        let row = self.db.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT status, headers, body, stored_at FROM assets
                     WHERE cache_name = ?1 AND request_key = ?2",
                    params![cache_name, key],
                    |row| {
                        Ok((
                            row.get::<_, u16>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, Vec<u8>>(2)?,
                            row.get::<_, i64>(3)?,
                        ))
                    },
                )
                .optional()?)
        })?;

        match row {
            None => Ok(None),
            Some((status, headers, body, stored_at)) => {
                let headers = serde_json::from_str(&headers).map_err(|_| {
                    Error::CorruptedData(format!("invalid headers for cached '{key}'"))
                })?;
                Ok(Some(CachedResponse {
                    status,
                    headers,
                    body,
                    stored_at,
                }))
            }
        }
    }

    /// Names of all caches that hold at least one entry.
    pub fn cache_names(&self) -> Result<Vec<String>> {
        self.db.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT DISTINCT cache_name FROM assets ORDER BY cache_name")?;
            let names = stmt
                .query_map([], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(names)
        })
    }

    /// Delete every entry under a cache name. Returns the number removed.
    pub fn delete_cache(&self, cache_name: &str) -> Result<usize> {
        self.db.with_conn(|conn| {
            Ok(conn.execute("DELETE FROM assets WHERE cache_name = ?1", [cache_name])?)
        })
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
