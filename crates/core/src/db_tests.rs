// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use super::*;
use crate::error::Error;
use tempfile::tempdir;

fn table_exists(db: &Database, name: &str) -> bool {
    db.with_conn(|conn| {
        Ok(conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )?)
    })
    .unwrap()
}

#[test]
fn open_in_memory_creates_tables() {
    let db = Database::open_in_memory().unwrap();
    assert!(table_exists(&db, "pending_operations"));
    assert!(table_exists(&db, "assets"));
}

#[test]
fn open_creates_missing_parent_directory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("state").join("stowaway.db");

    let db = Database::open(&path).unwrap();
    assert!(path.exists());
    assert!(table_exists(&db, "pending_operations"));
}

#[test]
fn reopen_is_idempotent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stowaway.db");

    {
        let db = Database::open(&path).unwrap();
        db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO pending_operations (payload, timestamp) VALUES ('{}', 1)",
                [],
            )?;
            Ok(())
        })
        .unwrap();
    }

    let db = Database::open(&path).unwrap();
    let count: i64 = db
        .with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM pending_operations", [], |row| {
                row.get(0)
            })?)
        })
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn open_fails_when_path_is_a_directory() {
    let dir = tempdir().unwrap();
    let result = Database::open(dir.path());
    assert!(matches!(result, Err(Error::StorageUnavailable(_))));
}

#[test]
fn open_fails_when_parent_is_a_regular_file() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let result = Database::open(&blocker.join("sub").join("stowaway.db"));
    assert!(matches!(
        result,
        Err(Error::StorageUnavailable(StorageError::Directory(_)))
    ));
}

#[test]
fn poisoned_lock_is_storage_unavailable() {
    let db = Database::open_in_memory().unwrap();
    let shared = db.clone();
    let _ = std::thread::spawn(move || {
        let _guard = shared.conn.lock().unwrap();
        panic!("poison the connection lock");
    })
    .join();

    let result = db.with_conn(|_| Ok(()));
    assert!(matches!(
        result,
        Err(Error::StorageUnavailable(StorageError::LockPoisoned))
    ));
}
