// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use super::*;
use serde_json::json;

#[tokio::test(flavor = "current_thread")]
async fn with_store_runs_queue_operations() {
    let store = QueueStore::open_in_memory().unwrap();

    let payload = json!({"action": "create"});
    let op = with_store(&store, move |s| s.enqueue(&payload)).await.unwrap();
    let count = with_store(&store, |s| s.count()).await.unwrap();

    assert_eq!(count, 1);
    assert_eq!(store.list_all().unwrap()[0].id, op.id);
}

#[tokio::test]
async fn with_store_propagates_storage_errors() {
    let store = QueueStore::open_in_memory().unwrap();

    let result: sw_core::Result<()> = with_store(&store, |_| {
        Err(sw_core::Error::CorruptedData("payload column".to_string()))
    })
    .await;

    assert!(matches!(result, Err(sw_core::Error::CorruptedData(_))));
}

#[tokio::test]
async fn with_store_reports_a_panicked_operation() {
    let store = QueueStore::open_in_memory().unwrap();

    let result: sw_core::Result<usize> =
        with_store(&store, |_| -> sw_core::Result<usize> { panic!("operation panicked") }).await;

    assert!(matches!(result, Err(sw_core::Error::Io(_))));
}
