// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use serde_json::json;

#[test]
fn serializes_with_flat_fields() {
    let op = PendingOperation::new(7, json!({"action": "create", "id": 1}), 1_700_000_000_000);
    let value = serde_json::to_value(&op).unwrap();

    assert_eq!(
        value,
        json!({
            "id": 7,
            "payload": {"action": "create", "id": 1},
            "timestamp": 1_700_000_000_000_i64
        })
    );
}

#[test]
fn payload_is_kept_verbatim() {
    let payload = json!({"nested": {"list": [1, "two", null]}, "flag": true});
    let op = PendingOperation::new(1, payload.clone(), 0);
    let text = serde_json::to_string(&op).unwrap();
    let back: PendingOperation = serde_json::from_str(&text).unwrap();
    assert_eq!(back.payload, payload);
}
