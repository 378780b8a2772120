// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use super::*;
use std::time::Instant;

fn registry() -> ClientRegistry {
    ClientRegistry::new(Duration::from_secs(5))
}

/// Wait for the next credential request on a client channel.
async fn next_request(rx: &mut mpsc::UnboundedReceiver<AgentMessage>) -> (u64, CredentialKind) {
    match rx.recv().await.unwrap() {
        AgentMessage::CredentialRequest {
            request_id,
            credential,
        } => (request_id, credential),
        other => panic!("expected credential request, got {other:?}"),
    }
}

#[tokio::test]
async fn no_client_is_unavailable_immediately() {
    let registry = registry();
    let start = Instant::now();

    assert_eq!(registry.request_credential(CredentialKind::Token).await, None);
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn reply_resolves_request() {
    let registry = registry();
    let (client, mut rx) = registry.register();

    let requester = registry.clone();
    let task =
        tokio::spawn(async move { requester.request_credential(CredentialKind::Endpoint).await });

    let (request_id, kind) = next_request(&mut rx).await;
    assert_eq!(kind, CredentialKind::Endpoint);
    assert!(registry.complete(client, request_id, Some("https://api.test/sync".to_string())));

    assert_eq!(
        task.await.unwrap(),
        Some("https://api.test/sync".to_string())
    );
    assert_eq!(registry.pending_len(), 0);
}

#[tokio::test]
async fn null_and_empty_replies_are_unavailable() {
    let registry = registry();
    let (client, mut rx) = registry.register();

    for reply in [None, Some(String::new())] {
        let requester = registry.clone();
        let task =
            tokio::spawn(async move { requester.request_credential(CredentialKind::Token).await });
        let (request_id, _) = next_request(&mut rx).await;
        registry.complete(client, request_id, reply);
        assert_eq!(task.await.unwrap(), None);
    }
}

#[tokio::test(start_paused = true)]
async fn unanswered_request_times_out() {
    let registry = ClientRegistry::new(Duration::from_millis(200));
    let (client, mut rx) = registry.register();

    let requester = registry.clone();
    let task =
        tokio::spawn(async move { requester.request_credential(CredentialKind::Token).await });
    let (request_id, _) = next_request(&mut rx).await;

    assert_eq!(task.await.unwrap(), None);
    assert_eq!(registry.pending_len(), 0);
    // A late reply finds nothing to complete
    assert!(!registry.complete(client, request_id, Some("late".to_string())));
}

#[tokio::test]
async fn disconnect_resolves_outstanding_request() {
    let registry = registry();
    let (client, mut rx) = registry.register();

    let requester = registry.clone();
    let task =
        tokio::spawn(async move { requester.request_credential(CredentialKind::Token).await });
    next_request(&mut rx).await;

    registry.unregister(client);
    assert_eq!(task.await.unwrap(), None);
    assert!(registry.is_empty());
}

#[tokio::test]
async fn request_goes_to_most_recent_client() {
    let registry = registry();
    let (_older, mut older_rx) = registry.register();
    let (newer, mut newer_rx) = registry.register();

    let requester = registry.clone();
    let task =
        tokio::spawn(async move { requester.request_credential(CredentialKind::Token).await });

    let (request_id, _) = next_request(&mut newer_rx).await;
    assert!(older_rx.try_recv().is_err());

    registry.complete(newer, request_id, Some("secret".to_string()));
    assert_eq!(task.await.unwrap(), Some("secret".to_string()));
}

#[tokio::test]
async fn reply_from_other_client_is_ignored() {
    let registry = registry();
    let (older, _older_rx) = registry.register();
    let (newer, mut newer_rx) = registry.register();

    let requester = registry.clone();
    let task =
        tokio::spawn(async move { requester.request_credential(CredentialKind::Token).await });
    let (request_id, _) = next_request(&mut newer_rx).await;

    assert!(!registry.complete(older, request_id, Some("wrong".to_string())));
    assert!(registry.complete(newer, request_id, Some("right".to_string())));
    assert_eq!(task.await.unwrap(), Some("right".to_string()));
}

#[test]
fn broadcast_reaches_every_live_client() {
    let registry = registry();
    let (_a, mut a_rx) = registry.register();
    let (_b, mut b_rx) = registry.register();
    let (_c, c_rx) = registry.register();
    drop(c_rx);

    assert_eq!(registry.broadcast(AgentMessage::sync_complete(3)), 2);
    assert_eq!(a_rx.try_recv().unwrap(), AgentMessage::sync_complete(3));
    assert_eq!(b_rx.try_recv().unwrap(), AgentMessage::sync_complete(3));
}

#[test]
fn send_to_targets_one_client() {
    let registry = registry();
    let (a, mut a_rx) = registry.register();
    let (_b, mut b_rx) = registry.register();

    assert!(registry.send_to(a, AgentMessage::sync_complete(1)));
    assert!(a_rx.try_recv().is_ok());
    assert!(b_rx.try_recv().is_err());

    registry.unregister(a);
    assert!(!registry.send_to(a, AgentMessage::sync_complete(1)));
    assert_eq!(registry.len(), 1);
}
