// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Unix socket server for application connections.
//!
//! Each connection is long-lived. A writer task drains the connection's
//! registry channel (replies, credential requests, broadcasts) while the
//! reader loop dispatches incoming [`ClientMessage`]s.

use std::future::Future;
use std::sync::Arc;

use sw_ipc::{framing, AgentMessage, ClientMessage};
use tokio::net::{UnixListener, UnixStream};

use crate::clients::ClientId;
use crate::context::{with_store, AgentContext};
use crate::sync::TriggerReason;

/// Accept connections until `shutdown` resolves.
pub async fn serve<S>(listener: UnixListener, ctx: Arc<AgentContext>, shutdown: S)
where
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => {
                    tokio::spawn(handle_connection(stream, Arc::clone(&ctx)));
                }
                Err(e) => tracing::warn!("failed to accept connection: {}", e),
            },
            _ = &mut shutdown => {
                tracing::info!("socket server shutting down");
                break;
            }
        }
    }
}

async fn handle_connection(stream: UnixStream, ctx: Arc<AgentContext>) {
    let (client, mut outbound) = ctx.clients.register();
    let (mut reader, mut writer) = stream.into_split();

    let writer_task = tokio::spawn(async move {
        while let Some(msg) = outbound.recv().await {
            if let Err(e) = framing::write_message(&mut writer, &msg).await {
                tracing::debug!(client, "failed to write message: {}", e);
                break;
            }
        }
    });

    loop {
        match framing::read_message::<_, ClientMessage>(&mut reader).await {
            Ok(Some(msg)) => handle_message(&ctx, client, msg).await,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(client, "failed to read message: {}", e);
                ctx.clients
                    .send_to(client, AgentMessage::error(None, format!("invalid message: {e}")));
                break;
            }
        }
    }

    // Dropping the registry's sender lets the writer flush what is queued and exit.
    ctx.clients.unregister(client);
    let _ = writer_task.await;
}

async fn handle_message(ctx: &AgentContext, client: ClientId, msg: ClientMessage) {
    match msg {
        ClientMessage::Hello { version } => {
            tracing::debug!(client, %version, "client hello");
            ctx.clients.send_to(
                client,
                AgentMessage::Hello {
                    version: env!("CARGO_PKG_VERSION").to_string(),
                },
            );
        }
        ClientMessage::SaveOffline {
            payload,
            request_id,
        } => match with_store(&ctx.store, move |s| s.enqueue(&payload)).await {
            Ok(op) => {
                tracing::debug!(client, id = op.id, "saved offline operation");
                ctx.clients
                    .send_to(client, AgentMessage::Saved { request_id, id: op.id });
                if ctx.config.sync_on_save {
                    ctx.sync.trigger(TriggerReason::Saved);
                }
            }
            Err(e) => {
                tracing::warn!(client, "failed to save offline operation: {}", e);
                ctx.clients
                    .send_to(client, AgentMessage::error(request_id, e.to_string()));
            }
        },
        ClientMessage::GetOfflineCount { request_id } => {
            let reply = match with_store(&ctx.store, |s| s.count()).await {
                Ok(count) => AgentMessage::OfflineCount { request_id, count },
                Err(e) => {
                    tracing::warn!(client, "failed to count offline operations: {}", e);
                    AgentMessage::error(request_id, e.to_string())
                }
            };
            ctx.clients.send_to(client, reply);
        }
        ClientMessage::RequestSync => {
            ctx.sync.trigger(TriggerReason::Requested);
        }
        ClientMessage::Online => {
            ctx.sync.trigger(TriggerReason::Online);
        }
        ClientMessage::CredentialReply { request_id, value } => {
            if !ctx.clients.complete(client, request_id, value) {
                tracing::debug!(client, request_id, "no pending credential request");
            }
        }
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
