// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared IPC protocol for application-agent communication.
//!
//! This crate defines the message types and framing protocol used between
//! application instances and the `stowd` agent. Connections are long-lived:
//! the application sends [`ClientMessage`]s, and the agent answers on the
//! same connection, asks for credentials, and broadcasts completion notices
//! as [`AgentMessage`]s. Messages are serialized as JSON with
//! length-prefixed framing.

use std::fmt;

use serde::{Deserialize, Serialize};
use sw_core::OperationId;

/// Which delivery credential the agent is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    /// The remote endpoint URL.
    Endpoint,
    /// The auth token sent in the delivery body.
    Token,
}

impl CredentialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKind::Endpoint => "endpoint",
            CredentialKind::Token => "token",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Messages sent from an application instance to the agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// Version handshake.
    Hello { version: String },

    /// Persist an action taken while offline.
    ///
    /// The agent replies with `SAVED` or `ERROR`.
    SaveOffline {
        payload: serde_json::Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<u64>,
    },

    /// Ask how many operations are waiting.
    ///
    /// The agent replies with `OFFLINE_COUNT` on this connection.
    GetOfflineCount {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<u64>,
    },

    /// Explicitly request a sync attempt.
    RequestSync,

    /// The application observed that connectivity came back.
    Online,

    /// Answer to a `CREDENTIAL_REQUEST`.
    CredentialReply {
        request_id: u64,
        /// `None` when the application has no value to give.
        #[serde(default)]
        value: Option<String>,
    },
}

/// Messages sent from the agent to an application instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentMessage {
    /// Version handshake reply.
    Hello { version: String },

    /// An offline action was committed to the queue.
    Saved {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<u64>,
        id: OperationId,
    },

    /// Reply to `GET_OFFLINE_COUNT`.
    OfflineCount {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<u64>,
        count: usize,
    },

    /// Broadcast after a batch was delivered and removed from the queue.
    SyncComplete { count: usize },

    /// The agent needs a delivery credential from the application.
    CredentialRequest {
        request_id: u64,
        credential: CredentialKind,
    },

    /// A request from this connection failed.
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<u64>,
        message: String,
    },
}

impl ClientMessage {
    /// Creates a SaveOffline message.
    pub fn save_offline(payload: serde_json::Value) -> Self {
        ClientMessage::SaveOffline {
            payload,
            request_id: None,
        }
    }

    /// Creates a GetOfflineCount message.
    pub fn get_offline_count() -> Self {
        ClientMessage::GetOfflineCount { request_id: None }
    }

    /// Creates a CredentialReply message.
    pub fn credential_reply(request_id: u64, value: Option<String>) -> Self {
        ClientMessage::CredentialReply { request_id, value }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl AgentMessage {
    /// Creates a SyncComplete message.
    pub fn sync_complete(count: usize) -> Self {
        AgentMessage::SyncComplete { count }
    }

    /// Creates an Error message.
    pub fn error(request_id: Option<u64>, message: impl Into<String>) -> Self {
        AgentMessage::Error {
            request_id,
            message: message.into(),
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

// ============================================================================
// Message framing
// ============================================================================

/// IPC message framing.
///
/// Messages are framed as:
/// - 4 bytes: message length (big-endian u32)
/// - N bytes: JSON-encoded message
pub mod framing {
    use std::io;

    use serde::de::DeserializeOwned;
    use serde::Serialize;
    use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

    /// Maximum message size (1MB) to prevent malformed messages from causing hangs.
    pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

    /// Write a serializable message to the given writer.
    pub async fn write_message<W, T>(writer: &mut W, message: &T) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
        T: Serialize,
    {
        let json = serde_json::to_vec(message)
            .map_err(|e| io::Error::other(format!("serialize error: {}", e)))?;
        if json.len() > MAX_MESSAGE_SIZE {
            return Err(io::Error::other(format!(
                "message too large: {} bytes (max {})",
                json.len(),
                MAX_MESSAGE_SIZE
            )));
        }
        let len = u32::try_from(json.len()).map_err(|_| io::Error::other("message too large"))?;
        writer.write_all(&len.to_be_bytes()).await?;
        writer.write_all(&json).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Read a deserializable message from the given reader.
    ///
    /// Returns `Ok(None)` when the peer closed the stream before a new frame.
    /// A stream that ends partway through a frame is an `UnexpectedEof` error.
    pub async fn read_message<R, T>(reader: &mut R) -> io::Result<Option<T>>
    where
        R: AsyncRead + Unpin,
        T: DeserializeOwned,
    {
        // EOF is a clean close only before the first byte of the prefix.
        let mut len_buf = [0u8; 4];
        if reader.read(&mut len_buf[..1]).await? == 0 {
            return Ok(None);
        }
        reader.read_exact(&mut len_buf[1..]).await?;
        let len = u32::from_be_bytes(len_buf) as usize;

        if len > MAX_MESSAGE_SIZE {
            return Err(io::Error::other(format!(
                "message too large: {} bytes (max {})",
                len, MAX_MESSAGE_SIZE
            )));
        }

        let mut buf = vec![0u8; len];
        reader.read_exact(&mut buf).await?;

        serde_json::from_slice(&buf)
            .map(Some)
            .map_err(|e| io::Error::other(format!("deserialize error: {}", e)))
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
