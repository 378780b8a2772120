// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for batch delivery.
//!
//! Provides a trait-based transport layer that enables:
//! - Real HTTP delivery for production
//! - Mock transports for unit testing

use std::future::Future;
use std::pin::Pin;

use reqwest::header::CONTENT_TYPE;
use url::Url;

/// Content type of a delivery body.
pub const DELIVERY_CONTENT_TYPE: &str = "text/plain;charset=UTF-8";

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The endpoint could not be reached.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The endpoint answered with a non-2xx status.
    #[error("endpoint returned status {0}")]
    Status(u16),

    /// The response body could not be read.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// The endpoint credential is not a usable URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Delivers one serialized batch and returns the response text.
pub trait DeliveryTransport: Send + Sync {
    fn deliver(
        &self,
        endpoint: String,
        body: String,
    ) -> Pin<Box<dyn Future<Output = TransportResult<String>> + Send + '_>>;
}

/// HTTP transport implementation using reqwest.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("stowd/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client))
    }

    /// Share an existing client (connection pool) with the transport.
    pub fn with_client(client: reqwest::Client) -> Self {
        HttpTransport { client }
    }
}

fn parse_endpoint(endpoint: &str) -> TransportResult<Url> {
    let url = Url::parse(endpoint)
        .map_err(|e| TransportError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(TransportError::InvalidEndpoint(format!(
            "unsupported scheme '{other}'"
        ))),
    }
}

impl DeliveryTransport for HttpTransport {
    fn deliver(
        &self,
        endpoint: String,
        body: String,
    ) -> Pin<Box<dyn Future<Output = TransportResult<String>> + Send + '_>> {
        Box::pin(async move {
            let url = parse_endpoint(&endpoint)?;

            let response = self
                .client
                .post(url)
                .header(CONTENT_TYPE, DELIVERY_CONTENT_TYPE)
                .body(body)
                .send()
                .await
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(TransportError::Status(status.as_u16()));
            }

            response
                .text()
                .await
                .map_err(|e| TransportError::ReceiveFailed(e.to_string()))
        })
    }
}
