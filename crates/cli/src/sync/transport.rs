// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for the batch sync endpoint.
//!
//! Provides a trait-based transport layer that enables:
//! - Real HTTP submission for production
//! - Mock transports for unit testing

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use pk_core::{SyncRequest, SyncResponse};

/// Path of the batch sync endpoint, relative to the remote base URL.
pub const SYNC_PATH: &str = "/api/transactions/sync";

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The remote answered with a non-success status.
    #[error("remote returned HTTP {code}: {body}")]
    Status { code: u16, body: String },

    /// No response within the request timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The response body was not a valid sync response.
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Submits a batch to the remote and returns its per-operation results.
///
/// Every error is treated as a whole-batch failure and retried by the
/// engine; a transport must not partially apply a response.
pub trait Transport: Send + Sync {
    fn submit<'a>(
        &'a self,
        request: &'a SyncRequest,
    ) -> Pin<Box<dyn Future<Output = TransportResult<SyncResponse>> + Send + 'a>>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn submit<'a>(
        &'a self,
        request: &'a SyncRequest,
    ) -> Pin<Box<dyn Future<Output = TransportResult<SyncResponse>> + Send + 'a>> {
        (**self).submit(request)
    }
}

/// HTTP transport posting JSON batches with reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Creates a transport for the remote at `base_url`.
    pub fn new(base_url: &str) -> TransportResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(HttpTransport {
            client,
            endpoint: endpoint_url(base_url),
        })
    }

    /// The full URL batches are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Joins the base URL and the sync path without doubling slashes.
pub fn endpoint_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), SYNC_PATH)
}

impl Transport for HttpTransport {
    fn submit<'a>(
        &'a self,
        request: &'a SyncRequest,
    ) -> Pin<Box<dyn Future<Output = TransportResult<SyncResponse>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .client
                .post(&self.endpoint)
                .json(request)
                .send()
                .await
                .map_err(|e| TransportError::Network(e.to_string()))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| TransportError::Network(e.to_string()))?;

            if !status.is_success() {
                return Err(TransportError::Status {
                    code: status.as_u16(),
                    body,
                });
            }

            SyncResponse::from_json(&body).map_err(|e| TransportError::Decode(e.to_string()))
        })
    }
}
