//! Port interfaces for dispatch

use std::path::PathBuf;

use async_trait::async_trait;
use sigil_domain::{Headers, RequestParams, Verb};
use thiserror::Error;

/// A fully signed request, ready for any transport.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub verb: Verb,
    pub url: String,
    pub headers: Headers,
    /// Signed envelope. Sent as the query string for GET, as a JSON body
    /// otherwise.
    pub params: RequestParams,
}

/// Raw response as seen by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport-level failure (connect, timeout, TLS, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// HTTP mechanism used by the dispatcher
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return the raw response.
    async fn send(&self, request: &OutboundRequest) -> Result<TransportResponse, TransportError>;
}

/// Destination for failure detail when every transport has failed
///
/// Called inline on the dispatching task, once per exhausted dispatch and
/// never on the success path. Implementations block that executor thread
/// for the duration of the call, so a record must stay a single short
/// append. Anything slower belongs behind a channel.
pub trait DiagnosticsSink: Send + Sync {
    /// Append one line. Returns the file written, or `None` if the write did
    /// not happen. Must never fail the caller.
    fn record(&self, line: &str) -> Option<PathBuf>;
}

/// Sink that drops every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnosticsSink;

impl DiagnosticsSink for NoopDiagnosticsSink {
    fn record(&self, _line: &str) -> Option<PathBuf> {
        None
    }
}
