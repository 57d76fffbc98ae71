//! The seam between the fallback loop and the wire.
//!
//! A transport performs exactly one HTTP call for one model id and reports
//! what came back. It never retries; retry policy lives in the client.

use super::request::InferenceRequest;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// HTTP status and parsed body of one call.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    /// Parsed JSON, or the raw text wrapped as a JSON string
    pub body: Value,
}

impl TransportResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }
}

/// The call never produced an HTTP response.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Trait that all image-understanding transports implement.
///
/// Uses `async_trait` because the client holds an `Arc<dyn ChatTransport>`.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Transport name for logging (e.g., "openrouter").
    fn name(&self) -> &str;

    /// Send `request` to `model` and return whatever status came back.
    async fn send(
        &self,
        model: &str,
        request: &InferenceRequest,
    ) -> Result<TransportResponse, TransportError>;
}

/// Parse a response body, keeping non-JSON text as a JSON string.
pub fn parse_body(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
