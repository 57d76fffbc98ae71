//! Resilient image-understanding client.
//!
//! Tries the primary model, then each fallback, strictly one after another.
//! Only rate limits (HTTP 429) and transport failures move on to the next
//! candidate; any other error status ends the loop immediately.

use super::extract::{error_message, error_message_or_body, extract_canonical_text};
use super::openrouter::OpenRouterTransport;
use super::outcome::{
    FailureKind, InferenceAttempt, InferenceFailure, InferenceOutcome, InferenceSuccess,
};
use super::request::InferenceRequest;
use super::transport::ChatTransport;
use crate::config::OpenRouterConfig;
use crate::error::InputError;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Client that walks the candidate list of an `InferenceRequest`.
///
/// Holds no per-request state, so one client can serve concurrent calls.
#[derive(Clone)]
pub struct ResilientClient {
    transport: Arc<dyn ChatTransport>,
}

impl ResilientClient {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self { transport }
    }

    /// Client over the OpenRouter transport described by `config`.
    pub fn from_config(config: &OpenRouterConfig) -> Result<Self, InputError> {
        Ok(Self::new(Arc::new(OpenRouterTransport::from_config(
            config,
        )?)))
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    /// Run the request against each candidate until one answers 2xx or a
    /// terminal failure occurs.
    pub async fn invoke(&self, request: &InferenceRequest) -> InferenceOutcome {
        let candidates = request.candidates();
        let last_index = candidates.len().saturating_sub(1);
        let started = Instant::now();
        let mut attempts: Vec<InferenceAttempt> = Vec::with_capacity(candidates.len());

        for (index, model) in candidates.iter().enumerate() {
            let is_last = index == last_index;
            tracing::debug!(
                "Sending request via {} with model {model} ({}/{})",
                self.transport.name(),
                index + 1,
                candidates.len()
            );

            let attempt_started = Instant::now();
            let result = self.transport.send(model, request).await;
            let duration_ms = attempt_started.elapsed().as_millis() as u64;

            let response = match result {
                Ok(response) => response,
                Err(e) => {
                    attempts.push(InferenceAttempt {
                        model_id: model.to_string(),
                        http_status: None,
                        raw_body: Value::Null,
                        duration_ms,
                    });
                    if !is_last {
                        tracing::warn!("Error with model {model}: {e}. Trying next model...");
                        continue;
                    }
                    return InferenceOutcome::Failure(InferenceFailure {
                        kind: FailureKind::TransportError,
                        message: e.to_string(),
                        attempts,
                        elapsed_ms: started.elapsed().as_millis() as u64,
                    });
                }
            };

            let attempt = InferenceAttempt {
                model_id: model.to_string(),
                http_status: Some(response.status),
                raw_body: response.body.clone(),
                duration_ms,
            };

            if response.is_success() {
                attempts.push(attempt);
                let elapsed_ms = started.elapsed().as_millis() as u64;
                tracing::info!("Model {model} answered in {elapsed_ms}ms");
                return InferenceOutcome::Success(InferenceSuccess {
                    model_id: model.to_string(),
                    text: extract_canonical_text(&response.body),
                    raw_body: response.body,
                    attempts,
                    elapsed_ms,
                });
            }

            if response.is_rate_limited() {
                attempts.push(attempt);
                if !is_last {
                    tracing::warn!("Model {model} is rate-limited. Trying next model...");
                    continue;
                }
                let last_error = error_message(&response.body)
                    .unwrap_or_else(|| "Rate limit exceeded".to_string());
                return InferenceOutcome::Failure(InferenceFailure {
                    kind: FailureKind::AllModelsRateLimited,
                    message: format!(
                        "All models rate-limited. Last error: {last_error}. Tried models: {}",
                        candidates.join(", ")
                    ),
                    attempts,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                });
            }

            let message = error_message_or_body(&response.body, response.status);
            tracing::debug!("Model {model} failed with HTTP {}: {message}", response.status);
            return InferenceOutcome::Failure(InferenceFailure {
                kind: FailureKind::ProviderError,
                message,
                attempts: vec![attempt],
                elapsed_ms: started.elapsed().as_millis() as u64,
            });
        }

        // `candidates()` always holds the primary model, so the loop returns.
        InferenceOutcome::Failure(InferenceFailure {
            kind: FailureKind::ProviderError,
            message: "No candidate models to try".to_string(),
            attempts,
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }
}
