//! Attempt records and terminal outcomes of the fallback loop.

use crate::error::InferenceError;
use serde::Serialize;
use serde_json::Value;

/// Why a request ended without a usable response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    /// Non-429 error status; the loop stops at the first one
    ProviderError,
    /// Every candidate answered 429
    AllModelsRateLimited,
    /// Connection failure or timeout on the last candidate
    TransportError,
}

/// One call against one model id.
#[derive(Debug, Clone, Serialize)]
pub struct InferenceAttempt {
    pub model_id: String,
    /// `None` when the call failed below HTTP (connect error, timeout)
    pub http_status: Option<u16>,
    pub raw_body: Value,
    pub duration_ms: u64,
}

/// A model answered with a success status.
#[derive(Debug, Clone)]
pub struct InferenceSuccess {
    /// The candidate that answered
    pub model_id: String,
    /// Canonical text, `None` when no known response shape matched
    pub text: Option<String>,
    pub raw_body: Value,
    /// Every attempt made, the successful one last
    pub attempts: Vec<InferenceAttempt>,
    /// Wall-clock time across all attempts
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone)]
pub struct InferenceFailure {
    pub kind: FailureKind,
    pub message: String,
    pub attempts: Vec<InferenceAttempt>,
    pub elapsed_ms: u64,
}

/// Terminal result of `ResilientClient::invoke`. Never ambiguous: either a
/// model answered 2xx, or the loop stopped on a terminal failure.
#[derive(Debug, Clone)]
pub enum InferenceOutcome {
    Success(InferenceSuccess),
    Failure(InferenceFailure),
}

impl InferenceOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn attempts(&self) -> &[InferenceAttempt] {
        match self {
            Self::Success(s) => &s.attempts,
            Self::Failure(f) => &f.attempts,
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        match self {
            Self::Success(s) => s.elapsed_ms,
            Self::Failure(f) => f.elapsed_ms,
        }
    }

    /// Convert into a `Result` so callers can use `?`.
    pub fn into_result(self) -> Result<InferenceSuccess, InferenceError> {
        match self {
            Self::Success(success) => Ok(success),
            Self::Failure(failure) => Err(match failure.kind {
                FailureKind::ProviderError => InferenceError::Provider {
                    status_code: failure.attempts.last().and_then(|a| a.http_status),
                    message: failure.message,
                },
                FailureKind::AllModelsRateLimited => InferenceError::AllModelsRateLimited {
                    models: failure
                        .attempts
                        .iter()
                        .map(|a| a.model_id.clone())
                        .collect(),
                    message: failure.message,
                },
                FailureKind::TransportError => InferenceError::Transport(failure.message),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(model: &str, status: Option<u16>) -> InferenceAttempt {
        InferenceAttempt {
            model_id: model.to_string(),
            http_status: status,
            raw_body: Value::Null,
            duration_ms: 1,
        }
    }

    #[test]
    fn test_provider_failure_keeps_status() {
        let outcome = InferenceOutcome::Failure(InferenceFailure {
            kind: FailureKind::ProviderError,
            message: "bad request".to_string(),
            attempts: vec![attempt("a", Some(400))],
            elapsed_ms: 3,
        });
        assert!(!outcome.is_success());
        assert_eq!(
            outcome.into_result().unwrap_err(),
            InferenceError::Provider {
                message: "bad request".to_string(),
                status_code: Some(400),
            }
        );
    }

    #[test]
    fn test_rate_limited_failure_lists_models() {
        let outcome = InferenceOutcome::Failure(InferenceFailure {
            kind: FailureKind::AllModelsRateLimited,
            message: "all limited".to_string(),
            attempts: vec![attempt("a", Some(429)), attempt("b", Some(429))],
            elapsed_ms: 3,
        });
        match outcome.into_result().unwrap_err() {
            InferenceError::AllModelsRateLimited { models, .. } => {
                assert_eq!(models, vec!["a", "b"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_success_into_result() {
        let outcome = InferenceOutcome::Success(InferenceSuccess {
            model_id: "a".to_string(),
            text: Some("hi".to_string()),
            raw_body: Value::Null,
            attempts: vec![attempt("a", Some(200))],
            elapsed_ms: 5,
        });
        assert_eq!(outcome.attempts().len(), 1);
        assert_eq!(outcome.elapsed_ms(), 5);
        assert_eq!(outcome.into_result().unwrap().text.as_deref(), Some("hi"));
    }
}
