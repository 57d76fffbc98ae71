//! OpenRouter transport using the OpenAI-compatible Chat Completions API.
//!
//! Sends the prompt and the image (as a data URL) in one user message. On a
//! 2xx answer the body is reshaped into the "messages" layout so the generic
//! text extraction applies.

use super::request::InferenceRequest;
use super::transport::{parse_body, ChatTransport, TransportError, TransportResponse};
use crate::config::{resolve_env_var, OpenRouterConfig};
use crate::error::InputError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

/// OpenRouter Chat Completions transport.
pub struct OpenRouterTransport {
    api_key: String,
    endpoint: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl OpenRouterTransport {
    pub fn new(api_key: &str) -> Self {
        Self::with_endpoint(api_key, "https://openrouter.ai/api/v1/chat/completions")
    }

    /// Create with a custom endpoint (any OpenAI-compatible gateway).
    pub fn with_endpoint(api_key: &str, endpoint: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            endpoint: endpoint.to_string(),
            timeout: Duration::from_secs(60),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build from config, resolving the `${OPENROUTER_API_KEY}` reference.
    pub fn from_config(config: &OpenRouterConfig) -> Result<Self, InputError> {
        let api_key = resolve_env_var(&config.api_key).ok_or(InputError::MissingConfig {
            setting: "OpenRouter API key",
            env_var: "OPENROUTER_API_KEY",
        })?;
        Ok(Self::with_endpoint(&api_key, &config.endpoint)
            .with_timeout(Duration::from_millis(config.timeout_ms)))
    }
}

// --- Request types ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ChatContent>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

fn chat_request<'a>(model: &'a str, request: &InferenceRequest) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![ChatMessage {
            role: "user",
            content: vec![
                ChatContent::Text {
                    text: request.prompt().to_string(),
                },
                ChatContent::ImageUrl {
                    image_url: ImageUrl {
                        url: request.image().data_url(),
                    },
                },
            ],
        }],
    }
}

/// Reshape `choices[0].message.content` into `{"messages": [...]}`.
///
/// Bodies without choices are kept whole under `raw_response`.
pub fn normalize_chat_completion(body: Value) -> Value {
    let content = body
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .map(|choice| {
            choice
                .get("message")
                .and_then(|m| m.get("content"))
                .cloned()
                .unwrap_or_else(|| Value::String(String::new()))
        });

    match content {
        Some(content) => {
            let mut normalized = json!({
                "messages": [{"role": "assistant", "content": content}]
            });
            if let Some(model) = body.get("model") {
                normalized["model"] = model.clone();
            }
            normalized
        }
        None => json!({ "raw_response": body }),
    }
}

#[async_trait]
impl ChatTransport for OpenRouterTransport {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn send(
        &self,
        model: &str,
        request: &InferenceRequest,
    ) -> Result<TransportResponse, TransportError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&chat_request(model, request))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| TransportError(format!("OpenRouter request failed: {e}")))?;

        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| TransportError(format!("Failed to read OpenRouter response: {e}")))?;
        let body = parse_body(&text);

        let body = if (200..300).contains(&status) {
            normalize_chat_completion(body)
        } else {
            body
        };

        Ok(TransportResponse::new(status, body))
    }
}
