//! TwelveLabs Pegasus on Amazon Bedrock, called through the Bedrock Runtime
//! `InvokeModel` REST endpoint with an API-key bearer token.

use super::{read_video_base64, VideoUnderstanding};
use crate::config::{resolve_env_var, setting_or_env, BedrockConfig};
use crate::error::{InferenceError, InputError, SpotlightError};
use crate::inference::{error_message, parse_body};
use crate::output::attach_timing;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::time::{Duration, Instant};

/// Video-understanding client for Bedrock-hosted Pegasus models.
pub struct BedrockVideoClient {
    api_key: String,
    model_id: String,
    endpoint: String,
    timeout: Duration,
    max_payload_mb: u64,
    client: reqwest::Client,
}

impl BedrockVideoClient {
    pub fn new(region: &str, model_id: &str, api_key: &str) -> Self {
        Self::with_endpoint(
            &format!("https://bedrock-runtime.{region}.amazonaws.com"),
            model_id,
            api_key,
        )
    }

    /// Create with a custom runtime endpoint.
    pub fn with_endpoint(endpoint: &str, model_id: &str, api_key: &str) -> Self {
        let defaults = BedrockConfig::default();
        Self {
            api_key: api_key.to_string(),
            model_id: model_id.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(defaults.timeout_ms),
            max_payload_mb: defaults.max_payload_mb,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build from config plus optional CLI overrides.
    ///
    /// Region and model id fall back to `AWS_REGION` and `TWELVELABS_MODEL_ID`;
    /// missing both is an input error.
    pub fn from_config(
        config: &BedrockConfig,
        region: Option<&str>,
        model_id: Option<&str>,
    ) -> Result<Self, InputError> {
        let region = setting_or_env(region.or(Some(config.region.as_str())), "AWS_REGION")
            .ok_or(InputError::MissingConfig {
                setting: "AWS region",
                env_var: "AWS_REGION",
            })?;
        let model_id = setting_or_env(
            model_id.or(Some(config.model_id.as_str())),
            "TWELVELABS_MODEL_ID",
        )
        .ok_or(InputError::MissingConfig {
            setting: "TwelveLabs model ID",
            env_var: "TWELVELABS_MODEL_ID",
        })?;
        let api_key = resolve_env_var(&config.api_key).ok_or(InputError::MissingConfig {
            setting: "Bedrock API key",
            env_var: "AWS_BEARER_TOKEN_BEDROCK",
        })?;

        let client = match &config.endpoint {
            Some(endpoint) => Self::with_endpoint(endpoint, &model_id, &api_key),
            None => Self::new(&region, &model_id, &api_key),
        };
        Ok(Self {
            timeout: Duration::from_millis(config.timeout_ms),
            max_payload_mb: config.max_payload_mb,
            ..client
        })
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    fn invoke_url(&self) -> String {
        format!("{}/model/{}/invoke", self.endpoint, self.model_id)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PegasusRequest<'a> {
    input_prompt: &'a str,
    media_source: MediaSource,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MediaSource {
    base64_string: String,
}

#[async_trait]
impl VideoUnderstanding for BedrockVideoClient {
    fn name(&self) -> &str {
        "bedrock"
    }

    async fn analyze(&self, video: &Path, prompt: &str) -> Result<Value, SpotlightError> {
        let body = PegasusRequest {
            input_prompt: prompt,
            media_source: MediaSource {
                base64_string: read_video_base64(video, self.max_payload_mb).await?,
            },
        };

        let start = Instant::now();
        let resp = self
            .client
            .post(self.invoke_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| InferenceError::Transport(format!("Bedrock request failed: {e}")))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| {
            InferenceError::Transport(format!("Failed to read Bedrock response: {e}"))
        })?;
        let duration = start.elapsed();

        if !status.is_success() {
            let body = parse_body(&text);
            let message = error_message(&body)
                .unwrap_or_else(|| format!("Bedrock HTTP {status}: {text}"));
            return Err(InferenceError::Provider {
                message,
                status_code: Some(status.as_u16()),
            }
            .into());
        }

        let mut body: Value = serde_json::from_str(&text).map_err(|e| {
            InferenceError::Decode(format!("Bedrock returned non-JSON body: {e}"))
        })?;
        attach_timing(&mut body, duration);
        tracing::info!(
            "Video API call completed in {:.2} seconds",
            duration.as_secs_f64()
        );
        Ok(body)
    }
}
