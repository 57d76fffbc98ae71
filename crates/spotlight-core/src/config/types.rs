//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Models tried, in order, when the requested image model is rate-limited.
pub const DEFAULT_FALLBACK_MODELS: &[&str] = &[
    "google/gemini-3-flash-preview",
    "google/gemini-2.5-flash",
    "google/gemini-2.5-pro",
    "google/gemini-1.5-flash",
    "google/gemini-1.5-pro",
];

/// Default image-understanding model on OpenRouter.
pub const DEFAULT_IMAGE_MODEL: &str = "google/gemini-2.0-flash-exp:free";

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory the prompt files are looked up in
    pub prompt_dir: PathBuf,

    /// File holding the "locate the main character" prompt
    pub locate_prompt_file: String,

    /// File holding the "describe the video" prompt
    pub describe_prompt_file: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            prompt_dir: PathBuf::from("."),
            locate_prompt_file: "locateMain.txt".to_string(),
            describe_prompt_file: "describe.txt".to_string(),
        }
    }
}

/// OpenRouter image-understanding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenRouterConfig {
    /// Chat Completions endpoint
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Primary model id
    pub model: String,

    /// Ordered fallback model ids, tried only on HTTP 429
    pub fallback_models: Vec<String>,

    /// Per-attempt timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            api_key: "${OPENROUTER_API_KEY}".to_string(),
            model: DEFAULT_IMAGE_MODEL.to_string(),
            fallback_models: DEFAULT_FALLBACK_MODELS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            timeout_ms: 60_000,
        }
    }
}

/// Bedrock video-understanding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BedrockConfig {
    /// AWS region; empty means "read AWS_REGION"
    pub region: String,

    /// Pegasus model id; empty means "read TWELVELABS_MODEL_ID"
    pub model_id: String,

    /// Bedrock API key used as a bearer token (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Runtime endpoint override, mostly for testing
    pub endpoint: Option<String>,

    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,

    /// Videos above this size get a warning; inline base64 is capped by the service
    pub max_payload_mb: u64,
}

impl Default for BedrockConfig {
    fn default() -> Self {
        Self {
            region: String::new(),
            model_id: String::new(),
            api_key: "${AWS_BEARER_TOKEN_BEDROCK}".to_string(),
            endpoint: None,
            timeout_ms: 300_000,
            max_payload_mb: 36,
        }
    }
}

/// Hosted chat-assistant platform settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// API base, without a trailing slash
    pub endpoint: String,

    /// API key sent as `X-API-Key` (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// LLM provider the platform routes messages to
    pub llm_provider: String,

    /// Model name on that provider
    pub model_name: String,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,

    /// Pause between submitting a tool result and asking for the summary
    pub settle_ms: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://app.backboard.io/api".to_string(),
            api_key: "${BACKBOARD_API_KEY}".to_string(),
            llm_provider: "google".to_string(),
            model_name: "gemini-2.5-flash".to_string(),
            timeout_ms: 120_000,
            settle_ms: 1_000,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print the result document
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
