//! Error types for the Spotlight annotation pipeline.
//!
//! Errors are organized by concern so that the CLI can report a clear message
//! and map every handled category to the same exit code. Extraction misses
//! (no text, no coordinates) are deliberately absent here: they are `None`
//! values, not errors.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Spotlight operations.
#[derive(Error, Debug)]
pub enum SpotlightError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Bad caller input: missing files, missing settings, bad payloads
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// Remote model failures
    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    /// Frame extraction failures
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Input errors are reported immediately and never retried.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Video file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Path is not a file: {0}")]
    NotAFile(PathBuf),

    /// A required setting is absent from both flags/config and the environment
    #[error("{setting} not provided and {env_var} environment variable not set")]
    MissingConfig {
        setting: &'static str,
        env_var: &'static str,
    },

    #[error("Neither a locate-main nor a describe prompt was provided, and no prompt files were found")]
    NoPrompts,

    #[error("Invalid base64 image data: {0}")]
    InvalidPayload(String),

    #[error("Prompt text must not be empty")]
    EmptyPrompt,

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidToolArguments(String),
}

/// Terminal failures of a remote model call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// Non-rate-limit API failure; never retried across models
    #[error("Provider error{}: {message}", status_suffix(.status_code))]
    Provider {
        message: String,
        status_code: Option<u16>,
    },

    /// Every candidate model answered HTTP 429
    #[error("{message}")]
    AllModelsRateLimited { message: String, models: Vec<String> },

    /// Connection failure or timeout on the last candidate
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered 2xx but the body was unusable
    #[error("Failed to decode provider response: {0}")]
    Decode(String),
}

fn status_suffix(status_code: &Option<u16>) -> String {
    status_code
        .map(|code| format!(" (HTTP {code})"))
        .unwrap_or_default()
}

/// First-frame extraction errors.
#[derive(Error, Debug)]
pub enum MediaError {
    /// ffmpeg could not be started or exited non-zero
    #[error("ffmpeg failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("Could not read first frame from video: {0}")]
    NoFrame(PathBuf),

    #[error("Failed to decode frame from {path}: {message}")]
    Decode { path: PathBuf, message: String },
}

impl MediaError {
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }
}

/// Convenience type alias for Spotlight results.
pub type Result<T> = std::result::Result<T, SpotlightError>;
