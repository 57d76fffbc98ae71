//! Function-tool definitions for chat assistants, and dispatch of the calls
//! they make back into the annotation pipeline.

use crate::annotate::{AnnotateOptions, Annotator};
use crate::config::{Config, DEFAULT_IMAGE_MODEL};
use crate::error::{InputError, Result, SpotlightError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;

/// The tools an assistant may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// Annotate a video and return the report as produced
    ProcessVideo,
    /// Same pipeline; JSON text inside the report is expanded
    GetAllStats,
}

impl ToolKind {
    pub const ALL: [ToolKind; 2] = [ToolKind::ProcessVideo, ToolKind::GetAllStats];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::ProcessVideo => "process_video",
            ToolKind::GetAllStats => "get_all_stats",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    fn description(self) -> &'static str {
        match self {
            ToolKind::ProcessVideo => {
                "Processes a video file to identify the main character, extract their X and Y \
                 coordinates, and optionally describe the video content. Uses AWS Bedrock \
                 TwelveLabs Pegasus model for video analysis and Gemini for coordinate extraction."
            }
            ToolKind::GetAllStats => {
                "Gets all statistics and information about a video file. Uses AWS Bedrock \
                 TwelveLabs Pegasus model for video analysis and Google Gemini for processing. \
                 Returns comprehensive video statistics."
            }
        }
    }

    /// OpenAI-style function-tool definition.
    pub fn definition(self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name(),
                "description": self.description(),
                "parameters": parameters_schema(),
            }
        })
    }
}

fn parameters_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "video_path": {
                "type": "string",
                "description": "Path to the video file to process (required). Must be a valid file path on the server."
            },
            "locate_main_prompt": {
                "type": "string",
                "description": "Optional custom prompt text for locating the main character. If not provided, uses default from locateMain.txt file."
            },
            "describe_prompt": {
                "type": "string",
                "description": "Optional custom prompt text for describing the video content. If not provided, uses default from describe.txt file."
            },
            "region": {
                "type": "string",
                "description": "AWS region for Bedrock (e.g., 'us-east-1'). If not provided, uses AWS_REGION environment variable."
            },
            "twelvelabs_model_id": {
                "type": "string",
                "description": "TwelveLabs Pegasus model ID (e.g., 'us.twelvelabs.pegasus-1-2-v1:0'). If not provided, uses TWELVELABS_MODEL_ID environment variable."
            },
            "gemini_model_id": {
                "type": "string",
                "description": format!("Gemini model ID for image analysis. Default: '{DEFAULT_IMAGE_MODEL}'."),
                "default": DEFAULT_IMAGE_MODEL
            },
            "extract_coordinates": {
                "type": "boolean",
                "description": "Whether to extract X, Y coordinates of the main character. Default: true.",
                "default": true
            },
            "raw_output": {
                "type": "boolean",
                "description": "Whether to return raw API responses instead of processed results. Default: false.",
                "default": false
            }
        },
        "required": ["video_path"]
    })
}

/// Definitions of every tool, ready to register with an assistant.
pub fn definitions() -> Vec<Value> {
    ToolKind::ALL.into_iter().map(ToolKind::definition).collect()
}

/// A tool call as issued by the assistant.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: Option<String>,
    pub name: String,
    /// JSON-encoded argument object
    pub arguments: String,
}

impl ToolCall {
    /// Read `{"id": .., "function": {"name": .., "arguments": ..}}`.
    ///
    /// `arguments` may be a JSON string or an inline object.
    pub fn from_value(value: &Value) -> Result<Self> {
        let function = value.get("function").ok_or_else(|| {
            InputError::InvalidToolArguments("tool call has no function".to_string())
        })?;
        let name = function
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| InputError::InvalidToolArguments("tool call has no name".to_string()))?;
        let arguments = match function.get("arguments") {
            Some(Value::String(s)) => s.clone(),
            Some(other) if !other.is_null() => other.to_string(),
            _ => "{}".to_string(),
        };

        Ok(Self {
            id: value.get("id").and_then(Value::as_str).map(String::from),
            name: name.to_string(),
            arguments,
        })
    }

    pub fn parse_arguments(&self) -> Result<ProcessVideoArgs> {
        serde_json::from_str(&self.arguments)
            .map_err(|e| InputError::InvalidToolArguments(e.to_string()).into())
    }
}

/// Arguments shared by both tools.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessVideoArgs {
    pub video_path: String,
    #[serde(default)]
    pub locate_main_prompt: Option<String>,
    #[serde(default)]
    pub describe_prompt: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub twelvelabs_model_id: Option<String>,
    #[serde(default)]
    pub gemini_model_id: Option<String>,
    #[serde(default = "default_true")]
    pub extract_coordinates: bool,
    #[serde(default)]
    pub raw_output: bool,
}

fn default_true() -> bool {
    true
}

impl ProcessVideoArgs {
    pub fn options(&self) -> AnnotateOptions {
        AnnotateOptions {
            locate_prompt: self.locate_main_prompt.clone(),
            describe_prompt: self.describe_prompt.clone(),
            image_model: self.gemini_model_id.clone(),
            extract_coordinates: self.extract_coordinates,
            raw_output: self.raw_output,
        }
    }
}

/// Run a tool call and return its result document.
pub async fn dispatch(annotator: &Annotator, call: &ToolCall) -> Result<Value> {
    let kind = ToolKind::from_name(&call.name)
        .ok_or_else(|| InputError::UnknownTool(call.name.clone()))?;
    let args = call.parse_arguments()?;
    tracing::info!("Executing tool {} on {}", kind.name(), args.video_path);

    let annotator =
        annotator.retarget_video(args.region.as_deref(), args.twelvelabs_model_id.as_deref())?;
    let report = annotator
        .annotate(Path::new(&args.video_path), &args.options())
        .await?;

    let report = match kind {
        ToolKind::ProcessVideo => report,
        ToolKind::GetAllStats => report.with_parsed_text(),
    };
    Ok(serde_json::to_value(report)?)
}

/// Something that can run the calls an assistant issues.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, call: &ToolCall) -> Result<Value>;
}

#[async_trait]
impl ToolExecutor for Annotator {
    async fn execute(&self, call: &ToolCall) -> Result<Value> {
        dispatch(self, call).await
    }
}

/// Builds the production pipeline per call, aimed at the region and model
/// the call names.
///
/// Unlike a prebuilt `Annotator`, this works when the environment carries no
/// region or model id and every call supplies them.
pub struct ConfiguredTools {
    config: Config,
}

impl ConfiguredTools {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ToolExecutor for ConfiguredTools {
    async fn execute(&self, call: &ToolCall) -> Result<Value> {
        let args = call.parse_arguments()?;
        let annotator = Annotator::from_config(
            &self.config,
            args.region.as_deref(),
            args.twelvelabs_model_id.as_deref(),
        )?;
        dispatch(&annotator, call).await
    }
}

/// Render a dispatch result as the tool message content.
///
/// Failures are reported to the assistant as `{"error": "..."}`.
pub fn result_content(result: &std::result::Result<Value, SpotlightError>) -> String {
    match result {
        Ok(value) => value.to_string(),
        Err(e) => json!({ "error": e.to_string() }).to_string(),
    }
}
