//! The annotation pipeline: locate the main character, pin them to pixel
//! coordinates on the first frame, and describe the video.
//!
//! ```text
//! video ─► locateMain (video model) ─► description
//!                                        │
//!            first frame (ffmpeg) ───────┴─► coordinates (image model, fallback)
//! video ─► describe (video model)
//! ```
//!
//! A stage that fails records `{"error": ..}` in its slot and the run goes
//! on. The run only fails when every requested video stage failed.

use crate::config::{BedrockConfig, Config};
use crate::error::{InputError, Result, SpotlightError};
use crate::inference::{
    extract_coordinates, extract_description, InferenceRequest, ResilientClient,
};
use crate::output::attach_timing;
use crate::prompts::{locate_prompt, resolve_prompt};
use crate::video::{
    ensure_video_file, BedrockVideoClient, FfmpegFrameSource, FrameSource, VideoUnderstanding,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Per-run options.
#[derive(Debug, Clone)]
pub struct AnnotateOptions {
    /// Overrides the locate-main prompt file
    pub locate_prompt: Option<String>,
    /// Overrides the describe prompt file
    pub describe_prompt: Option<String>,
    /// Overrides the configured primary image model
    pub image_model: Option<String>,
    pub extract_coordinates: bool,
    /// Store provider bodies instead of extracted text
    pub raw_output: bool,
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self {
            locate_prompt: None,
            describe_prompt: None,
            image_model: None,
            extract_coordinates: true,
            raw_output: false,
        }
    }
}

/// Result of the coordinate stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordinateResult {
    /// Pixel position on the first frame, with that frame's size
    Located {
        x: f64,
        y: f64,
        image_width: u32,
        image_height: u32,
    },
    /// The image model answered but no coordinates could be read
    Unparsed { error: String, raw_response: Value },
    /// The stage failed before producing an answer
    Failed { error: String },
    /// Raw image-model body (raw output mode)
    Raw(Value),
}

/// The annotation document. Stages that did not run are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationReport {
    #[serde(rename = "locateMain", skip_serializing_if = "Option::is_none")]
    pub locate_main: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<CoordinateResult>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub describe: Option<Value>,
}

impl AnnotationReport {
    /// Replace text stages that hold JSON documents with the parsed value.
    ///
    /// Video models often answer with JSON inside a string; consumers of the
    /// stats want the structure.
    pub fn with_parsed_text(mut self) -> Self {
        for stage in [&mut self.locate_main, &mut self.describe] {
            let parsed = match stage.as_ref() {
                Some(Value::String(text)) => serde_json::from_str::<Value>(text).ok(),
                _ => None,
            };
            if let Some(parsed) = parsed.filter(|p| p.is_object() || p.is_array()) {
                *stage = Some(parsed);
            }
        }
        self
    }
}

/// Slot content for a video stage that failed.
fn stage_error(error: &SpotlightError) -> Value {
    json!({ "error": error.to_string() })
}

/// Runs the pipeline over injected collaborators.
#[derive(Clone)]
pub struct Annotator {
    video: Arc<dyn VideoUnderstanding>,
    images: Option<ResilientClient>,
    frames: Arc<dyn FrameSource>,
    locate_prompt_path: PathBuf,
    describe_prompt_path: PathBuf,
    image_model: String,
    fallback_models: Vec<String>,
    bedrock: Option<BedrockConfig>,
}

impl Annotator {
    pub fn new(
        video: Arc<dyn VideoUnderstanding>,
        images: Option<ResilientClient>,
        frames: Arc<dyn FrameSource>,
    ) -> Self {
        let defaults = Config::default();
        Self {
            video,
            images,
            frames,
            locate_prompt_path: defaults.locate_prompt_path(),
            describe_prompt_path: defaults.describe_prompt_path(),
            image_model: defaults.openrouter.model,
            fallback_models: defaults.openrouter.fallback_models,
            bedrock: None,
        }
    }

    /// Build the production pipeline: Bedrock video model, OpenRouter image
    /// model, ffmpeg frames.
    ///
    /// A missing OpenRouter key is not fatal here; the coordinate stage
    /// records it as an error when it runs.
    pub fn from_config(
        config: &Config,
        region: Option<&str>,
        video_model_id: Option<&str>,
    ) -> Result<Self> {
        let video = BedrockVideoClient::from_config(&config.bedrock, region, video_model_id)?;
        let images = match ResilientClient::from_config(&config.openrouter) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!("Coordinate extraction unavailable: {e}");
                None
            }
        };

        Ok(Self {
            locate_prompt_path: config.locate_prompt_path(),
            describe_prompt_path: config.describe_prompt_path(),
            image_model: config.openrouter.model.clone(),
            fallback_models: config.openrouter.fallback_models.clone(),
            bedrock: Some(config.bedrock.clone()),
            ..Self::new(Arc::new(video), images, Arc::new(FfmpegFrameSource))
        })
    }

    pub fn with_prompt_files(mut self, locate: PathBuf, describe: PathBuf) -> Self {
        self.locate_prompt_path = locate;
        self.describe_prompt_path = describe;
        self
    }

    /// Rebuild the video client for a different region or model id.
    ///
    /// Only an annotator built from config can be re-targeted; others are
    /// returned unchanged.
    pub fn retarget_video(&self, region: Option<&str>, model_id: Option<&str>) -> Result<Self> {
        match (&self.bedrock, region.is_some() || model_id.is_some()) {
            (Some(bedrock), true) => {
                let video = BedrockVideoClient::from_config(bedrock, region, model_id)?;
                Ok(Self {
                    video: Arc::new(video),
                    ..self.clone()
                })
            }
            _ => Ok(self.clone()),
        }
    }

    /// Annotate one video.
    pub async fn annotate(&self, video: &Path, options: &AnnotateOptions) -> Result<AnnotationReport> {
        ensure_video_file(video)?;

        let locate = resolve_prompt(options.locate_prompt.as_deref(), &self.locate_prompt_path);
        let describe =
            resolve_prompt(options.describe_prompt.as_deref(), &self.describe_prompt_path);
        if locate.is_none() && describe.is_none() {
            return Err(InputError::NoPrompts.into());
        }

        let mut report = AnnotationReport::default();
        let mut requested = 0;
        let mut failures = Vec::new();

        match locate {
            Some(prompt) => {
                requested += 1;
                tracing::info!("Locating main character with {}", self.video.name());
                match self.video.analyze(video, &prompt).await {
                    Ok(body) => {
                        let description = extract_description(&body);
                        report.locate_main = Some(if options.raw_output {
                            body
                        } else {
                            Value::String(description.clone())
                        });

                        if options.extract_coordinates && !description.trim().is_empty() {
                            report.coordinates =
                                Some(self.coordinates(video, &description, options).await);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("locateMain failed: {e}");
                        report.locate_main = Some(stage_error(&e));
                        failures.push(e);
                    }
                }
            }
            None => tracing::warn!("No locate-main prompt; skipping locateMain"),
        }

        match describe {
            Some(prompt) => {
                requested += 1;
                tracing::info!("Describing video with {}", self.video.name());
                match self.video.analyze(video, &prompt).await {
                    Ok(body) => {
                        report.describe = Some(if options.raw_output {
                            body
                        } else {
                            Value::String(extract_description(&body))
                        });
                    }
                    Err(e) => {
                        tracing::warn!("describe failed: {e}");
                        report.describe = Some(stage_error(&e));
                        failures.push(e);
                    }
                }
            }
            None => tracing::warn!("No describe prompt; skipping describe"),
        }

        if failures.len() == requested {
            if let Some(first) = failures.into_iter().next() {
                return Err(first);
            }
        }

        Ok(report)
    }

    async fn coordinates(
        &self,
        video: &Path,
        description: &str,
        options: &AnnotateOptions,
    ) -> CoordinateResult {
        match self.try_coordinates(video, description, options).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Coordinate extraction failed: {e}");
                CoordinateResult::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn try_coordinates(
        &self,
        video: &Path,
        description: &str,
        options: &AnnotateOptions,
    ) -> std::result::Result<CoordinateResult, SpotlightError> {
        let client = self.images.as_ref().ok_or(InputError::MissingConfig {
            setting: "OpenRouter API key",
            env_var: "OPENROUTER_API_KEY",
        })?;

        let frame = self.frames.first_frame(video).await?;
        let model = options.image_model.as_deref().unwrap_or(&self.image_model);
        let request = InferenceRequest::new(
            frame.to_image_input(),
            locate_prompt(description),
            model,
            &self.fallback_models,
        )?;

        tracing::info!("Locating coordinates on first frame via {}", client.transport_name());
        let success = client.invoke(&request).await.into_result()?;
        tracing::debug!(
            "Coordinates answered by {} after {} attempt(s)",
            success.model_id,
            success.attempts.len()
        );

        let mut body = success.raw_body;
        attach_timing(&mut body, Duration::from_millis(success.elapsed_ms));
        if options.raw_output {
            return Ok(CoordinateResult::Raw(body));
        }

        Ok(
            match success.text.as_deref().and_then(extract_coordinates) {
                Some(coords) => CoordinateResult::Located {
                    x: coords.x,
                    y: coords.y,
                    image_width: frame.width,
                    image_height: frame.height,
                },
                None => CoordinateResult::Unparsed {
                    error: "Could not extract coordinates".to_string(),
                    raw_response: body,
                },
            },
        )
    }
}
