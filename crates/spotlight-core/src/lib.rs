//! Spotlight Core - find and describe the main character of a video.
//!
//! Spotlight asks a video-understanding model who the main character is,
//! pins that character to pixel coordinates on the first frame with an
//! image-understanding model, and asks for an overall description. The image
//! model is reached through a resilient client that falls back across an
//! ordered list of models when one is rate-limited.
//!
//! # Architecture
//!
//! ```text
//! Video → locateMain (Bedrock Pegasus) → description
//!       → first frame (ffmpeg) + description → coordinates (OpenRouter, model fallback)
//!       → describe (Bedrock Pegasus)
//!       → AnnotationReport → JSON
//!
//! Chat assistant (Backboard) → tool call → tools::dispatch → result posted back
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use spotlight_core::{AnnotateOptions, Annotator, Config};
//!
//! #[tokio::main]
//! async fn main() -> spotlight_core::Result<()> {
//!     let config = Config::load()?;
//!     let annotator = Annotator::from_config(&config, None, None)?;
//!
//!     let report = annotator
//!         .annotate("./clip.mp4".as_ref(), &AnnotateOptions::default())
//!         .await?;
//!     println!("{:?}", report.coordinates);
//!     Ok(())
//! }
//! ```

pub mod annotate;
pub mod assistant;
pub mod config;
pub mod error;
pub mod inference;
pub mod output;
pub mod prompts;
pub mod tools;
pub mod tracking;
pub mod video;

pub use annotate::{AnnotateOptions, AnnotationReport, Annotator, CoordinateResult};
pub use assistant::{AssistantClient, AssistantReply};
pub use config::Config;
pub use error::{ConfigError, InferenceError, InputError, MediaError, Result, SpotlightError};
pub use inference::{
    extract_canonical_text, extract_coordinates, Coordinates, ImageInput, InferenceOutcome,
    InferenceRequest, ResilientClient,
};
pub use output::write_report;
pub use tracking::{TrackDocument, TrackRecorder};
pub use video::{BedrockVideoClient, VideoUnderstanding};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_report_serializes_stage_keys() {
        let report = AnnotationReport {
            locate_main: Some(serde_json::json!("the host")),
            coordinates: Some(CoordinateResult::Failed {
                error: "boom".to_string(),
            }),
            describe: None,
        };
        let json = output::to_json(&report, false).unwrap();
        assert_eq!(
            json,
            r#"{"locateMain":"the host","coordinates":{"error":"boom"}}"#
        );
    }
}
