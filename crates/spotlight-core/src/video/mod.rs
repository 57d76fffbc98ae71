//! Video-side collaborators: the video-understanding model and first-frame
//! extraction.

pub mod bedrock;
pub mod frame;

pub use bedrock::BedrockVideoClient;
pub use frame::{extract_first_frame, FfmpegFrameSource, FirstFrame, FrameSource};

use crate::error::{InputError, SpotlightError};
use async_trait::async_trait;
use base64::Engine;
use serde_json::Value;
use std::path::Path;

/// A model that answers a text prompt about a whole video.
#[async_trait]
pub trait VideoUnderstanding: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Run `prompt` against the video and return the provider's JSON body.
    async fn analyze(&self, video: &Path, prompt: &str) -> Result<Value, SpotlightError>;
}

/// Check that `path` exists and is a regular file.
pub fn ensure_video_file(path: &Path) -> Result<(), InputError> {
    if !path.exists() {
        return Err(InputError::FileNotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(InputError::NotAFile(path.to_path_buf()));
    }
    Ok(())
}

/// Read a video and base64-encode it for an inline media payload.
///
/// Files above `max_payload_mb` are still sent; the service decides.
pub(crate) async fn read_video_base64(
    path: &Path,
    max_payload_mb: u64,
) -> Result<String, SpotlightError> {
    ensure_video_file(path)?;
    let bytes = tokio::fs::read(path).await?;

    let size_mb = bytes.len() as f64 / (1024.0 * 1024.0);
    if size_mb > max_payload_mb as f64 {
        tracing::warn!(
            "Video file is {:.1}MB, above the {}MB inline limit; the request may be rejected",
            size_mb,
            max_payload_mb
        );
    } else {
        tracing::debug!("Video file size: {:.1}MB", size_mb);
    }

    Ok(base64::engine::general_purpose::STANDARD.encode(&bytes))
}
