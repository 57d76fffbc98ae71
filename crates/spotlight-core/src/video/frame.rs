//! First-frame extraction via an `ffmpeg` subprocess.

use crate::error::MediaError;
use crate::inference::ImageInput;
use async_trait::async_trait;
use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;
use tokio::process::Command;

/// Frame 0 of a video as JPEG bytes, with its pixel dimensions.
#[derive(Debug, Clone)]
pub struct FirstFrame {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl FirstFrame {
    /// Wrap JPEG bytes, reading the dimensions from the header.
    pub fn from_jpeg(jpeg: Vec<u8>, source: &Path) -> Result<Self, MediaError> {
        let (width, height) = ImageReader::with_format(Cursor::new(&jpeg), ImageFormat::Jpeg)
            .into_dimensions()
            .map_err(|e| MediaError::Decode {
                path: source.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(Self {
            jpeg,
            width,
            height,
        })
    }

    pub fn to_image_input(&self) -> ImageInput {
        ImageInput::from_bytes(&self.jpeg)
    }
}

/// Something that can produce the first frame of a video.
#[async_trait]
pub trait FrameSource: Send + Sync {
    async fn first_frame(&self, video: &Path) -> Result<FirstFrame, MediaError>;
}

/// `FrameSource` backed by the `ffmpeg` binary on `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegFrameSource;

#[async_trait]
impl FrameSource for FfmpegFrameSource {
    async fn first_frame(&self, video: &Path) -> Result<FirstFrame, MediaError> {
        extract_first_frame(video).await
    }
}

/// Decode frame 0 of `video` to JPEG.
pub async fn extract_first_frame(video: &Path) -> Result<FirstFrame, MediaError> {
    let output = Command::new("ffmpeg")
        .args(["-hide_banner", "-loglevel", "error", "-i"])
        .arg(video)
        .args(["-frames:v", "1", "-f", "image2pipe", "-vcodec", "mjpeg", "-"])
        .output()
        .await
        .map_err(|e| MediaError::ffmpeg_failed(format!("failed to run ffmpeg: {e}"), None, None))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(MediaError::ffmpeg_failed(
            format!("frame extraction failed for {}", video.display()),
            Some(stderr),
            output.status.code(),
        ));
    }

    if output.stdout.is_empty() {
        return Err(MediaError::NoFrame(video.to_path_buf()));
    }

    let frame = FirstFrame::from_jpeg(output.stdout, video)?;
    tracing::debug!(
        "Extracted first frame of {}: {}x{}",
        video.display(),
        frame.width,
        frame.height
    );
    Ok(frame)
}
