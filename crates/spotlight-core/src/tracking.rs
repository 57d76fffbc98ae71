//! Per-frame person tracks, recorded from an external detector/tracker.
//!
//! Detection and tracking themselves happen elsewhere; this module turns the
//! tracker's per-frame output into the tracks document the player overlay
//! reads:
//!
//! ```json
//! {"videoW": 1280, "videoH": 720, "fps": 30.0,
//!  "frames": [{"frame": 0, "t": 0.0, "tracks": [{"id": 2, "conf": 0.91, "bbox": [x1, y1, x2, y2]}]}]}
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Track id the tracker assigns to detections it could not associate.
pub const UNTRACKED_ID: i64 = -1;

/// One detection as reported by the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    pub track_id: Option<i64>,
    pub confidence: Option<f32>,
    /// `[x1, y1, x2, y2]` in pixels
    pub bbox: [f32; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: i64,
    pub conf: f32,
    pub bbox: [f32; 4],
}

impl Track {
    /// Bounding-box centre as percentages of the frame size.
    pub fn center_percent(&self, video_w: u32, video_h: u32) -> (f32, f32) {
        let [x1, y1, x2, y2] = self.bbox;
        let cx = (x1 + x2) / 2.0 / video_w.max(1) as f32 * 100.0;
        let cy = (y1 + y2) / 2.0 / video_h.max(1) as f32 * 100.0;
        (cx, cy)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackFrame {
    pub frame: u64,
    /// Seconds from the start of the video
    pub t: f64,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackDocument {
    pub video_w: u32,
    pub video_h: u32,
    pub fps: f64,
    pub frames: Vec<TrackFrame>,
}

impl TrackDocument {
    /// Write the document as compact JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        crate::output::write_report(path, self, false)?;
        tracing::info!("Wrote {} with {} frames", path.display(), self.frames.len());
        Ok(())
    }

    pub fn read_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// The last frame at or before `t` seconds, else the first frame.
    pub fn frame_at(&self, t: f64) -> Option<&TrackFrame> {
        let after = self.frames.partition_point(|f| f.t <= t);
        self.frames.get(after.saturating_sub(1))
    }
}

/// Accumulates frames into a `TrackDocument`.
#[derive(Debug)]
pub struct TrackRecorder {
    video_w: u32,
    video_h: u32,
    fps: f64,
    frames: Vec<TrackFrame>,
}

impl TrackRecorder {
    pub fn new(video_w: u32, video_h: u32, fps: f64) -> Self {
        Self {
            video_w,
            video_h,
            fps,
            frames: Vec::new(),
        }
    }

    /// Record the next frame's detections.
    ///
    /// Detections without a track id (or with the untracked id) are dropped.
    pub fn record_frame(&mut self, detections: &[RawDetection]) {
        let frame = self.frames.len() as u64;
        let t = if self.fps > 0.0 {
            frame as f64 / self.fps
        } else {
            0.0
        };

        let tracks = detections
            .iter()
            .filter_map(|d| match d.track_id {
                Some(id) if id != UNTRACKED_ID => Some(Track {
                    id,
                    conf: d.confidence.unwrap_or(0.0),
                    bbox: d.bbox,
                }),
                _ => None,
            })
            .collect();

        self.frames.push(TrackFrame { frame, t, tracks });
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn finish(self) -> TrackDocument {
        TrackDocument {
            video_w: self.video_w,
            video_h: self.video_h,
            fps: self.fps,
            frames: self.frames,
        }
    }
}

/// Video geometry reported by a detection source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

/// An external detector/tracker yielding detections frame by frame.
pub trait DetectionSource {
    fn video_info(&self) -> VideoInfo;

    /// Detections for the next frame, `None` at end of video.
    fn next_frame(&mut self) -> Result<Option<Vec<RawDetection>>>;
}

/// Drain `source` into a tracks document.
pub fn record_tracks(source: &mut dyn DetectionSource) -> Result<TrackDocument> {
    let info = source.video_info();
    let mut recorder = TrackRecorder::new(info.width, info.height, info.fps);
    while let Some(detections) = source.next_frame()? {
        recorder.record_frame(&detections);
    }
    tracing::debug!("Recorded {} frames", recorder.frame_count());
    Ok(recorder.finish())
}
