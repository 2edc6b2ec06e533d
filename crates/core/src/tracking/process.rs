use serde::Serialize;

use crate::detection::domain::detection::Detection;
use crate::shared::constants::{
    DEFAULT_MAX_EMBEDDING_DISTANCE, DEFAULT_MIN_IOU_SCORE, DEFAULT_MIN_TRACK_RELATIVE_SIZE,
    DEFAULT_TRACKING_DURATION,
};
use crate::shared::face_box::FaceBox;
use crate::tracking::filter::{filter_frames_with_tracks, relative_size_from_duration};
use crate::tracking::interpolate::interpolate_faces;
use crate::tracking::track::TrackingError;
use crate::tracking::tracker::track_faces;

/// Tuning for the track / filter / interpolate stages.
///
/// The defaults come from the detector behavior this pipeline was tuned
/// against; they are configuration, not law.
#[derive(Clone, Debug, Serialize)]
pub struct TrackingConfig {
    /// When false the temporal stages are skipped entirely and every raw
    /// detection is rendered as-is.
    pub enabled: bool,
    /// Minimum IoU for a detection to join a track (IoU mode).
    pub min_iou_score: f64,
    /// Maximum embedding distance to join a track (embedding mode).
    pub max_embedding_distance: f64,
    /// Tracks shorter than this fraction of the video are dropped.
    pub min_track_relative_size: f64,
    /// When set, the filter threshold is this duration in seconds instead
    /// of a fraction of the video; converted per stream using its frame
    /// rate and length.
    pub min_track_duration: Option<f64>,
    /// Longest gap, in seconds of footage, that interpolation will bridge.
    pub tracking_duration: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_iou_score: DEFAULT_MIN_IOU_SCORE,
            max_embedding_distance: DEFAULT_MAX_EMBEDDING_DISTANCE,
            min_track_relative_size: DEFAULT_MIN_TRACK_RELATIVE_SIZE,
            min_track_duration: None,
            tracking_duration: DEFAULT_TRACKING_DURATION,
        }
    }
}

impl TrackingConfig {
    /// Gap tolerance in frames at the given frame rate, never below 1.
    pub fn max_gap_frames(&self, frame_rate: f64) -> usize {
        ((self.tracking_duration * frame_rate) as usize).max(1)
    }

    /// Effective relative-size threshold for a stream of `total_frames`
    /// frames at `frame_rate`.
    pub fn filter_threshold(&self, frame_rate: f64, total_frames: usize) -> f64 {
        match self.min_track_duration {
            Some(seconds) if total_frames > 0 => {
                relative_size_from_duration(seconds, frame_rate, total_frames)
            }
            _ => self.min_track_relative_size,
        }
    }
}

/// Per-stream result of the temporal processing stage: the raw detections'
/// boxes and the final render lists, both in frame order with identical
/// frame counts. The raw lists are kept for the debug report.
#[derive(Clone, Debug, Default)]
pub struct ProcessedStream {
    pub raw: Vec<Vec<FaceBox>>,
    pub processed: Vec<Vec<FaceBox>>,
}

/// Turns one stream's noisy per-frame detections into stable render lists:
/// bin into tracks, drop short-lived tracks, then bridge small gaps by
/// interpolation. Filtering runs before interpolation so false positives
/// never get extended.
pub fn process_stream(
    frames: &[Vec<Detection>],
    use_embeddings: bool,
    frame_rate: f64,
    config: &TrackingConfig,
) -> Result<ProcessedStream, TrackingError> {
    let raw: Vec<Vec<FaceBox>> = frames
        .iter()
        .map(|faces| faces.iter().map(|f| f.bbox).collect())
        .collect();

    if !config.enabled {
        let processed = raw.clone();
        return Ok(ProcessedStream { raw, processed });
    }

    let (tracks, frames_with_tracks) = track_faces(
        frames,
        use_embeddings,
        config.min_iou_score,
        config.max_embedding_distance,
    );

    let filtered = filter_frames_with_tracks(
        &tracks,
        &frames_with_tracks,
        config.filter_threshold(frame_rate, frames.len()),
    )?;

    let processed = interpolate_faces(tracks.len(), &filtered, config.max_gap_frames(frame_rate))?;

    Ok(ProcessedStream { raw, processed })
}
