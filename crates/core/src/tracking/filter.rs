use crate::tracking::track::{Track, TrackingError};
use crate::tracking::tracker::FramesWithTracks;

/// Drops associations belonging to short-lived tracks from every frame.
///
/// Short tracks are almost always detector false positives (textured
/// backgrounds briefly misclassified); real faces persist across many
/// frames. The minimum length is `min_track_relative_size` times the total
/// frame count. The tracks themselves are kept for traceability; only
/// their per-frame detections are excluded. An association naming a track
/// that doesn't exist is [`TrackingError::TrackNotFound`], same as during
/// interpolation.
pub fn filter_frames_with_tracks(
    tracks: &[Track],
    frames_with_tracks: &FramesWithTracks,
    min_track_relative_size: f64,
) -> Result<FramesWithTracks, TrackingError> {
    let min_track_size = min_track_relative_size * frames_with_tracks.len() as f64;

    let mut filtered = Vec::with_capacity(frames_with_tracks.len());
    for (frame_index, frame) in frames_with_tracks.iter().enumerate() {
        let mut kept = Vec::new();
        for face in frame {
            let track = tracks.get(face.track).ok_or(TrackingError::TrackNotFound {
                frame: frame_index,
                track: face.track,
            })?;
            if track.len() as f64 >= min_track_size {
                kept.push(*face);
            }
        }
        filtered.push(kept);
    }
    Ok(filtered)
}

/// Converts a minimum on-screen duration in seconds into the relative-size
/// form used by [`filter_frames_with_tracks`].
pub fn relative_size_from_duration(
    min_duration_seconds: f64,
    frame_rate: f64,
    total_frames: usize,
) -> f64 {
    if total_frames == 0 {
        return 0.0;
    }
    (min_duration_seconds * frame_rate) / total_frames as f64
}
