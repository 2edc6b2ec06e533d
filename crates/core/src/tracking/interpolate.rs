use crate::shared::face_box::FaceBox;
use crate::tracking::track::TrackingError;
use crate::tracking::tracker::FramesWithTracks;

/// Fills temporal gaps within each track by linear interpolation.
///
/// Walks the (filtered) per-frame associations in frame order, remembering
/// the last occurrence of every track. When a track reappears after a gap
/// of `1 < gap < max_gap_frames`, a box is synthesized for each skipped
/// frame by blending the surrounding boxes at `t = k/gap` (endpoints
/// excluded). Gaps of exactly one frame distance need nothing; gaps at or
/// beyond `max_gap_frames` are treated as genuine absence (face turned
/// away or left the scene for too long to safely guess) and left unfilled.
/// A track's first occurrence has no predecessor and is never back-filled.
///
/// `track_count` is the number of tracks produced by the tracker; an
/// association referencing a track outside that range is an internal
/// consistency failure and aborts the file.
///
/// Returns the processed per-frame box lists: the filtered detections plus
/// interpolated insertions, same frame count as the input.
pub fn interpolate_faces(
    track_count: usize,
    frames_with_tracks: &FramesWithTracks,
    max_gap_frames: usize,
) -> Result<Vec<Vec<FaceBox>>, TrackingError> {
    let mut output: Vec<Vec<FaceBox>> = frames_with_tracks
        .iter()
        .map(|frame| frame.iter().map(|face| face.bbox).collect())
        .collect();

    let mut last_seen: Vec<Option<(usize, FaceBox)>> = vec![None; track_count];

    for (frame, faces) in frames_with_tracks.iter().enumerate() {
        for face in faces {
            let seen = last_seen.get_mut(face.track).ok_or(
                TrackingError::TrackNotFound {
                    frame,
                    track: face.track,
                },
            )?;

            if let Some((previous_frame, previous_box)) = *seen {
                let gap = frame - previous_frame;
                if 1 < gap && gap < max_gap_frames {
                    for k in 1..gap {
                        let t = k as f64 / gap as f64;
                        let interpolated = FaceBox::lerp(&previous_box, &face.bbox, t);
                        output[previous_frame + k].push(interpolated);
                    }
                }
            }

            *seen = Some((frame, face.bbox));
        }
    }

    Ok(output)
}
