use crate::detection::domain::detection::Detection;
use crate::tracking::track::{Track, TrackedFace};

/// Per-frame track associations: for each frame, the `(box, track)` pairs
/// in original detection order.
pub type FramesWithTracks = Vec<Vec<TrackedFace>>;

/// Bins per-frame detections into tracks by geometric overlap.
///
/// Each detection is compared against the *most recent* box of every
/// existing track; it joins the best-scoring track when that score reaches
/// `min_score`, otherwise it starts a new track. Ties break toward the
/// first track reaching the maximum (stable insertion order). Complexity is
/// O(frames x detections x tracks), fine at the few-faces-per-frame scale
/// this runs at.
pub fn track_faces_iou(
    frames: &[Vec<Detection>],
    min_score: f64,
) -> (Vec<Track>, FramesWithTracks) {
    bin_into_tracks(
        frames,
        |track, face| Some(track.last_box().intersection_over_union(&face.bbox)),
        min_score,
    )
}

/// Identical control flow to [`track_faces_iou`], but matching on feature
/// embedding distance: lower distance is a better match, and a detection
/// joins a track only when the distance is at most `max_distance`.
/// Detections (or tracks) without an embedding never match and start fresh
/// tracks.
pub fn track_faces_embeddings(
    frames: &[Vec<Detection>],
    max_distance: f64,
) -> (Vec<Track>, FramesWithTracks) {
    // Negated distance turns the shared search back into a maximization.
    bin_into_tracks(
        frames,
        |track, face| embedding_distance(track, face).map(|d| -d),
        -max_distance,
    )
}

/// Dispatches to embedding or IoU binning based on detector capability.
pub fn track_faces(
    frames: &[Vec<Detection>],
    use_embeddings: bool,
    min_iou_score: f64,
    max_embedding_distance: f64,
) -> (Vec<Track>, FramesWithTracks) {
    if use_embeddings {
        track_faces_embeddings(frames, max_embedding_distance)
    } else {
        track_faces_iou(frames, min_iou_score)
    }
}

fn bin_into_tracks(
    frames: &[Vec<Detection>],
    score: impl Fn(&Track, &Detection) -> Option<f64>,
    min_score: f64,
) -> (Vec<Track>, FramesWithTracks) {
    let mut tracks: Vec<Track> = Vec::new();
    let mut frames_with_tracks = Vec::with_capacity(frames.len());

    for faces in frames {
        let mut frame = Vec::with_capacity(faces.len());

        for face in faces {
            let mut best_index = None;
            let mut best_score = f64::NEG_INFINITY;

            for (index, track) in tracks.iter().enumerate() {
                // Strict comparison keeps the earliest track on ties.
                if let Some(s) = score(track, face) {
                    if s > best_score {
                        best_score = s;
                        best_index = Some(index);
                    }
                }
            }

            let track = match best_index.filter(|_| best_score >= min_score) {
                Some(index) => {
                    tracks[index].push(face);
                    index
                }
                None => {
                    tracks.push(Track::starting_with(face));
                    tracks.len() - 1
                }
            };

            frame.push(TrackedFace {
                bbox: face.bbox,
                track,
            });
        }

        frames_with_tracks.push(frame);
    }

    (tracks, frames_with_tracks)
}

fn embedding_distance(track: &Track, face: &Detection) -> Option<f64> {
    let a = track.last_embedding()?;
    let b = face.embedding.as_deref()?;
    if a.len() != b.len() {
        return None;
    }
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| {
            let d = (*x - *y) as f64;
            d * d
        })
        .sum();
    Some(sum.sqrt())
}
