use thiserror::Error;

use crate::detection::domain::detection::Detection;
use crate::shared::face_box::FaceBox;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackingError {
    /// A detection references a track that doesn't exist. This indicates a
    /// tracker/filter bug, not a normal empty case, and is fatal for the
    /// file: interpolation correctness depends on the association being
    /// sound.
    #[error("no track {track} for face at frame {frame}")]
    TrackNotFound { frame: usize, track: usize },
}

/// A time-ordered sequence of detections believed to belong to one physical
/// face. Tracks only ever grow; short ones are excluded downstream rather
/// than deleted, so track ids stay stable for the whole run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Track {
    boxes: Vec<FaceBox>,
    last_embedding: Option<Vec<f32>>,
}

impl Track {
    pub fn starting_with(detection: &Detection) -> Self {
        Self {
            boxes: vec![detection.bbox],
            last_embedding: detection.embedding.clone(),
        }
    }

    pub fn push(&mut self, detection: &Detection) {
        self.boxes.push(detection.bbox);
        if detection.embedding.is_some() {
            self.last_embedding = detection.embedding.clone();
        }
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Most recent box; tracks are created non-empty so this always exists.
    pub fn last_box(&self) -> &FaceBox {
        self.boxes
            .last()
            .expect("tracks are created with at least one detection")
    }

    pub fn last_embedding(&self) -> Option<&[f32]> {
        self.last_embedding.as_deref()
    }

    /// Track length relative to the sequence length, the false-positive
    /// filter criterion.
    pub fn relative_size(&self, total_frames: usize) -> f64 {
        if total_frames == 0 {
            return 0.0;
        }
        self.len() as f64 / total_frames as f64
    }
}

/// Association between a detection's box and its owning track, per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackedFace {
    pub bbox: FaceBox,
    pub track: usize,
}
