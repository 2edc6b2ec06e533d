use crate::detection::domain::detection::Detection;
use crate::shared::frame::Frame;

/// Domain interface for face detection on a single still image.
///
/// Implementations may downscale the input to bound inference cost, but
/// must report boxes in original-image pixel space. Implementations may be
/// stateful, hence `&mut self`. `close` releases any backing model
/// resources; detectors must not be used after closing.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>>;

    /// Whether detections carry feature embeddings. Drives the tracker's
    /// scoring mode: embedding distance when available, IoU otherwise.
    fn supplies_embeddings(&self) -> bool {
        false
    }

    fn close(&mut self) {}
}
