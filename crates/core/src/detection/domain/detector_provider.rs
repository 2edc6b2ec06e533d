use crate::detection::domain::face_detector::FaceDetector;

/// Creates per-worker detector instances for the detection pass.
///
/// Each worker in the detection pool owns its own detector (model sessions
/// are not shared across threads), so the pipeline is handed a provider
/// rather than a single detector. The capability flag and model identity
/// are exposed here so the orchestrator can pick the tracking mode and the
/// debug report can record which model ran, without creating a detector.
pub trait DetectorProvider: Send + Sync {
    fn create(&self) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>>;

    fn supplies_embeddings(&self) -> bool;

    fn model_name(&self) -> &str;
}
