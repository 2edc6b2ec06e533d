/// Named detector configurations backed by the bundled ONNX models.
use std::path::PathBuf;

use crate::detection::domain::detector_provider::DetectorProvider;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::infrastructure::arcface_embedder::{ArcFaceEmbedder, EmbeddingDetector};
use crate::detection::infrastructure::model_resolver;
use crate::detection::infrastructure::onnx_yolo_detector::OnnxYoloDetector;
use crate::shared::constants::{
    EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_URL, YOLO_MODEL_NAME, YOLO_MODEL_URL,
};

/// Detector names accepted on the command line, in display order.
pub const DETECTOR_NAMES: &[&str] = &["yolo", "yolo-embed"];

pub const DEFAULT_DETECTOR: &str = "yolo";

/// Provider for the YOLO face detector, optionally paired with the ArcFace
/// embedder for identity-based tracking.
///
/// Model files are resolved (and downloaded on first use) at `create`
/// time, once per worker; resolution after the first hit is a cache read.
pub struct OnnxDetectorProvider {
    name: &'static str,
    with_embeddings: bool,
    confidence: f64,
    bundled_dir: Option<PathBuf>,
}

impl OnnxDetectorProvider {
    /// Look up a provider by detector name; `None` for unknown names.
    pub fn by_name(
        name: &str,
        confidence: f64,
        bundled_dir: Option<PathBuf>,
    ) -> Option<OnnxDetectorProvider> {
        let with_embeddings = match name {
            "yolo" => false,
            "yolo-embed" => true,
            _ => return None,
        };
        Some(OnnxDetectorProvider {
            name: if with_embeddings { "yolo-embed" } else { "yolo" },
            with_embeddings,
            confidence,
            bundled_dir,
        })
    }
}

impl DetectorProvider for OnnxDetectorProvider {
    fn create(&self) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
        let bundled = self.bundled_dir.as_deref();
        let yolo_path = model_resolver::resolve(YOLO_MODEL_NAME, YOLO_MODEL_URL, bundled)?;
        let detector = Box::new(OnnxYoloDetector::new(&yolo_path, self.confidence)?);

        if !self.with_embeddings {
            return Ok(detector);
        }

        let embed_path = model_resolver::resolve(EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_URL, bundled)?;
        let embedder = ArcFaceEmbedder::new(&embed_path)?;
        Ok(Box::new(EmbeddingDetector::new(detector, embedder)))
    }

    fn supplies_embeddings(&self) -> bool {
        self.with_embeddings
    }

    fn model_name(&self) -> &str {
        self.name
    }
}
