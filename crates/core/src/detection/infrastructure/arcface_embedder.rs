/// ArcFace feature embedder using ONNX Runtime.
///
/// Produces an L2-normalized feature vector for a face crop so the tracker
/// can associate detections by identity instead of geometric overlap.
use std::path::Path;

use crate::detection::domain::detection::Detection;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

const INPUT_SIZE: usize = 112;
const NORM_MEAN: f32 = 127.5;
const NORM_STD: f32 = 127.5;

pub struct ArcFaceEmbedder {
    session: ort::session::Session,
}

impl ArcFaceEmbedder {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)?
            .commit_from_file(model_path)?;
        Ok(Self { session })
    }

    /// Embed the face inside `bbox`, which must already be clamped to the
    /// frame bounds.
    pub fn embed(
        &mut self,
        frame: &Frame,
        bbox: &FaceBox,
    ) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
        let tensor = preprocess(frame, bbox);
        let input_value = ort::value::Tensor::from_array(tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        let embedding_array = outputs[0].try_extract_array::<f32>()?;
        let embedding_slice = embedding_array
            .as_slice()
            .ok_or("Cannot get embedding slice")?;

        let mut embedding = embedding_slice.to_vec();
        l2_normalize(&mut embedding);
        Ok(embedding)
    }
}

/// Couples a box detector with an embedder so every detection carries a
/// feature vector. This is what makes embedding-based tracking available
/// to the pipeline.
pub struct EmbeddingDetector {
    detector: Box<dyn FaceDetector>,
    embedder: ArcFaceEmbedder,
}

impl EmbeddingDetector {
    pub fn new(detector: Box<dyn FaceDetector>, embedder: ArcFaceEmbedder) -> Self {
        Self { detector, embedder }
    }
}

impl FaceDetector for EmbeddingDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        let mut detections = self.detector.detect(frame)?;
        for detection in &mut detections {
            detection.embedding = Some(self.embedder.embed(frame, &detection.bbox)?);
        }
        Ok(detections)
    }

    fn supplies_embeddings(&self) -> bool {
        true
    }

    fn close(&mut self) {
        self.detector.close();
    }
}

/// Crop `bbox` out of the frame, resize to 112x112, normalize, NCHW layout.
fn preprocess(frame: &Frame, bbox: &FaceBox) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray();
    // Inclusive pixel counts.
    let crop_w = (bbox.width() + 1) as f64;
    let crop_h = (bbox.height() + 1) as f64;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, INPUT_SIZE, INPUT_SIZE));

    for y in 0..INPUT_SIZE {
        let src_y = bbox.top as usize
            + (((y as f64 + 0.5) * crop_h / INPUT_SIZE as f64) as usize).min(crop_h as usize - 1);
        for x in 0..INPUT_SIZE {
            let src_x = bbox.left as usize
                + (((x as f64 + 0.5) * crop_w / INPUT_SIZE as f64) as usize)
                    .min(crop_w as usize - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = (src[[src_y, src_x, c]] as f32 - NORM_MEAN) / NORM_STD;
            }
        }
    }

    tensor
}

pub fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l2_normalize_unit_vector() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_l2_normalize_zero_vector() {
        let mut v = vec![0.0, 0.0, 0.0];
        l2_normalize(&mut v);
        assert_eq!(v, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_preprocess_shape() {
        let frame = Frame::new(vec![128u8; 50 * 50 * 3], 50, 50, 3, 0, 0);
        let bbox = FaceBox::new(0, 0, 49, 49).unwrap();
        let tensor = preprocess(&frame, &bbox);
        assert_eq!(tensor.shape(), &[1, 3, 112, 112]);
    }

    #[test]
    fn test_preprocess_normalization_range() {
        let frame = Frame::new(vec![255u8; 20 * 20 * 3], 20, 20, 3, 0, 0);
        let bbox = FaceBox::new(0, 0, 19, 19).unwrap();
        let tensor = preprocess(&frame, &bbox);
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 0.01);

        let frame = Frame::new(vec![0u8; 20 * 20 * 3], 20, 20, 3, 0, 0);
        let tensor = preprocess(&frame, &bbox);
        assert!((tensor[[0, 0, 0, 0]] - (-1.0)).abs() < 0.01);
    }

    #[test]
    fn test_preprocess_reads_inside_bbox_only() {
        // White face crop on a black frame; every sampled value should be
        // the white crop's.
        let mut data = vec![0u8; 40 * 40 * 3];
        for y in 10..30usize {
            for x in 10..30usize {
                let offset = (y * 40 + x) * 3;
                data[offset..offset + 3].copy_from_slice(&[255, 255, 255]);
            }
        }
        let frame = Frame::new(data, 40, 40, 3, 0, 0);
        let bbox = FaceBox::new(10, 10, 29, 29).unwrap();
        let tensor = preprocess(&frame, &bbox);
        for &v in tensor.iter() {
            assert!((v - 1.0).abs() < 0.01);
        }
    }
}
