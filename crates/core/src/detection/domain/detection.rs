use crate::shared::face_box::FaceBox;

/// A single raw face detection for one frame.
///
/// The embedding is an opaque fixed-length feature vector supplied by
/// detectors that support identity comparison; its presence decides whether
/// the tracker matches by embedding distance or by IoU. Never mutated after
/// construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub bbox: FaceBox,
    pub confidence: Option<f64>,
    pub embedding: Option<Vec<f32>>,
}

impl Detection {
    pub fn new(bbox: FaceBox) -> Self {
        Self {
            bbox,
            confidence: None,
            embedding: None,
        }
    }

    pub fn with_confidence(bbox: FaceBox, confidence: f64) -> Self {
        Self {
            bbox,
            confidence: Some(confidence),
            embedding: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_detection_has_no_capabilities() {
        let d = Detection::new(FaceBox::new(0, 0, 10, 10).unwrap());
        assert!(d.confidence.is_none());
        assert!(d.embedding.is_none());
    }

    #[test]
    fn test_with_confidence() {
        let d = Detection::with_confidence(FaceBox::new(0, 0, 10, 10).unwrap(), 0.9);
        assert_eq!(d.confidence, Some(0.9));
    }
}
