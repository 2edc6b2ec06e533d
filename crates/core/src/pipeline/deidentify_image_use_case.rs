use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::blurring::domain::frame_renderer::FrameRenderer;
use crate::detection::domain::detector_provider::DetectorProvider;
use crate::shared::face_box::FaceBox;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_reader::VideoReader;

use super::error::PipelineError;
use super::pipeline_logger::PipelineLogger;

/// De-identifies a single still image: load, detect, render, save.
///
/// There is no temporal context, so tracking does not apply; every raw
/// detection is rendered. Single-use like the video use case.
pub struct DeidentifyImageUseCase {
    reader: Option<Box<dyn VideoReader>>,
    writer: Box<dyn ImageWriter>,
    provider: Arc<dyn DetectorProvider>,
    renderer: Box<dyn FrameRenderer>,
    cancelled: Arc<AtomicBool>,
}

impl DeidentifyImageUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        writer: Box<dyn ImageWriter>,
        provider: Arc<dyn DetectorProvider>,
        renderer: Box<dyn FrameRenderer>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            reader: Some(reader),
            writer,
            provider,
            renderer,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
        }
    }

    /// Returns the detected face boxes for the debug sidecar.
    pub fn execute(
        &mut self,
        input: &Path,
        output: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Result<Vec<FaceBox>, PipelineError> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Err(PipelineError::Cancelled);
        }

        let mut reader = self
            .reader
            .take()
            .ok_or_else(|| PipelineError::Detection {
                message: "pipeline already executed".to_string(),
            })?;

        reader
            .open(input)
            .map_err(|e| PipelineError::decode(input, e))?;
        let frame = reader
            .frames()
            .next()
            .ok_or_else(|| PipelineError::Decode {
                path: input.to_path_buf(),
                message: "no frame decoded".to_string(),
            })?;
        let mut frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                reader.close();
                return Err(PipelineError::decode(input, e));
            }
        };
        reader.close();

        let mut detector = self
            .provider
            .create()
            .map_err(|e| PipelineError::Detection {
                message: e.to_string(),
            })?;
        let detect_result = detector.detect(&frame);
        detector.close();
        let detections = detect_result.map_err(|e| PipelineError::Detection {
            message: e.to_string(),
        })?;
        let faces: Vec<FaceBox> = detections.iter().map(|d| d.bbox).collect();
        logger.progress("render", 1, 1);

        self.renderer
            .render(&mut frame, &faces)
            .map_err(|e| PipelineError::encode(output, e))?;
        if let Err(e) = self.writer.write(output, &frame) {
            if output.exists() {
                std::fs::remove_file(output).ok();
            }
            return Err(PipelineError::encode(output, e));
        }

        Ok(faces)
    }
}
