use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::blurring::domain::frame_renderer::FrameRenderer;
use crate::detection::domain::detector_provider::DetectorProvider;
use crate::shared::constants::FALLBACK_FRAME_RATE;
use crate::tracking::process::{process_stream, ProcessedStream, TrackingConfig};
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

use super::error::PipelineError;
use super::infrastructure::detector_pool::{DetectorPool, StreamDetections};
use super::pipeline_logger::PipelineLogger;

/// Per-stream face lists produced for one video, keyed by stream index.
/// Kept after the run for the debug sidecar.
#[derive(Debug)]
pub struct VideoOutcome {
    pub streams: BTreeMap<usize, ProcessedStream>,
    pub frames_written: usize,
}

/// De-identifies one video file in two passes over the container.
///
/// Pass one decodes every frame and runs detection on a worker pool; the
/// complete per-stream detection lists then go through tracking. Pass two
/// re-opens the input, renders the final box lists into each frame in
/// strict presentation order and encodes the output. Tracking needs the
/// whole timeline before the first output frame can be decided, hence the
/// two passes.
///
/// Single-use: `execute` consumes the owned components.
pub struct DeidentifyVideoUseCase {
    reader: Option<Box<dyn VideoReader>>,
    writer: Option<Box<dyn VideoWriter>>,
    provider: Arc<dyn DetectorProvider>,
    renderer: Box<dyn FrameRenderer>,
    tracking: TrackingConfig,
    workers: usize,
    cancelled: Arc<AtomicBool>,
}

impl DeidentifyVideoUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        writer: Box<dyn VideoWriter>,
        provider: Arc<dyn DetectorProvider>,
        renderer: Box<dyn FrameRenderer>,
        tracking: TrackingConfig,
        workers: usize,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            reader: Some(reader),
            writer: Some(writer),
            provider,
            renderer,
            tracking,
            workers,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
        }
    }

    pub fn execute(
        &mut self,
        input: &Path,
        output: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Result<VideoOutcome, PipelineError> {
        let mut reader = self
            .reader
            .take()
            .ok_or_else(|| PipelineError::Detection {
                message: "pipeline already executed".to_string(),
            })?;
        let mut writer = self
            .writer
            .take()
            .ok_or_else(|| PipelineError::Detection {
                message: "pipeline already executed".to_string(),
            })?;

        // Detect pass. No output file exists yet, so failure here needs no
        // cleanup beyond closing the reader.
        let detect_start = Instant::now();
        let metadata = reader
            .open(input)
            .map_err(|e| PipelineError::decode(input, e))?;
        let total = metadata.total_frames;

        let detect_result = self.run_detect_pass(reader.as_mut(), input, total, logger);
        reader.close();
        let detections = detect_result?;
        logger.timing("detect", detect_start.elapsed().as_secs_f64() * 1000.0);

        let frame_rate = metadata.frame_rate_or(FALLBACK_FRAME_RATE);
        let use_embeddings = self.provider.supplies_embeddings();
        let mut streams = BTreeMap::new();
        for (stream, frames) in detections {
            let processed =
                process_stream(&frames, use_embeddings, frame_rate, &self.tracking)?;
            streams.insert(stream, processed);
        }

        // Render pass. From here on a partial output file exists; every
        // error and cancellation path must remove it.
        let render_start = Instant::now();
        reader
            .open(input)
            .map_err(|e| PipelineError::decode(input, e))?;
        writer
            .open(output, &metadata)
            .map_err(|e| PipelineError::encode(output, e))?;

        let render_result = self.run_render_pass(
            reader.as_mut(),
            writer.as_mut(),
            &streams,
            input,
            output,
            total,
            logger,
        );
        reader.close();

        let frames_written = match render_result {
            Ok(count) => count,
            Err(e) => {
                discard_partial(output);
                return Err(e);
            }
        };

        if let Err(e) = writer.close() {
            discard_partial(output);
            return Err(PipelineError::encode(output, e));
        }
        logger.timing("render", render_start.elapsed().as_secs_f64() * 1000.0);

        Ok(VideoOutcome {
            streams,
            frames_written,
        })
    }

    fn run_detect_pass(
        &self,
        reader: &mut dyn VideoReader,
        input: &Path,
        total: usize,
        logger: &mut dyn PipelineLogger,
    ) -> Result<StreamDetections, PipelineError> {
        let pool = DetectorPool::spawn(self.provider.as_ref(), self.workers).map_err(|e| {
            PipelineError::Detection {
                message: e.to_string(),
            }
        })?;

        let mut collected = BTreeMap::new();
        let mut submitted = 0usize;
        for frame in reader.frames() {
            if self.cancelled.load(Ordering::Relaxed) {
                drop(pool);
                return Err(PipelineError::Cancelled);
            }
            let frame = frame.map_err(|e| PipelineError::decode(input, e))?;
            pool.submit(frame, &mut collected)
                .map_err(|e| PipelineError::Detection {
                    message: e.to_string(),
                })?;
            submitted += 1;
            logger.progress("detect", submitted, total);
        }

        pool.finish(collected).map_err(|e| PipelineError::Detection {
            message: e.to_string(),
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn run_render_pass(
        &self,
        reader: &mut dyn VideoReader,
        writer: &mut dyn VideoWriter,
        streams: &BTreeMap<usize, ProcessedStream>,
        input: &Path,
        output: &Path,
        total: usize,
        logger: &mut dyn PipelineLogger,
    ) -> Result<usize, PipelineError> {
        let empty: Vec<crate::shared::face_box::FaceBox> = Vec::new();
        let mut written = 0usize;

        for frame in reader.frames() {
            if self.cancelled.load(Ordering::Relaxed) {
                return Err(PipelineError::Cancelled);
            }
            let mut frame = frame.map_err(|e| PipelineError::decode(input, e))?;

            let faces = streams
                .get(&frame.stream_index())
                .and_then(|s| s.processed.get(frame.index()))
                .unwrap_or(&empty);

            self.renderer
                .render(&mut frame, faces)
                .map_err(|e| PipelineError::encode(output, e))?;
            writer
                .write(&frame)
                .map_err(|e| PipelineError::encode(output, e))?;
            written += 1;
            logger.progress("render", written, total);
        }

        Ok(written)
    }
}

fn discard_partial(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            log::warn!("could not remove partial output {}: {e}", path.display());
        }
    }
}
