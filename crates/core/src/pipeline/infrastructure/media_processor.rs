use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::blurring::infrastructure::{create_renderer, RenderMode};
use crate::detection::domain::detector_provider::DetectorProvider;
use crate::pipeline::batch_use_case::FileProcessor;
use crate::pipeline::debug_report::{sidecar_path, DebugReport, ReportBody, StreamReport};
use crate::pipeline::deidentify_image_use_case::DeidentifyImageUseCase;
use crate::pipeline::deidentify_video_use_case::DeidentifyVideoUseCase;
use crate::pipeline::error::PipelineError;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::paths;
use crate::tracking::process::TrackingConfig;
use crate::video::infrastructure::ffmpeg_reader::FfmpegReader;
use crate::video::infrastructure::ffmpeg_writer::FfmpegWriter;
use crate::video::infrastructure::image_file_reader::ImageFileReader;
use crate::video::infrastructure::image_file_writer::ImageFileWriter;

/// Wires the concrete adapters for one file: ffmpeg for containers, the
/// image codecs for stills, plus the optional JSON sidecar.
pub struct MediaFileProcessor {
    provider: Arc<dyn DetectorProvider>,
    mode: RenderMode,
    strength: f64,
    tracking: TrackingConfig,
    workers: usize,
    encoder: Option<String>,
    confidence: f64,
    write_report: bool,
    cancelled: Arc<AtomicBool>,
}

impl MediaFileProcessor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        provider: Arc<dyn DetectorProvider>,
        mode: RenderMode,
        strength: f64,
        tracking: TrackingConfig,
        workers: usize,
        encoder: Option<String>,
        confidence: f64,
        write_report: bool,
        cancelled: Arc<AtomicBool>,
    ) -> Self {
        Self {
            provider,
            mode,
            strength,
            tracking,
            workers,
            encoder,
            confidence,
            write_report,
            cancelled,
        }
    }

    fn emit_report(
        &self,
        input: &Path,
        output: &Path,
        body: ReportBody,
    ) -> Result<(), PipelineError> {
        let report = DebugReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            model: self.provider.model_name().to_string(),
            confidence: self.confidence,
            body,
        };
        let path = sidecar_path(output);
        report
            .write(&path)
            .map_err(|e| PipelineError::encode(&path, e))
    }

    fn process_image(
        &self,
        input: &Path,
        output: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Result<(), PipelineError> {
        let mut use_case = DeidentifyImageUseCase::new(
            Box::new(ImageFileReader::new()),
            Box::new(ImageFileWriter::new()),
            self.provider.clone(),
            create_renderer(self.mode, self.strength),
            Some(self.cancelled.clone()),
        );
        let faces = use_case.execute(input, output, logger)?;

        if self.write_report {
            self.emit_report(input, output, ReportBody::Image { faces })?;
        }
        Ok(())
    }

    fn process_video(
        &self,
        input: &Path,
        output: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Result<(), PipelineError> {
        let mut use_case = DeidentifyVideoUseCase::new(
            Box::new(FfmpegReader::new()),
            Box::new(FfmpegWriter::with_encoder(self.encoder.clone())),
            self.provider.clone(),
            create_renderer(self.mode, self.strength),
            self.tracking.clone(),
            self.workers,
            Some(self.cancelled.clone()),
        );
        let outcome = use_case.execute(input, output, logger)?;

        if self.write_report {
            let streams = outcome
                .streams
                .iter()
                .map(|(stream, processed)| StreamReport::from_processed(*stream, processed))
                .collect();
            self.emit_report(
                input,
                output,
                ReportBody::Video {
                    tracking: self.tracking.clone(),
                    streams,
                },
            )?;
        }
        Ok(())
    }
}

impl FileProcessor for MediaFileProcessor {
    fn process(
        &mut self,
        input: &Path,
        output: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Result<(), PipelineError> {
        if paths::is_image(input) {
            self.process_image(input, output, logger)
        } else {
            self.process_video(input, output, logger)
        }
    }
}
