use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::shared::paths;

use super::error::PipelineError;
use super::pipeline_logger::PipelineLogger;

/// Processes one input file to one output file. The batch use case stays
/// independent of how a file is actually handled (video vs image, which
/// adapters), which also keeps it testable without media libraries.
pub trait FileProcessor: Send {
    fn process(
        &mut self,
        input: &Path,
        output: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Result<(), PipelineError>;
}

pub struct BatchOptions {
    pub output_dir: PathBuf,
    /// Container extension override for video outputs.
    pub format: Option<String>,
    /// Stop at the first per-file failure instead of continuing.
    pub fail_fast: bool,
}

/// What happened to each file of a batch run.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub completed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
    pub skipped: Vec<PathBuf>,
    /// True when the run stopped on a cancellation request. In-flight work
    /// for the current file drains before the batch stops.
    pub cancelled: bool,
}

impl BatchOutcome {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty() && !self.cancelled
    }
}

/// Sequentially de-identifies every supported file under the given inputs.
///
/// Per-file failures are reported and the batch moves on; only `fail_fast`
/// or cancellation stop it early. A failed file never leaves a partial
/// output behind (the file processor guarantees that), so a re-run with
/// the same arguments converges.
pub struct BatchUseCase {
    processor: Box<dyn FileProcessor>,
    options: BatchOptions,
    cancelled: Arc<AtomicBool>,
}

impl BatchUseCase {
    pub fn new(
        processor: Box<dyn FileProcessor>,
        options: BatchOptions,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            processor,
            options,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
        }
    }

    pub fn execute(
        &mut self,
        inputs: &[PathBuf],
        logger: &mut dyn PipelineLogger,
    ) -> Result<BatchOutcome, PipelineError> {
        let mut outcome = BatchOutcome::default();

        let files = paths::collect_supported_inputs(inputs, |path, reason| {
            log::warn!("skipping {}: {reason}", path.display());
            outcome.skipped.push(path.to_path_buf());
        });

        std::fs::create_dir_all(&self.options.output_dir)?;

        let total = files.len();
        for (i, input) in files.iter().enumerate() {
            if self.cancelled.load(Ordering::Relaxed) {
                outcome.cancelled = true;
                break;
            }

            let format = if paths::is_container(input) {
                self.options.format.as_deref()
            } else {
                None
            };
            let output = paths::output_path_for(input, &self.options.output_dir, format);

            logger.info(&format!(
                "[{}/{total}] {}",
                i + 1,
                input.display()
            ));
            match self.processor.process(input, &output, logger) {
                Ok(()) => outcome.completed.push(input.clone()),
                Err(PipelineError::Cancelled) => {
                    outcome.cancelled = true;
                    break;
                }
                Err(e) => {
                    logger.info(&format!("failed {}: {e}", input.display()));
                    outcome.failed.push((input.clone(), e.to_string()));
                    if self.options.fail_fast {
                        break;
                    }
                }
            }
        }

        logger.info(&format!(
            "{} completed, {} failed, {} skipped{}",
            outcome.completed.len(),
            outcome.failed.len(),
            outcome.skipped.len(),
            if outcome.cancelled { ", cancelled" } else { "" }
        ));
        logger.summary();
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use std::fs::File;
    use std::sync::Mutex;

    struct ScriptedProcessor {
        calls: Arc<Mutex<Vec<(PathBuf, PathBuf)>>>,
        fail_on: Option<&'static str>,
        cancel_flag_after: Option<(usize, Arc<AtomicBool>)>,
    }

    impl ScriptedProcessor {
        fn new() -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                fail_on: None,
                cancel_flag_after: None,
            }
        }
    }

    impl FileProcessor for ScriptedProcessor {
        fn process(
            &mut self,
            input: &Path,
            output: &Path,
            _logger: &mut dyn PipelineLogger,
        ) -> Result<(), PipelineError> {
            let mut calls = self.calls.lock().unwrap();
            calls.push((input.to_path_buf(), output.to_path_buf()));
            if let Some((after, ref flag)) = self.cancel_flag_after {
                if calls.len() >= after {
                    flag.store(true, Ordering::Relaxed);
                }
            }
            if let Some(name) = self.fail_on {
                if input.file_name().unwrap() == name {
                    return Err(PipelineError::Detection {
                        message: "scripted failure".to_string(),
                    });
                }
            }
            Ok(())
        }
    }

    fn batch_dir(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            File::create(dir.path().join(name)).unwrap();
        }
        dir
    }

    fn options(dir: &tempfile::TempDir, fail_fast: bool) -> BatchOptions {
        BatchOptions {
            output_dir: dir.path().join("out"),
            format: None,
            fail_fast,
        }
    }

    #[test]
    fn test_processes_every_supported_file() {
        let dir = batch_dir(&["a.mp4", "b.jpg", "notes.txt"]);
        let processor = ScriptedProcessor::new();
        let calls = processor.calls.clone();

        let mut batch = BatchUseCase::new(Box::new(processor), options(&dir, false), None);
        let outcome = batch
            .execute(&[dir.path().to_path_buf()], &mut NullPipelineLogger)
            .unwrap();

        assert_eq!(outcome.completed.len(), 2);
        assert!(outcome.all_succeeded());
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        // Outputs land in the output dir under the input basename.
        assert!(calls[0].1.starts_with(dir.path().join("out")));
    }

    #[test]
    fn test_failure_recorded_and_batch_continues() {
        let dir = batch_dir(&["a.mp4", "b.mp4", "c.mp4"]);
        let processor = ScriptedProcessor {
            fail_on: Some("b.mp4"),
            ..ScriptedProcessor::new()
        };

        let mut batch = BatchUseCase::new(Box::new(processor), options(&dir, false), None);
        let outcome = batch
            .execute(&[dir.path().to_path_buf()], &mut NullPipelineLogger)
            .unwrap();

        assert_eq!(outcome.completed.len(), 2);
        assert_eq!(outcome.failed.len(), 1);
        assert!(outcome.failed[0].0.ends_with("b.mp4"));
        assert!(outcome.failed[0].1.contains("scripted failure"));
        assert!(!outcome.all_succeeded());
    }

    #[test]
    fn test_fail_fast_stops_at_first_failure() {
        let dir = batch_dir(&["a.mp4", "b.mp4", "c.mp4"]);
        let processor = ScriptedProcessor {
            fail_on: Some("a.mp4"),
            ..ScriptedProcessor::new()
        };
        let calls = processor.calls.clone();

        let mut batch = BatchUseCase::new(Box::new(processor), options(&dir, true), None);
        let outcome = batch
            .execute(&[dir.path().to_path_buf()], &mut NullPipelineLogger)
            .unwrap();

        assert_eq!(calls.lock().unwrap().len(), 1);
        assert!(outcome.completed.is_empty());
        assert_eq!(outcome.failed.len(), 1);
    }

    #[test]
    fn test_cancellation_stops_after_current_file() {
        let dir = batch_dir(&["a.mp4", "b.mp4", "c.mp4", "d.mp4"]);
        let cancelled = Arc::new(AtomicBool::new(false));
        let processor = ScriptedProcessor {
            cancel_flag_after: Some((2, cancelled.clone())),
            ..ScriptedProcessor::new()
        };
        let calls = processor.calls.clone();

        let mut batch = BatchUseCase::new(
            Box::new(processor),
            options(&dir, false),
            Some(cancelled),
        );
        let outcome = batch
            .execute(&[dir.path().to_path_buf()], &mut NullPipelineLogger)
            .unwrap();

        // The file that set the flag still completed; the rest never ran.
        assert_eq!(calls.lock().unwrap().len(), 2);
        assert_eq!(outcome.completed.len(), 2);
        assert!(outcome.cancelled);
        assert!(!outcome.all_succeeded());
    }

    #[test]
    fn test_unsupported_explicit_input_is_skipped_not_failed() {
        let dir = batch_dir(&["notes.txt"]);
        let processor = ScriptedProcessor::new();
        let calls = processor.calls.clone();

        let mut batch = BatchUseCase::new(Box::new(processor), options(&dir, false), None);
        let outcome = batch
            .execute(&[dir.path().join("notes.txt")], &mut NullPipelineLogger)
            .unwrap();

        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(outcome.skipped.len(), 1);
        assert!(outcome.failed.is_empty());
        assert!(outcome.all_succeeded());
    }

    #[test]
    fn test_format_override_applies_to_videos_only() {
        let dir = batch_dir(&["a.mp4", "b.jpg"]);
        let processor = ScriptedProcessor::new();
        let calls = processor.calls.clone();

        let mut batch = BatchUseCase::new(
            Box::new(processor),
            BatchOptions {
                output_dir: dir.path().join("out"),
                format: Some("mkv".to_string()),
                fail_fast: false,
            },
            None,
        );
        batch
            .execute(&[dir.path().to_path_buf()], &mut NullPipelineLogger)
            .unwrap();

        let calls = calls.lock().unwrap();
        let outputs: Vec<&PathBuf> = calls.iter().map(|(_, o)| o).collect();
        assert!(outputs.iter().any(|o| o.ends_with("a.mkv")));
        assert!(outputs.iter().any(|o| o.ends_with("b.jpg")));
    }

    #[test]
    fn test_creates_output_directory() {
        let dir = batch_dir(&["a.mp4"]);
        let out = dir.path().join("nested").join("out");

        let mut batch = BatchUseCase::new(
            Box::new(ScriptedProcessor::new()),
            BatchOptions {
                output_dir: out.clone(),
                format: None,
                fail_fast: false,
            },
            None,
        );
        batch
            .execute(&[dir.path().to_path_buf()], &mut NullPipelineLogger)
            .unwrap();
        assert!(out.is_dir());
    }
}
