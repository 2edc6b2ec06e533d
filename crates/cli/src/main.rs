use std::path::PathBuf;
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;

use faceblur_core::blurring::infrastructure::RenderMode;
use faceblur_core::detection::domain::detector_provider::DetectorProvider;
use faceblur_core::detection::infrastructure::onnx_provider::{
    OnnxDetectorProvider, DEFAULT_DETECTOR, DETECTOR_NAMES,
};
use faceblur_core::detection::infrastructure::onnx_yolo_detector::DEFAULT_CONFIDENCE;
use faceblur_core::pipeline::batch_use_case::{BatchOptions, BatchUseCase};
use faceblur_core::pipeline::infrastructure::media_processor::MediaFileProcessor;
use faceblur_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use faceblur_core::shared::constants::CONTAINER_EXTENSIONS;
use faceblur_core::tracking::process::TrackingConfig;

/// Face de-identification for videos and images.
#[derive(Parser)]
#[command(name = "faceblur")]
struct Cli {
    /// Input files or directories (directories are searched recursively).
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory.
    #[arg(short, long)]
    output: PathBuf,

    /// Face detection model: yolo or yolo-embed.
    #[arg(long, default_value = DEFAULT_DETECTOR)]
    model: String,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    confidence: f64,

    /// Render mode: blur or debug (red outlines instead of blurring).
    #[arg(long, default_value = "blur")]
    mode: String,

    /// Blur strength multiplier.
    #[arg(long, default_value = "1.0")]
    strength: f64,

    /// Disable temporal tracking; render raw detections as-is.
    #[arg(long)]
    no_tracking: bool,

    /// Minimum IoU for a detection to join a track (0.0-1.0).
    #[arg(long)]
    min_score: Option<f64>,

    /// Drop tracks shorter than this fraction of the video (0.0-1.0).
    #[arg(long, conflicts_with = "min_face_duration")]
    min_track_size: Option<f64>,

    /// Drop tracks shorter than this many seconds.
    #[arg(long)]
    min_face_duration: Option<f64>,

    /// Longest gap, in seconds, bridged by interpolation.
    #[arg(long)]
    max_gap_duration: Option<f64>,

    /// Container format override for video outputs (e.g. mkv).
    #[arg(long)]
    format: Option<String>,

    /// Video encoder name passed to ffmpeg (default mpeg4).
    #[arg(long)]
    encoder: Option<String>,

    /// Detection worker threads (default: available CPU cores).
    #[arg(long)]
    threads: Option<usize>,

    /// Write a JSON sidecar with detected and rendered face boxes.
    #[arg(long)]
    debug_info: bool,

    /// Abort the batch at the first failed file.
    #[arg(long)]
    fail_fast: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let provider: Arc<dyn DetectorProvider> = Arc::new(
        OnnxDetectorProvider::by_name(&cli.model, cli.confidence, None)
            .ok_or_else(|| format!("Unknown model '{}'", cli.model))?,
    );
    log::info!("Using model {} (confidence {})", cli.model, cli.confidence);

    let mut tracking = TrackingConfig {
        enabled: !cli.no_tracking,
        ..TrackingConfig::default()
    };
    if let Some(score) = cli.min_score {
        tracking.min_iou_score = score;
    }
    if let Some(size) = cli.min_track_size {
        tracking.min_track_relative_size = size;
    }
    tracking.min_track_duration = cli.min_face_duration;
    if let Some(gap) = cli.max_gap_duration {
        tracking.tracking_duration = gap;
    }

    let workers = cli.threads.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    });

    let cancelled = Arc::new(AtomicBool::new(false));
    let processor = MediaFileProcessor::new(
        provider,
        parse_mode(&cli.mode),
        cli.strength,
        tracking,
        workers,
        cli.encoder.clone(),
        cli.confidence,
        cli.debug_info,
        cancelled.clone(),
    );

    let mut batch = BatchUseCase::new(
        Box::new(processor),
        BatchOptions {
            output_dir: cli.output.clone(),
            format: cli.format.map(|f| f.to_lowercase()),
            fail_fast: cli.fail_fast,
        },
        Some(cancelled),
    );

    let mut logger = StdoutPipelineLogger::default();
    let outcome = batch.execute(&cli.inputs, &mut logger)?;

    if outcome.cancelled {
        return Err("Cancelled".into());
    }
    if !outcome.failed.is_empty() {
        return Err(format!(
            "{} of {} file(s) failed",
            outcome.failed.len(),
            outcome.completed.len() + outcome.failed.len()
        )
        .into());
    }
    if outcome.completed.is_empty() && outcome.skipped.is_empty() {
        return Err("No supported input files found".into());
    }
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !DETECTOR_NAMES.contains(&cli.model.as_str()) {
        return Err(format!(
            "Model must be one of: {}, got '{}'",
            DETECTOR_NAMES.join(", "),
            cli.model
        )
        .into());
    }
    if cli.mode != "blur" && cli.mode != "debug" {
        return Err(format!("Mode must be 'blur' or 'debug', got '{}'", cli.mode).into());
    }
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )
        .into());
    }
    if cli.strength <= 0.0 {
        return Err(format!("Strength must be positive, got {}", cli.strength).into());
    }
    if let Some(score) = cli.min_score {
        if !(0.0..=1.0).contains(&score) {
            return Err(format!("Min score must be between 0.0 and 1.0, got {score}").into());
        }
    }
    if let Some(size) = cli.min_track_size {
        if !(0.0..=1.0).contains(&size) {
            return Err(format!("Min track size must be between 0.0 and 1.0, got {size}").into());
        }
    }
    if let Some(duration) = cli.min_face_duration {
        if duration < 0.0 {
            return Err(format!("Min face duration must not be negative, got {duration}").into());
        }
    }
    if let Some(gap) = cli.max_gap_duration {
        if gap < 0.0 {
            return Err(format!("Max gap duration must not be negative, got {gap}").into());
        }
    }
    if let Some(threads) = cli.threads {
        if threads == 0 {
            return Err("Threads must be at least 1".into());
        }
    }
    if let Some(ref format) = cli.format {
        if !CONTAINER_EXTENSIONS.contains(&format.to_lowercase().as_str()) {
            return Err(format!("Unsupported output format '{format}'").into());
        }
    }
    Ok(())
}

fn parse_mode(mode: &str) -> RenderMode {
    if mode == "debug" {
        RenderMode::Debug
    } else {
        RenderMode::Blur
    }
}
