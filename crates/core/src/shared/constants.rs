pub const YOLO_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const YOLO_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

pub const EMBEDDING_MODEL_NAME: &str = "w600k_r50.onnx";
pub const EMBEDDING_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/w600k_r50.onnx";

/// Minimum IoU between a detection and a track's most recent box for the
/// detection to join that track.
pub const DEFAULT_MIN_IOU_SCORE: f64 = 0.05;

/// Maximum Euclidean embedding distance for a detection to join a track.
pub const DEFAULT_MAX_EMBEDDING_DISTANCE: f64 = 0.6;

/// Tracks shorter than this fraction of the total frame count are treated
/// as detector false positives and filtered out.
pub const DEFAULT_MIN_TRACK_RELATIVE_SIZE: f64 = 0.25;

/// Temporal gaps up to this many seconds of footage are filled by
/// interpolation; longer gaps are treated as genuine absence.
pub const DEFAULT_TRACKING_DURATION: f64 = 1.0;

/// Frame rate assumed when the container doesn't report one.
pub const FALLBACK_FRAME_RATE: f64 = 30.0;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

pub const CONTAINER_EXTENSIONS: &[&str] = &[
    "asf", "wmv", // windows media
    "avi", // audio/video interleave
    "mov", "mp4", "m4v", "3gp", // quicktime family
    "mkv", // matroska
    "mpg", "mpeg", "vob", // MPEG-1/2
    "mjpg", // motion JPEG
    "webm",
];
