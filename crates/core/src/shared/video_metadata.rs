use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// Frame rate with a sane fallback for containers that don't report one
    /// (and for still images, which use `fps = 0`).
    pub fn frame_rate_or(&self, fallback: f64) -> f64 {
        if self.fps > 0.0 {
            self.fps
        } else {
            fallback
        }
    }
}
