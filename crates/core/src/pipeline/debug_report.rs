use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::shared::face_box::FaceBox;
use crate::tracking::process::{ProcessedStream, TrackingConfig};

/// JSON sidecar written next to the output when debug info is requested.
///
/// For videos it records both the detector's raw output and the final
/// render lists, which is what makes tracking regressions diagnosable
/// after the fact.
#[derive(Serialize)]
pub struct DebugReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub model: String,
    pub confidence: f64,
    #[serde(flatten)]
    pub body: ReportBody,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum ReportBody {
    Image {
        faces: Vec<FaceBox>,
    },
    Video {
        tracking: TrackingConfig,
        streams: Vec<StreamReport>,
    },
}

#[derive(Serialize)]
pub struct StreamReport {
    pub stream: usize,
    /// Raw detector boxes per frame.
    pub detected: Vec<Vec<FaceBox>>,
    /// Boxes actually rendered per frame, after tracking.
    pub rendered: Vec<Vec<FaceBox>>,
}

impl StreamReport {
    pub fn from_processed(stream: usize, processed: &ProcessedStream) -> Self {
        Self {
            stream,
            detected: processed.raw.clone(),
            rendered: processed.processed.clone(),
        }
    }
}

/// Sidecar location for an output file: the output name with `.json`
/// appended, so `out/clip.mp4` reports to `out/clip.mp4.json`.
pub fn sidecar_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(".json");
    PathBuf::from(name)
}

impl DebugReport {
    pub fn write(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}
