use std::path::PathBuf;

use thiserror::Error;

use crate::tracking::track::TrackingError;

/// Per-file failure modes of the de-identification pipeline.
///
/// `Cancelled` is deliberately a distinct variant rather than a flavor of
/// failure: callers report it differently and it carries no blame.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("cancelled")]
    Cancelled,

    /// The container could not be opened or demuxed at all. Individual
    /// undecodable frames are skipped inside the reader and never surface
    /// here.
    #[error("cannot read {path}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("detection failed: {message}")]
    Detection { message: String },

    #[error(transparent)]
    Tracking(#[from] TrackingError),

    /// Encoding, muxing or rendering failure while producing the output.
    #[error("cannot write {path}: {message}")]
    Encode { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn decode(path: &std::path::Path, source: Box<dyn std::error::Error>) -> Self {
        Self::Decode {
            path: path.to_path_buf(),
            message: source.to_string(),
        }
    }

    pub fn encode(path: &std::path::Path, source: Box<dyn std::error::Error>) -> Self {
        Self::Encode {
            path: path.to_path_buf(),
            message: source.to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
