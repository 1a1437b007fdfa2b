use std::path::PathBuf;
use thiserror::Error;

/// Failure kinds surfaced by the detection pipeline.
///
/// Most functions return `anyhow::Result`; callers that need to branch on the
/// kind use `err.downcast_ref::<PlitterError>()`.
#[derive(Debug, Error)]
pub enum PlitterError {
    #[error("Invalid file path: {0}")]
    InvalidPath(PathBuf),

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("No EXIF data found")]
    NoMetadata,

    #[error("Missing GPS coordinates in EXIF data ({0})")]
    MissingGps(&'static str),

    #[error("GPS coordinate out of range: latitude={latitude}, longitude={longitude}")]
    CoordinateOutOfRange { latitude: f64, longitude: f64 },

    #[error("Cannot read media {path}: {reason}")]
    UnreadableMedia { path: PathBuf, reason: String },

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PlitterError {
    pub fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::UnreadableMedia {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
