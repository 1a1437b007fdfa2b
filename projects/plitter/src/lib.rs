//! Litter detection over geotagged images and videos.
//!
//! Images are read for their EXIF GPS position and run through an object
//! detector; the number of target-class detections is exported per image as
//! JSON and GeoJSON. Videos are sampled every n-th frame and exported as
//! per-frame counts.

pub mod cli;
pub mod error;
pub mod media;
pub mod metadata;
pub mod pipeline;
pub mod run_artifacts;
pub mod run_context;
pub mod video;

#[cfg(test)]
mod testing;

pub use error::PlitterError;
pub use pipeline::detection::{DetectionSettings, Detector, ObjectDetector};
pub use pipeline::tracker::{LitterTracker, MediaOutcome, TrackerConfig};
pub use run_artifacts::{DetectionRecord, FrameRecord};
