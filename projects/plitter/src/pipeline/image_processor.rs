use crate::error::PlitterError;
use crate::media::{self, MediaKind};
use crate::metadata;
use crate::pipeline::detection::{self, DetectionSettings, Detector};
use crate::pipeline::export;
use crate::run_artifacts::DetectionRecord;
use anyhow::Result;
use std::path::Path;

/// Reads GPS metadata and counts targets in one image.
///
/// Metadata is checked before inference runs, so images without a position
/// never reach the detector.
pub fn analyze_image(
    path: &Path,
    detector: &mut dyn Detector,
    settings: &DetectionSettings,
) -> Result<DetectionRecord, PlitterError> {
    let gps = metadata::read_gps_from_path(path)?;

    let image = image::open(path).map_err(|e| PlitterError::unreadable(path, e))?;
    let count = detection::count_targets(detector, &image, settings)?;

    Ok(DetectionRecord {
        source_filename: media::display_name(path),
        latitude: Some(gps.latitude),
        longitude: Some(gps.longitude),
        target_class_count: count,
    })
}

/// Runs [`analyze_image`], logging a failure instead of returning it.
pub fn analyze_or_skip(
    path: &Path,
    detector: &mut dyn Detector,
    settings: &DetectionSettings,
) -> Option<DetectionRecord> {
    match analyze_image(path, detector, settings) {
        Ok(record) => {
            tracing::info!(
                "{}: {} target(s) at ({}, {})",
                record.source_filename,
                record.target_class_count,
                record.latitude.unwrap_or_default(),
                record.longitude.unwrap_or_default()
            );
            Some(record)
        }
        Err(e) => {
            tracing::warn!("Error processing image {}: {}", path.display(), e);
            None
        }
    }
}

/// Processes one image and writes its record to `geojson_path`.
///
/// Invalid or non-image paths are returned as errors. Missing EXIF/GPS and
/// decode or inference failures are logged and yield `Ok(None)`. Export
/// failures are returned as errors.
pub fn process_image(
    path: &Path,
    detector: &mut dyn Detector,
    settings: &DetectionSettings,
    geojson_path: &Path,
) -> Result<Option<DetectionRecord>> {
    if media::classify(path)? != MediaKind::Image {
        return Err(PlitterError::UnsupportedFormat(path.to_path_buf()).into());
    }

    let Some(record) = analyze_or_skip(path, detector, settings) else {
        return Ok(None);
    };

    export::write_geojson(std::slice::from_ref(&record), geojson_path)?;
    Ok(Some(record))
}
