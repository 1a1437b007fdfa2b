use crate::error::PlitterError;
use crate::run_artifacts::{DetectionRecord, FeatureCollection};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes `value` as JSON indented by 4 spaces, replacing any existing file.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), PlitterError> {
    let io_err = |source: std::io::Error| PlitterError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    let mut serializer =
        Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    value
        .serialize(&mut serializer)
        .map_err(|e| io_err(e.into()))?;
    writer.flush().map_err(io_err)?;

    tracing::info!("JSON saved: {}", path.display());
    Ok(())
}

/// Writes the geolocated subset of `records` as a GeoJSON FeatureCollection.
/// Returns the number of features written.
pub fn write_geojson(records: &[DetectionRecord], path: &Path) -> Result<usize, PlitterError> {
    let collection = FeatureCollection::from_records(records);
    write_json(&collection, path)?;
    tracing::info!(
        "GeoJSON saved: {} ({} feature(s))",
        path.display(),
        collection.features.len()
    );
    Ok(collection.features.len())
}
