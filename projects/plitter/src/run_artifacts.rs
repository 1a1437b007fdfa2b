// Run artifact struct definitions
//
// This module contains the records produced by image and video processing and
// the GeoJSON document they are exported as.

use geo_types::Point;
use serde::{Deserialize, Serialize};

/// One processed image: where it was taken and how many targets it shows.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DetectionRecord {
    #[serde(rename = "filename")]
    pub source_filename: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(rename = "plastic_count")]
    pub target_class_count: usize,
}

impl DetectionRecord {
    /// GPS position as a geographic point (x = longitude, y = latitude).
    /// `None` unless both coordinates are present.
    pub fn location(&self) -> Option<Point<f64>> {
        match (self.longitude, self.latitude) {
            (Some(lon), Some(lat)) => Some(Point::new(lon, lat)),
            _ => None,
        }
    }
}

/// Target count for one sampled video frame. `frame` is 1-based.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRecord {
    #[serde(rename = "frame")]
    pub frame_index: usize,
    #[serde(rename = "plastic_count")]
    pub target_class_count: usize,
}

/// GeoJSON `FeatureCollection` of geolocated detection records.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: Geometry,
    pub properties: FeatureProperties,
}

/// Point geometry. Coordinates are `[longitude, latitude]`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FeatureProperties {
    pub filename: String,
    pub plastic_count: usize,
}

impl Feature {
    pub fn point(location: Point<f64>, properties: FeatureProperties) -> Self {
        Self {
            kind: "Feature".to_string(),
            geometry: Geometry {
                kind: "Point".to_string(),
                coordinates: [location.x(), location.y()],
            },
            properties,
        }
    }
}

impl FeatureCollection {
    /// Builds a collection from records, leaving out any without both coordinates.
    pub fn from_records(records: &[DetectionRecord]) -> Self {
        let features = records
            .iter()
            .filter_map(|record| {
                record.location().map(|location| {
                    Feature::point(
                        location,
                        FeatureProperties {
                            filename: record.source_filename.clone(),
                            plastic_count: record.target_class_count,
                        },
                    )
                })
            })
            .collect();

        Self {
            kind: "FeatureCollection".to_string(),
            features,
        }
    }
}
