//! GPS position from embedded EXIF metadata.
//!
//! Latitude and longitude are stored as degree/minute/second rationals plus a
//! hemisphere reference (`N`/`S`, `E`/`W`). They are converted to signed
//! decimal degrees rounded to 6 places.

use crate::error::PlitterError;
use exif::{Exif, In, Reader, Tag, Value};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// `degrees + minutes/60 + seconds/3600`, unsigned and unrounded.
pub fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    degrees + minutes / 60.0 + seconds / 3600.0
}

pub fn round_to_6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

/// Reads the GPS position from an image container (JPEG, PNG, ...).
pub fn read_gps<R: BufRead + Seek>(reader: &mut R) -> Result<GpsCoordinates, PlitterError> {
    let exif = Reader::new().read_from_container(reader).map_err(|e| {
        tracing::debug!("EXIF parse failed: {}", e);
        PlitterError::NoMetadata
    })?;
    gps_from_exif(&exif)
}

pub fn read_gps_from_path(path: &Path) -> Result<GpsCoordinates, PlitterError> {
    let file = File::open(path).map_err(|e| PlitterError::unreadable(path, e))?;
    read_gps(&mut BufReader::new(file))
}

pub fn gps_from_exif(exif: &Exif) -> Result<GpsCoordinates, PlitterError> {
    let latitude = coordinate(exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, b'S', "latitude")?;
    let longitude = coordinate(exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, b'W', "longitude")?;

    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(PlitterError::CoordinateOutOfRange {
            latitude,
            longitude,
        });
    }

    Ok(GpsCoordinates {
        latitude,
        longitude,
    })
}

fn coordinate(
    exif: &Exif,
    value_tag: Tag,
    ref_tag: Tag,
    negative_ref: u8,
    axis: &'static str,
) -> Result<f64, PlitterError> {
    let field = exif
        .get_field(value_tag, In::PRIMARY)
        .ok_or(PlitterError::MissingGps(axis))?;

    let decimal = match &field.value {
        Value::Rational(parts) if parts.len() >= 3 => {
            dms_to_decimal(parts[0].to_f64(), parts[1].to_f64(), parts[2].to_f64())
        }
        _ => return Err(PlitterError::MissingGps(axis)),
    };

    // A missing reference reads as north/east.
    let negative = exif
        .get_field(ref_tag, In::PRIMARY)
        .and_then(|f| match &f.value {
            Value::Ascii(values) => values.first().and_then(|s| s.first().copied()),
            _ => None,
        })
        .map(|c| c.eq_ignore_ascii_case(&negative_ref))
        .unwrap_or(false);

    let signed = if negative { -decimal } else { decimal };
    Ok(round_to_6(signed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{gps_fields, jpeg_with_exif, plain_jpeg, png_with_exif};
    use std::io::Cursor;

    #[test]
    fn test_dms_to_decimal() {
        assert_eq!(round_to_6(dms_to_decimal(13.0, 45.0, 30.0)), 13.758333);
        assert_eq!(dms_to_decimal(10.0, 30.0, 0.0), 10.5);
        assert_eq!(dms_to_decimal(0.0, 0.0, 36.0), 0.01);
    }

    #[test]
    fn test_round_to_6() {
        assert_eq!(round_to_6(1.23456749), 1.234567);
        assert_eq!(round_to_6(-2.5000004), -2.5);
        assert_eq!(round_to_6(100.0), 100.0);
    }

    #[test]
    fn test_read_gps_north_east() {
        let fields = gps_fields(((13, 45, 30), "N"), ((100, 30, 0), "E"));
        let bytes = jpeg_with_exif(&fields);
        let gps = read_gps(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(gps.latitude, 13.758333);
        assert_eq!(gps.longitude, 100.5);
    }

    #[test]
    fn test_read_gps_south_west_is_negative() {
        let fields = gps_fields(((33, 52, 4), "S"), ((151, 12, 36), "W"));
        let bytes = jpeg_with_exif(&fields);
        let gps = read_gps(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(gps.latitude, -33.867778);
        assert_eq!(gps.longitude, -151.21);
    }

    #[test]
    fn test_read_gps_missing_refs_read_as_north_east() {
        let mut fields = gps_fields(((33, 52, 4), "S"), ((151, 12, 36), "W"));
        fields.retain(|f| f.tag != Tag::GPSLatitudeRef && f.tag != Tag::GPSLongitudeRef);
        let bytes = jpeg_with_exif(&fields);
        let gps = read_gps(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(gps.latitude, 33.867778);
        assert_eq!(gps.longitude, 151.21);
    }

    #[test]
    fn test_read_gps_from_png() {
        let fields = gps_fields(((13, 45, 30), "N"), ((2, 0, 0), "W"));
        let bytes = png_with_exif(&fields);
        let gps = read_gps(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(gps.latitude, 13.758333);
        assert_eq!(gps.longitude, -2.0);
    }

    #[test]
    fn test_read_gps_without_exif() {
        let bytes = plain_jpeg();
        let err = read_gps(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, PlitterError::NoMetadata));
    }

    #[test]
    fn test_read_gps_missing_longitude() {
        let mut fields = gps_fields(((13, 45, 30), "N"), ((100, 30, 0), "E"));
        fields.retain(|f| f.tag != Tag::GPSLongitude);
        let bytes = jpeg_with_exif(&fields);
        let err = read_gps(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, PlitterError::MissingGps("longitude")));
    }

    #[test]
    fn test_read_gps_rejects_out_of_range_latitude() {
        let fields = gps_fields(((95, 0, 0), "N"), ((10, 0, 0), "E"));
        let bytes = jpeg_with_exif(&fields);
        let err = read_gps(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, PlitterError::CoordinateOutOfRange { .. }));
    }

    #[test]
    fn test_read_gps_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_gps_from_path(&dir.path().join("gone.jpg")).unwrap_err();
        assert!(matches!(err, PlitterError::UnreadableMedia { .. }));
    }
}
