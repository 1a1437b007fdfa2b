// Test fixtures shared by the module test suites.

use crate::pipeline::detection::Detector;
use crate::pipeline::types::{BBox, Detection};
use crate::video::VideoReader;
use anyhow::{anyhow, Result};
use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use image::{DynamicImage, ImageFormat};
use opencv::core::{Mat, Scalar, CV_8UC3};
use opencv::prelude::*;
use std::cell::Cell;
use std::collections::VecDeque;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::rc::Rc;

type Dms = (u32, u32, u32);

fn dms_value((d, m, s): Dms) -> Value {
    Value::Rational(vec![
        Rational { num: d, denom: 1 },
        Rational { num: m, denom: 1 },
        Rational { num: s, denom: 1 },
    ])
}

fn ascii(s: &str) -> Value {
    Value::Ascii(vec![s.as_bytes().to_vec()])
}

/// GPS latitude/longitude fields with their hemisphere references.
pub fn gps_fields(lat: (Dms, &str), lon: (Dms, &str)) -> Vec<Field> {
    vec![
        Field {
            tag: Tag::GPSLatitudeRef,
            ifd_num: In::PRIMARY,
            value: ascii(lat.1),
        },
        Field {
            tag: Tag::GPSLatitude,
            ifd_num: In::PRIMARY,
            value: dms_value(lat.0),
        },
        Field {
            tag: Tag::GPSLongitudeRef,
            ifd_num: In::PRIMARY,
            value: ascii(lon.1),
        },
        Field {
            tag: Tag::GPSLongitude,
            ifd_num: In::PRIMARY,
            value: dms_value(lon.0),
        },
    ]
}

/// Non-GPS field, for EXIF blocks that carry no position.
pub fn software_field() -> Field {
    Field {
        tag: Tag::Software,
        ifd_num: In::PRIMARY,
        value: ascii("plitter-test"),
    }
}

/// Small solid-color JPEG without any metadata.
pub fn plain_jpeg() -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::new_rgb8(16, 12)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .unwrap();
    bytes
}

fn tiff_block(fields: &[Field]) -> Vec<u8> {
    let mut tiff = Cursor::new(Vec::new());
    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    writer.write(&mut tiff, false).unwrap();
    tiff.into_inner()
}

/// JPEG carrying the given fields in an APP1 Exif segment right after SOI.
pub fn jpeg_with_exif(fields: &[Field]) -> Vec<u8> {
    let tiff = tiff_block(fields);
    let jpeg = plain_jpeg();
    let segment_len = (2 + 6 + tiff.len()) as u16;
    let mut out = Vec::with_capacity(jpeg.len() + tiff.len() + 10);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// PNG carrying the given fields in an `eXIf` chunk right after IHDR.
pub fn png_with_exif(fields: &[Field]) -> Vec<u8> {
    let tiff = tiff_block(fields);
    let mut png = Vec::new();
    DynamicImage::new_rgb8(16, 12)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();

    // signature + IHDR (length, type, 13 data bytes, crc)
    let split = 8 + 4 + 4 + 13 + 4;
    let mut body = b"eXIf".to_vec();
    body.extend_from_slice(&tiff);

    let mut out = Vec::with_capacity(png.len() + body.len() + 8);
    out.extend_from_slice(&png[..split]);
    out.extend_from_slice(&(tiff.len() as u32).to_be_bytes());
    out.extend_from_slice(&body);
    out.extend_from_slice(&crc32fast::hash(&body).to_be_bytes());
    out.extend_from_slice(&png[split..]);
    out
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

pub fn detection(class_id: usize, confidence: f32) -> Detection {
    Detection {
        class_id,
        bbox: BBox {
            x: 1.0,
            y: 1.0,
            w: 4.0,
            h: 4.0,
        },
        confidence,
    }
}

/// Detector that replays queued responses, then repeats `fallback`.
pub struct ScriptedDetector {
    pub responses: VecDeque<Result<Vec<Detection>>>,
    pub fallback: Vec<Detection>,
    pub calls: usize,
    pub last_size: Option<(u32, u32)>,
}

impl ScriptedDetector {
    pub fn always(detections: Vec<Detection>) -> Self {
        Self {
            responses: VecDeque::new(),
            fallback: detections,
            calls: 0,
            last_size: None,
        }
    }

    pub fn with_responses(responses: Vec<Result<Vec<Detection>>>) -> Self {
        Self {
            responses: responses.into(),
            fallback: Vec::new(),
            calls: 0,
            last_size: None,
        }
    }
}

impl Detector for ScriptedDetector {
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<Detection>> {
        self.calls += 1;
        self.last_size = Some((image.width(), image.height()));
        match self.responses.pop_front() {
            Some(response) => response,
            None => Ok(self.fallback.clone()),
        }
    }
}

/// In-memory video of `frames` black BGR frames.
pub struct MemoryReader {
    remaining: usize,
    total: usize,
    pub fail_at: Option<usize>,
    pub decoded: usize,
    /// Set once the reader is dropped.
    pub released: Rc<Cell<bool>>,
}

impl MemoryReader {
    pub fn new(frames: usize) -> Self {
        Self {
            remaining: frames,
            total: frames,
            fail_at: None,
            decoded: 0,
            released: Rc::new(Cell::new(false)),
        }
    }

    fn position(&self) -> usize {
        self.total - self.remaining + 1
    }
}

impl VideoReader for MemoryReader {
    fn frame_count(&self) -> Result<usize> {
        Ok(self.total)
    }

    fn next_frame(&mut self) -> Result<Option<Mat>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        if self.fail_at == Some(self.position()) {
            return Err(anyhow!("corrupt packet at frame {}", self.position()));
        }
        self.remaining -= 1;
        self.decoded += 1;
        let mat = Mat::new_rows_cols_with_default(8, 12, CV_8UC3, Scalar::all(0.0))?;
        Ok(Some(mat))
    }

    fn skip_frame(&mut self) -> Result<bool> {
        if self.remaining == 0 {
            return Ok(false);
        }
        self.remaining -= 1;
        Ok(true)
    }
}

impl Drop for MemoryReader {
    fn drop(&mut self) {
        self.released.set(true);
    }
}
