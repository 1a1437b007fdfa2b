use crate::error::PlitterError;
use crate::pipeline::types::{BBox, Detection};
use anyhow::{anyhow, Result};
use image::imageops::FilterType;
use image::{DynamicImage, ImageBuffer, Rgb};
use opencv::core::Mat;
use opencv::prelude::*;
use std::borrow::Cow;
use usls::models::RTDETR;
use usls::{Config, Hbb, Image};

pub const DEFAULT_INFERENCE_SIZE: u32 = 1280;
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.25;

/// Anything that turns one image into a list of detections.
pub trait Detector {
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<Detection>>;
}

/// Which detections count, and at what resolution inference runs.
/// Images and video frames share the same settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionSettings {
    /// Class ids counted as litter. A single-class litter model uses `[0]`.
    pub target_classes: Vec<usize>,
    pub min_confidence: f32,
    /// Model input resolution. Larger images are downscaled to this long edge
    /// before inference. `None` keeps native size.
    pub inference_size: Option<u32>,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            target_classes: vec![0],
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            inference_size: Some(DEFAULT_INFERENCE_SIZE),
        }
    }
}

impl DetectionSettings {
    pub fn is_target(&self, detection: &Detection) -> bool {
        detection.confidence >= self.min_confidence
            && self.target_classes.contains(&detection.class_id)
    }

    pub fn count_targets(&self, detections: &[Detection]) -> usize {
        detections.iter().filter(|d| self.is_target(d)).count()
    }

    /// Downscales so the longer edge fits `inference_size`, keeping the aspect ratio.
    /// Smaller images are passed through untouched.
    pub fn prepare<'a>(&self, image: &'a DynamicImage) -> Cow<'a, DynamicImage> {
        match self.inference_size {
            Some(size) if size > 0 && image.width().max(image.height()) > size => {
                Cow::Owned(image.resize(size, size, FilterType::Triangle))
            }
            _ => Cow::Borrowed(image),
        }
    }
}

/// Runs `detector` on `image` and returns the number of target detections.
pub fn count_targets(
    detector: &mut dyn Detector,
    image: &DynamicImage,
    settings: &DetectionSettings,
) -> Result<usize, PlitterError> {
    let input = settings.prepare(image);
    let detections = detector
        .detect(&input)
        .map_err(|e| PlitterError::Inference(format!("{:#}", e)))?;
    Ok(settings.count_targets(&detections))
}

/// A wrapper around the USLS RT-DETR model.
pub struct ObjectDetector {
    model: RTDETR,
}

impl ObjectDetector {
    /// Create a new detector with the given model path. `inference_size` fixes
    /// the model's input height and width; `None` keeps the model's own size.
    pub fn new(model_path: &str, inference_size: Option<u32>) -> Result<Self> {
        let mut config = Config::default()
            .with_model_file(model_path)
            .with_class_names(&usls::NAMES_COCO_80);

        if let Some(size) = inference_size.filter(|&s| s > 0) {
            let size = size as usize;
            config = config
                .with_model_ixx(0, 2, size.into())
                .with_model_ixx(0, 3, size.into());
        }

        #[cfg(target_os = "macos")]
        let config = config.with_model_device(usls::Device::CoreMl);

        let config = config.commit()?;
        let model = RTDETR::new(config)?;
        Ok(Self { model })
    }

    /// Run detection on a batch of images.
    pub fn detect_batch(&mut self, images: &[DynamicImage]) -> Result<Vec<Vec<Detection>>> {
        let usls_images: Vec<Image> = images.iter().cloned().map(Image::from).collect();
        let results = self.model.forward(&usls_images)?;

        Ok(results
            .into_iter()
            .map(|y| y.hbbs.iter().filter_map(detection_from_hbb).collect())
            .collect())
    }
}

/// Boxes without a class id are dropped; they cannot be matched to a target class.
fn detection_from_hbb(hbb: &Hbb) -> Option<Detection> {
    let class_id = hbb.id()?;
    Some(Detection {
        class_id,
        bbox: BBox {
            x: hbb.xmin(),
            y: hbb.ymin(),
            w: hbb.width(),
            h: hbb.height(),
        },
        confidence: hbb.confidence().unwrap_or(0.0),
    })
}

impl Detector for ObjectDetector {
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<Detection>> {
        let results = self.detect_batch(std::slice::from_ref(image))?;
        Ok(results.into_iter().next().unwrap_or_default())
    }
}

/// Convert an OpenCV Mat (BGR) to an image::DynamicImage (RGB)
pub fn mat_to_dynamic_image(mat: &Mat) -> Result<DynamicImage> {
    let mut rgb_mat = Mat::default();
    opencv::imgproc::cvt_color_def(mat, &mut rgb_mat, opencv::imgproc::COLOR_BGR2RGB)?;

    let size = rgb_mat.size()?;
    let width = size.width as u32;
    let height = size.height as u32;

    if !rgb_mat.is_continuous() {
        return Err(anyhow!("Mat is not continuous"));
    }

    let data_bytes = rgb_mat.data_bytes()?;
    let buffer = data_bytes.to_vec();

    let img_buffer = ImageBuffer::<Rgb<u8>, _>::from_vec(width, height, buffer)
        .ok_or_else(|| anyhow!("Failed to create ImageBuffer from Mat data"))?;

    Ok(DynamicImage::ImageRgb8(img_buffer))
}
