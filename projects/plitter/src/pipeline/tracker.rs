use crate::error::PlitterError;
use crate::media::{self, MediaKind};
use crate::pipeline::detection::{DetectionSettings, Detector};
use crate::pipeline::video_processor::DEFAULT_SAMPLE_INTERVAL;
use crate::pipeline::{export, image_processor, video_processor};
use crate::run_artifacts::{DetectionRecord, FrameRecord};
use crate::run_context::{OutputPaths, RunManifest};
use anyhow::Result;
use chrono::Utc;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub detection: DetectionSettings,
    /// Every n-th video frame is run through the detector. Values below 1 act as 1.
    pub sample_interval: usize,
    pub outputs: OutputPaths,
    /// Model reference recorded in the run manifest.
    pub model: Option<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            detection: DetectionSettings::default(),
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            outputs: OutputPaths::default(),
            model: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaOutcome {
    /// `None` when the image had no usable GPS position or could not be analyzed.
    Image(Option<DetectionRecord>),
    Video(Vec<FrameRecord>),
}

/// Routes media files to the image or video pipeline and exports the results.
pub struct LitterTracker<D: Detector> {
    detector: D,
    config: TrackerConfig,
}

impl<D: Detector> LitterTracker<D> {
    pub fn new(detector: D, config: TrackerConfig) -> Self {
        Self { detector, config }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Classifies `path` and processes it. Invalid paths and unsupported
    /// extensions fail before anything is written.
    pub fn load(&mut self, path: &Path) -> Result<MediaOutcome> {
        match media::classify(path)? {
            MediaKind::Image => Ok(MediaOutcome::Image(self.process_image(path)?)),
            MediaKind::Video => Ok(MediaOutcome::Video(self.process_video(path)?)),
        }
    }

    pub fn process_image(&mut self, path: &Path) -> Result<Option<DetectionRecord>> {
        image_processor::process_image(
            path,
            &mut self.detector,
            &self.config.detection,
            &self.config.outputs.geojson,
        )
    }

    pub fn process_video(&mut self, path: &Path) -> Result<Vec<FrameRecord>> {
        let json_path = self.config.outputs.video_json.clone();
        self.process_video_to(path, &json_path)
    }

    pub fn process_video_to(&mut self, path: &Path, json_path: &Path) -> Result<Vec<FrameRecord>> {
        video_processor::process_video(
            path,
            &mut self.detector,
            &self.config.detection,
            self.config.sample_interval,
            json_path,
        )
    }

    /// Processes every supported file under `dir`.
    ///
    /// Writes all image records to `output.json`, the geolocated ones to
    /// `output.geojson`, each video to its own `*.video.json` and a run manifest.
    /// Per-file failures are logged and counted; export failures abort the run.
    pub fn process_directory(&mut self, dir: &Path) -> Result<RunManifest> {
        if !dir.is_dir() {
            return Err(PlitterError::InvalidPath(dir.to_path_buf()).into());
        }
        self.config.outputs.ensure_dir()?;

        let files = media::list_media(dir);
        tracing::info!("Found {} media file(s) in {}", files.len(), dir.display());

        let mut manifest = RunManifest {
            input: dir.display().to_string(),
            created_at: Utc::now(),
            model: self.config.model.clone(),
            target_classes: self.config.detection.target_classes.clone(),
            sample_interval: self.config.sample_interval,
            inference_size: self.config.detection.inference_size,
            images_processed: 0,
            images_without_result: 0,
            videos_processed: 0,
            videos_failed: 0,
            sampled_frames: 0,
        };
        let mut records = Vec::new();
        let mut video_names = HashSet::new();

        for path in &files {
            match media::kind_from_extension(path) {
                Some(MediaKind::Image) => match image_processor::analyze_or_skip(
                    path,
                    &mut self.detector,
                    &self.config.detection,
                ) {
                    Some(record) => {
                        manifest.images_processed += 1;
                        records.push(record);
                    }
                    None => manifest.images_without_result += 1,
                },
                Some(MediaKind::Video) => {
                    let json_path = self
                        .config
                        .outputs
                        .video_json_for(dir, path, &mut video_names);
                    match self.process_video_to(path, &json_path) {
                        Ok(frames) => {
                            manifest.videos_processed += 1;
                            manifest.sampled_frames += frames.len();
                        }
                        Err(e) if is_export_failure(&e) => return Err(e),
                        Err(e) => {
                            tracing::warn!("Skipping {}: {:#}", path.display(), e);
                            manifest.videos_failed += 1;
                        }
                    }
                }
                None => {}
            }
        }

        let outputs = &self.config.outputs;
        export::write_json(&records, &outputs.detections_json)?;
        export::write_geojson(&records, &outputs.geojson)?;
        export::write_json(&manifest, &outputs.manifest)?;

        tracing::info!(
            "Run complete: {} image record(s), {} without result, {} video(s), {} failed",
            manifest.images_processed,
            manifest.images_without_result,
            manifest.videos_processed,
            manifest.videos_failed
        );

        Ok(manifest)
    }
}

fn is_export_failure(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<PlitterError>(),
        Some(PlitterError::Io { .. })
    )
}
