use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const DETECTIONS_JSON: &str = "output.json";
pub const DETECTIONS_GEOJSON: &str = "output.geojson";
pub const VIDEO_JSON: &str = "video.json";
pub const MANIFEST_JSON: &str = "metadata.json";

/// Where a run writes its artifacts.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    pub dir: PathBuf,
    pub detections_json: PathBuf,
    pub geojson: PathBuf,
    pub video_json: PathBuf,
    pub manifest: PathBuf,
}

impl OutputPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            detections_json: dir.join(DETECTIONS_JSON),
            geojson: dir.join(DETECTIONS_GEOJSON),
            video_json: dir.join(VIDEO_JSON),
            manifest: dir.join(MANIFEST_JSON),
            dir,
        }
    }

    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create output directory {}", self.dir.display()))
    }

    /// Per-video output used by directory runs. The name is the video's path
    /// relative to `root` with separators flattened, so `a/clip.mp4` becomes
    /// `a_clip.mp4.video.json`. A name already in `taken` (compared without
    /// case) gets a `-2`, `-3`, ... suffix.
    pub fn video_json_for(
        &self,
        root: &Path,
        video: &Path,
        taken: &mut HashSet<String>,
    ) -> PathBuf {
        let relative = video.strip_prefix(root).unwrap_or(video);
        let parts: Vec<&str> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => part.to_str(),
                _ => None,
            })
            .collect();
        let base = if parts.is_empty() {
            "video".to_string()
        } else {
            parts.join("_")
        };

        let mut name = base.clone();
        let mut n = 1;
        while !taken.insert(name.to_lowercase()) {
            n += 1;
            name = format!("{}-{}", base, n);
        }
        self.dir.join(format!("{}.{}", name, VIDEO_JSON))
    }
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Summary of a directory run, persisted as `metadata.json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunManifest {
    pub input: String,
    pub created_at: DateTime<Utc>,
    pub model: Option<String>,
    pub target_classes: Vec<usize>,
    pub sample_interval: usize,
    pub inference_size: Option<u32>,
    pub images_processed: usize,
    pub images_without_result: usize,
    pub videos_processed: usize,
    pub videos_failed: usize,
    pub sampled_frames: usize,
}

impl RunManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
