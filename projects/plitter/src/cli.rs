use crate::pipeline::detection::DetectionSettings;
use crate::pipeline::tracker::TrackerConfig;
use crate::run_context::OutputPaths;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Image, video, or directory of media files to process
    #[arg(env = "PLITTER_INPUT")]
    pub input: PathBuf,

    /// Path to the ONNX detection model
    #[arg(long, env = "PLITTER_MODEL")]
    pub model: String,

    /// Directory for output artifacts
    #[arg(long, env = "PLITTER_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Class ids counted as litter (comma separated)
    #[arg(long, env = "PLITTER_TARGET_CLASS", value_delimiter = ',', default_value = "0")]
    pub target_class: Vec<usize>,

    /// Minimum detection confidence to count
    #[arg(long, env = "PLITTER_MIN_CONF", default_value_t = 0.25)]
    pub min_conf: f32,

    /// Long-edge inference size in pixels for images and frames (0 keeps native size)
    #[arg(long, env = "PLITTER_INFERENCE_SIZE", default_value_t = 1280)]
    pub inference_size: u32,

    /// Run detection on every n-th video frame
    #[arg(long, env = "PLITTER_SAMPLE_INTERVAL", default_value_t = 5,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub sample_interval: u32,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            detection: DetectionSettings {
                target_classes: self.target_class.clone(),
                min_confidence: self.min_conf,
                inference_size: (self.inference_size > 0).then_some(self.inference_size),
            },
            sample_interval: self.sample_interval as usize,
            outputs: OutputPaths::new(&self.output_dir),
            model: Some(self.model.clone()),
        }
    }
}
