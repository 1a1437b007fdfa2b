use crate::error::PlitterError;
use crate::media::{self, MediaKind};
use crate::pipeline::detection::{self, mat_to_dynamic_image, DetectionSettings, Detector};
use crate::pipeline::export;
use crate::run_artifacts::FrameRecord;
use crate::video::opencv_reader::OpencvReader;
use crate::video::processor::process_sampled;
use crate::video::VideoReader;
use anyhow::{Context, Result};
use opencv::core::Mat;
use std::path::Path;

pub const DEFAULT_SAMPLE_INTERVAL: usize = 5;

/// Counts targets on every `sample_interval`-th frame of `reader`.
///
/// A frame that fails conversion or inference is logged and left out of the
/// result; the remaining frames are still processed.
pub fn analyze_video(
    reader: &mut dyn VideoReader,
    detector: &mut dyn Detector,
    settings: &DetectionSettings,
    sample_interval: usize,
) -> Result<Vec<FrameRecord>> {
    let mut records = Vec::new();

    let process_frame = |frame_index: usize, frame: Mat| -> Result<()> {
        let counted = mat_to_dynamic_image(&frame)
            .map_err(|e| PlitterError::Inference(format!("frame conversion: {:#}", e)))
            .and_then(|image| detection::count_targets(detector, &image, settings));

        match counted {
            Ok(count) => {
                tracing::debug!("frame {}: {} target(s)", frame_index, count);
                records.push(FrameRecord {
                    frame_index,
                    target_class_count: count,
                });
            }
            Err(e) => tracing::warn!("Skipping frame {}: {}", frame_index, e),
        }
        Ok(())
    };
    let stats = process_sampled(reader, sample_interval, process_frame)?;

    tracing::info!(
        "Processed {} frame(s), {} sampled, {} recorded in {:.2?}",
        stats.frames_read,
        stats.sampled_frames,
        records.len(),
        stats.duration
    );

    Ok(records)
}

/// Like [`analyze_video`], but takes ownership of `reader` so the underlying
/// stream is closed before this returns, on success or error.
pub fn analyze_and_close<R: VideoReader>(
    mut reader: R,
    detector: &mut dyn Detector,
    settings: &DetectionSettings,
    sample_interval: usize,
) -> Result<Vec<FrameRecord>> {
    analyze_video(&mut reader, detector, settings, sample_interval)
}

/// Decodes the video at `path`, counts targets on sampled frames and writes
/// the records to `json_path`.
///
/// The capture is released before this returns, whether or not decoding succeeded.
pub fn process_video(
    path: &Path,
    detector: &mut dyn Detector,
    settings: &DetectionSettings,
    sample_interval: usize,
    json_path: &Path,
) -> Result<Vec<FrameRecord>> {
    if media::classify(path)? != MediaKind::Video {
        return Err(PlitterError::UnsupportedFormat(path.to_path_buf()).into());
    }

    let reader = OpencvReader::open(path)?;
    let records = analyze_and_close(reader, detector, settings, sample_interval)
        .with_context(|| format!("Failed while decoding {}", path.display()))?;

    export::write_json(&records, json_path)?;
    Ok(records)
}
