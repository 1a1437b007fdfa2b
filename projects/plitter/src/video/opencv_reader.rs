use super::VideoReader;
use crate::error::PlitterError;
use anyhow::Result;
use opencv::{
    prelude::*,
    videoio::{
        VideoCapture, CAP_ANY, CAP_PROP_FPS, CAP_PROP_FRAME_COUNT, CAP_PROP_HW_ACCELERATION,
        VIDEO_ACCELERATION_ANY,
    },
};
use std::path::{Path, PathBuf};

/// OpenCV-backed reader. The capture is released when the reader is dropped.
pub struct OpencvReader {
    capture: VideoCapture,
    path: PathBuf,
    total_frames: usize,
}

impl OpencvReader {
    pub fn open(path: &Path) -> Result<Self, PlitterError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| PlitterError::unreadable(path, "path is not valid UTF-8"))?;

        let mut capture = VideoCapture::from_file(path_str, CAP_ANY)
            .map_err(|e| PlitterError::unreadable(path, e))?;
        if !capture.is_opened().map_err(|e| PlitterError::unreadable(path, e))? {
            return Err(PlitterError::unreadable(path, "failed to open video file"));
        }

        // Try to enable hardware acceleration (VideoToolbox on macOS, VA-API on Linux, etc.)
        match capture.set(CAP_PROP_HW_ACCELERATION, VIDEO_ACCELERATION_ANY as f64) {
            Ok(true) => tracing::debug!("Hardware acceleration enabled."),
            _ => tracing::debug!("Hardware acceleration not available or failed to enable."),
        }

        let fps = capture.get(CAP_PROP_FPS).unwrap_or(0.0);
        let raw_count = capture.get(CAP_PROP_FRAME_COUNT).unwrap_or(0.0).max(0.0) as usize;
        let duration_secs = if fps > 0.0 {
            raw_count as f64 / fps
        } else {
            0.0
        };

        tracing::info!(
            "OpencvReader: opened {}, duration={:.2}s, fps={:.2}, stream_frames={}",
            path.display(),
            duration_secs,
            fps,
            raw_count
        );

        Ok(Self {
            capture,
            path: path.to_path_buf(),
            total_frames: raw_count,
        })
    }
}

impl VideoReader for OpencvReader {
    fn frame_count(&self) -> Result<usize> {
        Ok(self.total_frames)
    }

    fn next_frame(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.empty() {
            return Ok(None);
        }
        Ok(Some(frame))
    }

    fn skip_frame(&mut self) -> Result<bool> {
        // grab() advances the demuxer without decoding pixels
        Ok(self.capture.grab()?)
    }
}

impl Drop for OpencvReader {
    fn drop(&mut self) {
        match self.capture.release() {
            Ok(()) => tracing::debug!("OpencvReader: released {}", self.path.display()),
            Err(e) => tracing::warn!(
                "OpencvReader: failed to release {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
