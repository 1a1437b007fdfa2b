use crate::error::PlitterError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// Classifies a path by its extension alone (case-insensitive).
pub fn kind_from_extension(path: &Path) -> Option<MediaKind> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Image)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

/// Checks that `path` is an existing regular file and classifies it.
pub fn classify(path: &Path) -> Result<MediaKind, PlitterError> {
    if !path.is_file() {
        return Err(PlitterError::InvalidPath(path.to_path_buf()));
    }
    kind_from_extension(path).ok_or_else(|| PlitterError::UnsupportedFormat(path.to_path_buf()))
}

/// Recursively lists supported media files under `root`, sorted by path.
pub fn list_media(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| kind_from_extension(e.path()).is_some())
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

/// File name component used in exported records.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}
