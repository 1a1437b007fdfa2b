// Detection pipeline: per-file dispatch, image/video processing and export

pub mod detection;
pub mod export;
pub mod image_processor;
pub mod tracker;
pub mod types;
pub mod video_processor;
