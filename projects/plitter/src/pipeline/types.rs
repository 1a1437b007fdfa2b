use serde::Serialize;

/// Bounding box in pixels of the image handed to the detector.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// One detector output. Only `class_id` and `confidence` feed the counts.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Detection {
    pub class_id: usize,
    pub bbox: BBox,
    pub confidence: f32,
}
