use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Decorator that discards faces smaller than `min_size` on either side.
///
/// Tiny boxes are mostly false positives or people far in the background;
/// letting them win the largest-area vote when nobody else is in view
/// makes the mount swing toward noise.
pub struct MinSizeDetector {
    inner: Box<dyn FaceDetector>,
    min_size: i32,
}

impl MinSizeDetector {
    pub fn new(inner: Box<dyn FaceDetector>, min_size: i32) -> Self {
        Self { inner, min_size }
    }
}

impl FaceDetector for MinSizeDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        let min = self.min_size;
        Ok(self
            .inner
            .detect(frame)?
            .into_iter()
            .filter(|r| r.width >= min && r.height >= min)
            .collect())
    }
}
