use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Finds faces in a frame.
///
/// Order of the returned regions is the detector's own; the controller only
/// relies on it to break ties between equally sized faces. Implementations
/// may keep state between frames, hence `&mut self`.
pub trait FaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>>;
}
