use std::path::Path;

use crate::shared::frame::Frame;

/// Persists a frame as an image file.
pub trait ImageWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;
}
