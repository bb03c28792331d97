use thiserror::Error;

use crate::shared::frame::Frame;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("cannot open capture device {device}: {source}")]
    Open {
        device: String,
        #[source]
        source: BoxedError,
    },
    #[error("capture stream ended")]
    EndOfStream,
    #[error("frame read failed: {0}")]
    Read(#[source] BoxedError),
    #[error("capture already closed")]
    Closed,
}

/// Live frame producer for the control loop (a camera, or a recording
/// standing in for one).
///
/// Any error from `read` ends the loop: there is no frame to act on, so
/// the loop shuts the actuator down instead of guessing.
pub trait FrameSource {
    fn read(&mut self) -> Result<Frame, CaptureError>;

    /// Releases the device. Reads after this return `Closed`.
    fn close(&mut self);
}
