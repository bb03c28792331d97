use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::tracking::domain::command::Command;

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("cannot open actuator link {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("write did not complete within {0:?}")]
    Timeout(Duration),
    #[error("write failed: {0}")]
    Write(#[source] io::Error),
    #[error("link already closed")]
    Closed,
}

impl LinkError {
    /// Classifies an I/O error from a write bounded by `timeout`.
    pub fn from_write(err: io::Error, timeout: Duration) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => LinkError::Timeout(timeout),
            _ => LinkError::Write(err),
        }
    }
}

/// Byte-oriented transport to the pan actuator.
///
/// A failed `send` is reported, never retried: steering is re-evaluated on
/// the next frame anyway, and a retry would stall frame capture.
pub trait ActuatorLink {
    fn send(&mut self, command: &Command) -> Result<(), LinkError>;

    /// Releases the underlying device. Further sends return `Closed`.
    fn close(&mut self);
}
