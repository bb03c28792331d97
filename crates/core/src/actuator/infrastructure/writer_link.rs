use std::io::Write;

use crate::actuator::domain::actuator_link::{ActuatorLink, LinkError};
use crate::tracking::domain::command::Command;

/// Writes the actuator protocol to any `io::Write`.
///
/// Backs the CLI's `--dry-run` (stdout) and is handy for capturing the exact
/// byte stream in tests.
pub struct WriterLink<W: Write> {
    writer: Option<W>,
}

impl<W: Write> WriterLink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Some(writer),
        }
    }

    /// Returns the writer, or `None` once the link has been closed.
    pub fn into_inner(mut self) -> Option<W> {
        self.writer.take()
    }
}

impl<W: Write> ActuatorLink for WriterLink<W> {
    fn send(&mut self, command: &Command) -> Result<(), LinkError> {
        let writer = self.writer.as_mut().ok_or(LinkError::Closed)?;
        writer
            .write_all(&command.to_wire())
            .and_then(|_| writer.flush())
            .map_err(LinkError::Write)
    }

    fn close(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_writes_exact_protocol_bytes() {
        let mut link = WriterLink::new(Vec::new());
        link.send(&Command::Steer(5)).unwrap();
        link.send(&Command::Steer(-12)).unwrap();
        link.send(&Command::Center).unwrap();
        link.send(&Command::Stop).unwrap();
        let bytes = link.into_inner().unwrap();
        assert_eq!(bytes, b"X5\nX-12\nCENTER\nSTOP\n");
    }

    #[test]
    fn test_send_after_close_fails() {
        let mut link = WriterLink::new(Vec::new());
        link.close();
        assert!(matches!(link.send(&Command::Stop), Err(LinkError::Closed)));
        assert!(link.into_inner().is_none());
    }

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_reported() {
        let mut link = WriterLink::new(BrokenWriter);
        assert!(matches!(
            link.send(&Command::Center),
            Err(LinkError::Write(_))
        ));
    }
}
