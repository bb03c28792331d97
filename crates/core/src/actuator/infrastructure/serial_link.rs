use std::io::Write;
use std::time::Duration;

use crate::actuator::domain::actuator_link::{ActuatorLink, LinkError};
use crate::tracking::domain::command::Command;

/// Actuator link over a serial port (USB CDC boards, FTDI adapters, ...).
///
/// Writes are bounded by the port timeout so a stalled board cannot hold up
/// frame capture for longer than `write_timeout`.
pub struct SerialLink {
    port: Option<Box<dyn serialport::SerialPort>>,
    name: String,
    write_timeout: Duration,
}

impl SerialLink {
    /// Opens `port` at `baud_rate`, then waits `settle` before returning.
    ///
    /// Many microcontroller boards reset when the port opens and drop bytes
    /// sent during boot; `settle` covers that window.
    pub fn open(
        port: &str,
        baud_rate: u32,
        write_timeout: Duration,
        settle: Duration,
    ) -> Result<Self, LinkError> {
        let handle = serialport::new(port, baud_rate)
            .timeout(write_timeout)
            .open()
            .map_err(|e| LinkError::Open {
                port: port.to_string(),
                source: Box::new(e),
            })?;
        log::info!("Opened serial link {port} at {baud_rate} baud");

        if !settle.is_zero() {
            log::debug!("Waiting {settle:?} for the board to settle");
            std::thread::sleep(settle);
        }

        Ok(Self {
            port: Some(handle),
            name: port.to_string(),
            write_timeout,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ActuatorLink for SerialLink {
    fn send(&mut self, command: &Command) -> Result<(), LinkError> {
        let timeout = self.write_timeout;
        let port = self.port.as_mut().ok_or(LinkError::Closed)?;
        port.write_all(&command.to_wire())
            .map_err(|e| LinkError::from_write(e, timeout))
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            log::info!("Closed serial link {}", self.name);
        }
    }
}

impl Drop for SerialLink {
    fn drop(&mut self) {
        self.close();
    }
}
