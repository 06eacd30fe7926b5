pub mod hcsq;

use std::io::{Read as _, Write as _};
use std::time::Duration;

use serialport::SerialPort;
use thiserror::Error;
use tracing::debug;

/// Baud rate of the Huawei AT channel.
pub const BAUD_RATE: u32 = 57_600;
/// Bounded wait for a serial read before a cycle gives up.
pub const READ_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum ModemError {
    #[error("failed to open serial device `{device}`")]
    DeviceOpen {
        device: String,
        #[source]
        source: serialport::Error,
    },
    #[error("no modem device is open")]
    NotConnected,
    #[error("no HCSQ response from the modem")]
    NoResponse,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ModemError>;

/// Serial AT channel to the modem.
///
/// The production implementation is [`SerialModemLink`]; tests substitute a
/// scripted one.
pub trait ModemLink {
    /// Device path currently open, if any.
    fn device(&self) -> Option<&str>;
    /// Open `device`, closing any previously open handle first. A handle
    /// already open on `device` is kept as is. On failure the link is left
    /// closed.
    fn configure(&mut self, device: &str) -> Result<()>;
    fn write_all(&mut self, data: &[u8]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    /// Bytes already buffered on the receive side.
    fn data_ready(&mut self) -> Result<u32>;
    /// Next raw line, terminator included, waiting up to the read timeout.
    fn read_line(&mut self) -> Result<String>;
    /// Release the serial handle. Idempotent.
    fn close(&mut self);
}

/// [`ModemLink`] over a real serial port.
#[derive(Default)]
pub struct SerialModemLink {
    port: Option<Box<dyn SerialPort>>,
    device: Option<String>,
}

impl SerialModemLink {
    pub fn new() -> Self {
        Self::default()
    }

    fn port(&mut self) -> Result<&mut Box<dyn SerialPort>> {
        self.port.as_mut().ok_or(ModemError::NotConnected)
    }
}

impl ModemLink for SerialModemLink {
    fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    fn configure(&mut self, device: &str) -> Result<()> {
        if self.port.is_some() && self.device() == Some(device) {
            return Ok(());
        }
        self.close();
        debug!(device, baud = BAUD_RATE, "opening modem serial device");
        let port = serialport::new(device, BAUD_RATE)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|source| ModemError::DeviceOpen {
                device: device.to_owned(),
                source,
            })?;
        self.port = Some(port);
        self.device = Some(device.to_owned());
        Ok(())
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.port()?.write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.port()?.flush()?;
        Ok(())
    }

    fn data_ready(&mut self) -> Result<u32> {
        Ok(self.port()?.bytes_to_read().map_err(std::io::Error::from)?)
    }

    fn read_line(&mut self) -> Result<String> {
        let port = self.port()?;
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match port.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => {
                    line.push(byte[0]);
                    if byte[0] == b'\n' {
                        break;
                    }
                }
                Err(err) if err.kind() == std::io::ErrorKind::TimedOut => break,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(String::from_utf8_lossy(&line).into_owned())
    }

    fn close(&mut self) {
        if let Some(device) = self.device.take() {
            debug!("closing modem serial device {device}");
        }
        self.port = None;
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;

    use super::{ModemError, ModemLink, Result};

    /// Scripted in-memory modem: responses are queued lines, raw terminators
    /// included.
    #[derive(Default)]
    pub(crate) struct ScriptedModem {
        pub(crate) device: Option<String>,
        pub(crate) lines: VecDeque<String>,
        pub(crate) writes: Vec<Vec<u8>>,
        pub(crate) configure_calls: Vec<String>,
        pub(crate) fail_configure: bool,
    }

    impl ScriptedModem {
        pub(crate) fn with_lines(lines: &[&str]) -> Self {
            Self {
                lines: lines.iter().map(|line| line.to_string()).collect(),
                ..Self::default()
            }
        }

        pub(crate) fn push_line(&mut self, line: &str) {
            self.lines.push_back(line.to_owned());
        }
    }

    impl ModemLink for ScriptedModem {
        fn device(&self) -> Option<&str> {
            self.device.as_deref()
        }

        fn configure(&mut self, device: &str) -> Result<()> {
            self.configure_calls.push(device.to_owned());
            if self.device.as_deref() == Some(device) {
                return Ok(());
            }
            self.close();
            if self.fail_configure {
                return Err(ModemError::DeviceOpen {
                    device: device.to_owned(),
                    source: serialport::Error::new(
                        serialport::ErrorKind::NoDevice,
                        "scripted open failure",
                    ),
                });
            }
            self.device = Some(device.to_owned());
            Ok(())
        }

        fn write_all(&mut self, data: &[u8]) -> Result<()> {
            if self.device.is_none() {
                return Err(ModemError::NotConnected);
            }
            self.writes.push(data.to_vec());
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            if self.device.is_none() {
                return Err(ModemError::NotConnected);
            }
            Ok(())
        }

        fn data_ready(&mut self) -> Result<u32> {
            if self.device.is_none() {
                return Err(ModemError::NotConnected);
            }
            Ok(self.lines.len() as u32)
        }

        fn read_line(&mut self) -> Result<String> {
            if self.device.is_none() {
                return Err(ModemError::NotConnected);
            }
            Ok(self.lines.pop_front().unwrap_or_default())
        }

        fn close(&mut self) {
            self.device = None;
        }
    }
}
