//! Serial line transport for lights that speak a text protocol

use std::io::{Read, Write};
use std::time::Duration;

use serialport::SerialPort;
use tracing::debug;

use crate::{Hardware, HardwareError, HardwareResult, Transport};

pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Serial transport opened by port name.
pub struct SerialTransport {
    hardware: Hardware,
    baud_rate: u32,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialTransport {
    pub fn new(hardware: Hardware) -> Self {
        Self::with_baud_rate(hardware, DEFAULT_BAUD_RATE)
    }

    pub fn with_baud_rate(hardware: Hardware, baud_rate: u32) -> Self {
        Self {
            hardware,
            baud_rate,
            port: None,
        }
    }

    fn port(&mut self) -> HardwareResult<&mut Box<dyn SerialPort>> {
        self.port.as_mut().ok_or(HardwareError::NotOpen)
    }
}

impl Transport for SerialTransport {
    fn hardware(&self) -> &Hardware {
        &self.hardware
    }

    fn open(&mut self) -> HardwareResult<()> {
        if self.port.is_some() {
            return Err(HardwareError::AlreadyOpen);
        }
        let port = serialport::new(self.hardware.path.as_str(), self.baud_rate)
            .timeout(Duration::from_millis(250))
            .open()?;
        debug!(
            "Opened serial port {} at {} baud",
            self.hardware.path, self.baud_rate
        );
        self.port = Some(port);
        Ok(())
    }

    fn close(&mut self) -> HardwareResult<()> {
        self.port.take().map(drop).ok_or(HardwareError::NotOpen)
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn write(&mut self, data: &[u8]) -> HardwareResult<usize> {
        let port = self.port()?;
        port.write_all(data)?;
        port.flush()?;
        Ok(data.len())
    }

    fn read(&mut self, nbytes: usize, timeout_ms: u32) -> HardwareResult<Vec<u8>> {
        let port = self.port()?;
        port.set_timeout(Duration::from_millis(u64::from(timeout_ms)))?;
        let mut buf = vec![0u8; nbytes];
        let count = match port.read(&mut buf) {
            Ok(count) => count,
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => 0,
            Err(e) => return Err(e.into()),
        };
        buf.truncate(count);
        Ok(buf)
    }

    /// Serial lines have no feature reports; the bytes are written as-is.
    fn send_feature_report(&mut self, data: &[u8]) -> HardwareResult<usize> {
        self.write(data)
    }

    fn get_feature_report(&mut self, _report_id: u8, nbytes: usize) -> HardwareResult<Vec<u8>> {
        self.read(nbytes, 250)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_serial_rejects_io() {
        let mut transport = SerialTransport::new(Hardware::serial(0x2047, 0x03DF, "/dev/ttyACM9"));
        assert!(!transport.is_open());
        assert!(matches!(transport.write(b"B#000000\n"), Err(HardwareError::NotOpen)));
        assert!(matches!(transport.read(4, 10), Err(HardwareError::NotOpen)));
        assert!(matches!(transport.close(), Err(HardwareError::NotOpen)));
    }
}
