//! hidapi-backed transport

use hidapi::{HidApi, HidDevice};
use std::ffi::CString;
use tracing::debug;

use crate::{Hardware, HardwareError, HardwareResult, Transport};

/// HID transport opened by device path.
pub struct HidTransport {
    hardware: Hardware,
    device: Option<HidDevice>,
}

impl HidTransport {
    pub fn new(hardware: Hardware) -> Self {
        Self {
            hardware,
            device: None,
        }
    }

    fn device(&self) -> HardwareResult<&HidDevice> {
        self.device.as_ref().ok_or(HardwareError::NotOpen)
    }
}

impl Transport for HidTransport {
    fn hardware(&self) -> &Hardware {
        &self.hardware
    }

    fn open(&mut self) -> HardwareResult<()> {
        if self.device.is_some() {
            return Err(HardwareError::AlreadyOpen);
        }
        let path = CString::new(self.hardware.path.as_bytes())
            .map_err(|e| HardwareError::DeviceNotFound(format!("{}: {e}", self.hardware.path)))?;
        let api = HidApi::new_without_enumerate()?;
        let device = api.open_path(&path)?;
        debug!(
            "Opened HID device VID=0x{:04X} PID=0x{:04X} at {}",
            self.hardware.vendor_id, self.hardware.product_id, self.hardware.path
        );
        self.device = Some(device);
        Ok(())
    }

    fn close(&mut self) -> HardwareResult<()> {
        match self.device.take() {
            Some(_) => {
                debug!("Closed HID device at {}", self.hardware.path);
                Ok(())
            }
            None => Err(HardwareError::NotOpen),
        }
    }

    fn is_open(&self) -> bool {
        self.device.is_some()
    }

    fn write(&mut self, data: &[u8]) -> HardwareResult<usize> {
        Ok(self.device()?.write(data)?)
    }

    fn read(&mut self, nbytes: usize, timeout_ms: u32) -> HardwareResult<Vec<u8>> {
        let mut buf = vec![0u8; nbytes];
        let timeout = i32::try_from(timeout_ms).unwrap_or(i32::MAX);
        let count = self.device()?.read_timeout(&mut buf, timeout)?;
        buf.truncate(count);
        Ok(buf)
    }

    fn send_feature_report(&mut self, data: &[u8]) -> HardwareResult<usize> {
        self.device()?.send_feature_report(data)?;
        Ok(data.len())
    }

    fn get_feature_report(&mut self, report_id: u8, nbytes: usize) -> HardwareResult<Vec<u8>> {
        let mut buf = vec![0u8; nbytes.max(1)];
        if let Some(first) = buf.first_mut() {
            *first = report_id;
        }
        let count = self.device()?.get_feature_report(&mut buf)?;
        buf.truncate(count);
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_transport_rejects_io() {
        let mut transport = HidTransport::new(Hardware::hid(0x1234, 0x5678, "/dev/null"));
        assert!(!transport.is_open());
        assert!(matches!(transport.write(&[0]), Err(HardwareError::NotOpen)));
        assert!(matches!(transport.read(8, 10), Err(HardwareError::NotOpen)));
        assert!(matches!(
            transport.send_feature_report(&[0; 8]),
            Err(HardwareError::NotOpen)
        ));
        assert!(matches!(
            transport.get_feature_report(1, 8),
            Err(HardwareError::NotOpen)
        ));
        assert!(matches!(transport.close(), Err(HardwareError::NotOpen)));
    }
}
