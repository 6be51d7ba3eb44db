//! In-memory transport and port for exercising drivers without hardware

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::{ConnectionType, Hardware, HardwareError, HardwareResult, Port, Transport};

#[derive(Debug, Default)]
struct MockState {
    open: bool,
    held_elsewhere: bool,
    fail_writes: bool,
    open_count: usize,
    close_count: usize,
    read_queue: VecDeque<Vec<u8>>,
    reads: Vec<(usize, u32)>,
    write_history: Vec<Vec<u8>>,
    feature_history: Vec<Vec<u8>>,
}

/// Recording transport. Clones share the same device state.
#[derive(Debug, Clone)]
pub struct MockTransport {
    hardware: Hardware,
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new(hardware: Hardware) -> Self {
        Self {
            hardware,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock()
    }

    pub fn boxed(&self) -> Box<dyn Transport> {
        Box::new(self.clone())
    }

    pub fn queue_read(&self, data: Vec<u8>) {
        self.state().read_queue.push_back(data);
    }

    /// Output reports written so far, oldest first.
    pub fn write_history(&self) -> Vec<Vec<u8>> {
        self.state().write_history.clone()
    }

    pub fn feature_history(&self) -> Vec<Vec<u8>> {
        self.state().feature_history.clone()
    }

    /// `(nbytes, timeout_ms)` of every read request.
    pub fn read_requests(&self) -> Vec<(usize, u32)> {
        self.state().reads.clone()
    }

    pub fn clear_history(&self) {
        let mut state = self.state();
        state.write_history.clear();
        state.feature_history.clear();
    }

    /// Make every subsequent write fail as if the device was unplugged.
    pub fn fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }

    /// Simulate another process holding the device open.
    pub fn hold_elsewhere(&self, held: bool) {
        self.state().held_elsewhere = held;
    }

    pub fn open_count(&self) -> usize {
        self.state().open_count
    }

    pub fn close_count(&self) -> usize {
        self.state().close_count
    }
}

impl Transport for MockTransport {
    fn hardware(&self) -> &Hardware {
        &self.hardware
    }

    fn open(&mut self) -> HardwareResult<()> {
        let mut state = self.state();
        if state.open || state.held_elsewhere {
            return Err(HardwareError::AlreadyOpen);
        }
        state.open = true;
        state.open_count += 1;
        Ok(())
    }

    fn close(&mut self) -> HardwareResult<()> {
        let mut state = self.state();
        if !state.open {
            return Err(HardwareError::NotOpen);
        }
        state.open = false;
        state.close_count += 1;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.state().open
    }

    fn write(&mut self, data: &[u8]) -> HardwareResult<usize> {
        let mut state = self.state();
        if !state.open {
            return Err(HardwareError::NotOpen);
        }
        if state.fail_writes {
            return Err(HardwareError::Disconnected);
        }
        state.write_history.push(data.to_vec());
        Ok(data.len())
    }

    fn read(&mut self, nbytes: usize, timeout_ms: u32) -> HardwareResult<Vec<u8>> {
        let mut state = self.state();
        if !state.open {
            return Err(HardwareError::NotOpen);
        }
        state.reads.push((nbytes, timeout_ms));
        let mut data = state.read_queue.pop_front().unwrap_or_default();
        data.truncate(nbytes);
        Ok(data)
    }

    fn send_feature_report(&mut self, data: &[u8]) -> HardwareResult<usize> {
        let mut state = self.state();
        if !state.open {
            return Err(HardwareError::NotOpen);
        }
        if state.fail_writes {
            return Err(HardwareError::Disconnected);
        }
        state.feature_history.push(data.to_vec());
        Ok(data.len())
    }

    fn get_feature_report(&mut self, _report_id: u8, nbytes: usize) -> HardwareResult<Vec<u8>> {
        self.read(nbytes, 0)
    }
}

/// Port serving a fixed set of mock devices.
#[derive(Debug, Default, Clone)]
pub struct MockPort {
    devices: Vec<MockTransport>,
}

impl MockPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device and return the shared transport handle for it.
    pub fn add_device(&mut self, hardware: Hardware) -> MockTransport {
        let transport = MockTransport::new(hardware);
        self.devices.push(transport.clone());
        transport
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}

impl Port for MockPort {
    fn enumerate(&self, connection_type: ConnectionType) -> HardwareResult<Vec<Hardware>> {
        if matches!(
            connection_type,
            ConnectionType::Unknown | ConnectionType::Bluetooth
        ) {
            return Err(HardwareError::Unsupported(connection_type));
        }
        Ok(self
            .devices
            .iter()
            .map(|d| d.hardware.clone())
            .filter(|h| {
                connection_type == ConnectionType::Any || h.connection_type == connection_type
            })
            .collect())
    }

    fn open(&self, hardware: &Hardware) -> HardwareResult<Box<dyn Transport>> {
        self.devices
            .iter()
            .find(|d| d.hardware.path == hardware.path)
            .map(MockTransport::boxed)
            .ok_or_else(|| HardwareError::DeviceNotFound(hardware.path.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_open_close_state_machine() -> HardwareResult<()> {
        let mut device = MockTransport::new(Hardware::hid(0x1234, 0x5678, "/dev/hidraw0"));
        assert!(!device.is_open());
        assert!(matches!(device.write(&[1]), Err(HardwareError::NotOpen)));

        device.open()?;
        assert!(matches!(device.open(), Err(HardwareError::AlreadyOpen)));
        assert_eq!(device.write(&[0x01, 0x02, 0x03])?, 3);
        device.close()?;
        assert!(matches!(device.close(), Err(HardwareError::NotOpen)));

        assert_eq!(device.write_history(), vec![vec![0x01, 0x02, 0x03]]);
        assert_eq!(device.open_count(), 1);
        assert_eq!(device.close_count(), 1);
        Ok(())
    }

    #[test]
    fn test_mock_clones_share_state() -> HardwareResult<()> {
        let device = MockTransport::new(Hardware::hid(0x1234, 0x5678, "/dev/hidraw0"));
        let mut boxed = device.boxed();
        boxed.open()?;
        boxed.send_feature_report(&[0; 8])?;
        assert!(device.is_open());
        assert_eq!(device.feature_history(), vec![vec![0; 8]]);
        Ok(())
    }

    #[test]
    fn test_mock_records_writes_from_other_threads() -> HardwareResult<()> {
        let mut device = MockTransport::new(Hardware::hid(0x1234, 0x5678, "/dev/hidraw0"));
        device.open()?;
        let writers: Vec<_> = (0u8..4)
            .map(|n| {
                let mut clone = device.boxed();
                std::thread::spawn(move || clone.write(&[n]))
            })
            .collect();
        for writer in writers {
            let written = writer
                .join()
                .map_err(|panic| HardwareError::Hid(format!("writer panicked: {panic:?}")))??;
            assert_eq!(written, 1);
        }
        let mut history = device.write_history();
        history.sort();
        assert_eq!(history, vec![vec![0], vec![1], vec![2], vec![3]]);
        assert_eq!(device.open_count(), 1);
        Ok(())
    }

    #[test]
    fn test_mock_read_queue() -> HardwareResult<()> {
        let mut device = MockTransport::new(Hardware::hid(0x1234, 0x5678, "/dev/hidraw0"));
        device.queue_read(vec![0xAA, 0xBB, 0xCC]);
        device.open()?;
        assert_eq!(device.read(2, 200)?, vec![0xAA, 0xBB]);
        assert_eq!(device.read(8, 200)?, Vec::<u8>::new());
        assert_eq!(device.read_requests(), vec![(2, 200), (8, 200)]);
        Ok(())
    }

    #[test]
    fn test_mock_write_failure_and_held_device() -> HardwareResult<()> {
        let mut device = MockTransport::new(Hardware::hid(0x1234, 0x5678, "/dev/hidraw0"));
        device.hold_elsewhere(true);
        assert!(matches!(device.open(), Err(HardwareError::AlreadyOpen)));
        device.hold_elsewhere(false);
        device.open()?;
        device.fail_writes(true);
        assert!(matches!(device.write(&[0]), Err(HardwareError::Disconnected)));
        Ok(())
    }

    #[test]
    fn test_mock_port() -> HardwareResult<()> {
        let mut port = MockPort::new();
        port.add_device(Hardware::hid(0x1234, 0x5678, "/dev/hidraw0"));
        port.add_device(Hardware::serial(0x2047, 0x03DF, "/dev/ttyACM0"));

        assert_eq!(port.device_count(), 2);
        assert_eq!(port.enumerate(ConnectionType::Any)?.len(), 2);
        assert_eq!(port.enumerate(ConnectionType::Serial)?.len(), 1);
        assert!(matches!(
            port.enumerate(ConnectionType::Unknown),
            Err(HardwareError::Unsupported(ConnectionType::Unknown))
        ));

        let opened = port.open(&Hardware::hid(0, 0, "/dev/hidraw0"))?;
        assert_eq!(opened.hardware().vendor_id, 0x1234);
        assert!(matches!(
            port.open(&Hardware::hid(0, 0, "/dev/missing")),
            Err(HardwareError::DeviceNotFound(_))
        ));
        Ok(())
    }
}
