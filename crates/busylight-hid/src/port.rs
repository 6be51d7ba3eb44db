//! Device enumeration and transport factories

use hidapi::HidApi;
use tracing::{debug, warn};

use crate::{
    ConnectionType, Hardware, HardwareError, HardwareResult, HidTransport, SerialTransport,
    Transport,
};

/// Source of hardware descriptors and the transports that drive them.
pub trait Port: Send + Sync {
    fn enumerate(&self, connection_type: ConnectionType) -> HardwareResult<Vec<Hardware>>;

    fn open(&self, hardware: &Hardware) -> HardwareResult<Box<dyn Transport>>;
}

/// The host's real HID and serial devices.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPort;

impl SystemPort {
    pub fn new() -> Self {
        Self
    }

    fn hid_devices() -> HardwareResult<Vec<Hardware>> {
        let api = HidApi::new()?;
        let devices: Vec<Hardware> = api.device_list().map(Hardware::from_hid).collect();
        debug!("Enumerated {} HID devices", devices.len());
        Ok(devices)
    }

    fn serial_devices() -> HardwareResult<Vec<Hardware>> {
        let ports = serialport::available_ports()?;
        let devices: Vec<Hardware> = ports.iter().filter_map(Hardware::from_port_info).collect();
        debug!("Enumerated {} USB serial ports", devices.len());
        Ok(devices)
    }
}

impl Port for SystemPort {
    fn enumerate(&self, connection_type: ConnectionType) -> HardwareResult<Vec<Hardware>> {
        match connection_type {
            ConnectionType::Hid => Self::hid_devices(),
            ConnectionType::Serial => Self::serial_devices(),
            ConnectionType::Any => {
                let mut devices = Self::hid_devices()?;
                match Self::serial_devices() {
                    Ok(serial) => devices.extend(serial),
                    Err(e) => warn!("Serial enumeration failed: {e}"),
                }
                Ok(devices)
            }
            other @ (ConnectionType::Unknown | ConnectionType::Bluetooth) => {
                Err(HardwareError::Unsupported(other))
            }
        }
    }

    fn open(&self, hardware: &Hardware) -> HardwareResult<Box<dyn Transport>> {
        match hardware.connection_type {
            ConnectionType::Hid => Ok(Box::new(HidTransport::new(hardware.clone()))),
            ConnectionType::Serial => Ok(Box::new(SerialTransport::new(hardware.clone()))),
            other => Err(HardwareError::Unsupported(other)),
        }
    }
}

/// Enumerate the host's devices of `connection_type`.
///
/// # Errors
///
/// [`HardwareError::Unsupported`] for unknown and Bluetooth connections,
/// otherwise whatever the platform backend reports.
pub fn enumerate(connection_type: ConnectionType) -> HardwareResult<Vec<Hardware>> {
    SystemPort.enumerate(connection_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_connection_types() {
        assert!(matches!(
            enumerate(ConnectionType::Unknown),
            Err(HardwareError::Unsupported(ConnectionType::Unknown))
        ));
        let port = SystemPort::new();
        for connection_type in [ConnectionType::Unknown, ConnectionType::Bluetooth] {
            assert!(matches!(
                port.enumerate(connection_type),
                Err(HardwareError::Unsupported(t)) if t == connection_type
            ));
        }
    }

    #[test]
    fn test_open_picks_transport_by_connection_type() -> HardwareResult<()> {
        let port = SystemPort::new();
        let hid = port.open(&Hardware::hid(0x04D8, 0xF848, "/dev/hidraw7"))?;
        assert_eq!(hid.hardware().connection_type, ConnectionType::Hid);
        assert!(!hid.is_open());

        let serial = port.open(&Hardware::serial(0x2047, 0x03DF, "/dev/ttyACM0"))?;
        assert_eq!(serial.hardware().connection_type, ConnectionType::Serial);

        let bluetooth = Hardware::new(ConnectionType::Bluetooth, 0, 0, "bt");
        assert!(matches!(
            port.open(&bluetooth),
            Err(HardwareError::Unsupported(ConnectionType::Bluetooth))
        ));
        Ok(())
    }
}
