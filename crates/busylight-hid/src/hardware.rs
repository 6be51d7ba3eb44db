//! Descriptors for connected status light hardware

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a device is attached to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Any,
    Unknown,
    Hid,
    Serial,
    Bluetooth,
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Any => "any",
            Self::Unknown => "unknown",
            Self::Hid => "hid",
            Self::Serial => "serial",
            Self::Bluetooth => "bluetooth",
        };
        f.write_str(name)
    }
}

/// Everything known about one enumerated device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hardware {
    pub connection_type: ConnectionType,
    pub path: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub serial_number: Option<String>,
    pub manufacturer_string: Option<String>,
    pub product_string: Option<String>,
    pub release_number: u16,
    pub usage_page: u16,
    pub usage: u16,
    pub interface_number: i32,
    pub bus_type: u8,
}

impl Hardware {
    pub fn new(
        connection_type: ConnectionType,
        vendor_id: u16,
        product_id: u16,
        path: impl Into<String>,
    ) -> Self {
        Self {
            connection_type,
            path: path.into(),
            vendor_id,
            product_id,
            serial_number: None,
            manufacturer_string: None,
            product_string: None,
            release_number: 0,
            usage_page: 0,
            usage: 0,
            interface_number: -1,
            bus_type: 0,
        }
    }

    pub fn hid(vendor_id: u16, product_id: u16, path: impl Into<String>) -> Self {
        Self::new(ConnectionType::Hid, vendor_id, product_id, path)
    }

    pub fn serial(vendor_id: u16, product_id: u16, path: impl Into<String>) -> Self {
        let mut hardware = Self::new(ConnectionType::Serial, vendor_id, product_id, path);
        hardware.bus_type = 1;
        hardware
    }

    /// Describe a HID device reported by hidapi.
    pub fn from_hid(info: &hidapi::DeviceInfo) -> Self {
        Self {
            connection_type: ConnectionType::Hid,
            path: info.path().to_string_lossy().into_owned(),
            vendor_id: info.vendor_id(),
            product_id: info.product_id(),
            serial_number: info.serial_number().map(str::to_owned),
            manufacturer_string: info.manufacturer_string().map(str::to_owned),
            product_string: info.product_string().map(str::to_owned),
            release_number: info.release_number(),
            usage_page: info.usage_page(),
            usage: info.usage(),
            interface_number: info.interface_number(),
            bus_type: 0,
        }
    }

    /// Describe a USB serial port. Ports without USB ids yield `None`.
    pub fn from_port_info(info: &serialport::SerialPortInfo) -> Option<Self> {
        let serialport::SerialPortType::UsbPort(usb) = &info.port_type else {
            return None;
        };
        let mut hardware = Self::serial(usb.vid, usb.pid, info.port_name.clone());
        hardware.serial_number = usb.serial_number.clone();
        hardware.manufacturer_string = usb.manufacturer.clone();
        hardware.product_string = usb.product.clone();
        Some(hardware)
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer_string = Some(manufacturer.into());
        self
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product_string = Some(product.into());
        self
    }

    pub fn with_release(mut self, release_number: u16) -> Self {
        self.release_number = release_number;
        self
    }

    pub fn path_str(&self) -> &str {
        &self.path
    }

    pub fn device_id(&self) -> (u16, u16) {
        (self.vendor_id, self.product_id)
    }

    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }

    pub fn display_name(&self) -> String {
        self.product_string
            .clone()
            .or_else(|| self.manufacturer_string.clone())
            .unwrap_or_else(|| format!("{:04x}:{:04x}", self.vendor_id, self.product_id))
    }
}

impl fmt::Display for Hardware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:04x}:{:04x} {} ({})",
            self.connection_type,
            self.vendor_id,
            self.product_id,
            self.display_name(),
            self.path
        )
    }
}
