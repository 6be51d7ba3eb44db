//! Hardware access layer for USB status lights
//!
//! This crate describes connected devices ([`Hardware`]), opens transports
//! to them over HID or a serial line ([`Transport`]), and enumerates what is
//! plugged in ([`Port`]). A [`mock`] port and transport stand in for real
//! devices in tests.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod hardware;
pub mod hid;
pub mod mock;
pub mod port;
pub mod serial;
pub mod transport;

pub use hardware::*;
pub use hid::HidTransport;
pub use port::{Port, SystemPort, enumerate};
pub use serial::SerialTransport;
pub use transport::Transport;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HardwareError {
    #[error("Device is not open")]
    NotOpen,

    #[error("Device is already open")]
    AlreadyOpen,

    #[error("Enumerating {0} devices is not supported")]
    Unsupported(ConnectionType),

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("HID error: {0}")]
    Hid(String),

    #[error("Serial error: {0}")]
    Serial(String),

    #[error("Device disconnected")]
    Disconnected,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<hidapi::HidError> for HardwareError {
    fn from(err: hidapi::HidError) -> Self {
        Self::Hid(err.to_string())
    }
}

impl From<serialport::Error> for HardwareError {
    fn from(err: serialport::Error) -> Self {
        Self::Serial(err.to_string())
    }
}

pub type HardwareResult<T> = Result<T, HardwareError>;
