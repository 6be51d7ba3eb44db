//! Transport trait shared by HID and serial devices

use crate::{Hardware, HardwareResult};

/// An openable connection to one device.
///
/// Every I/O method fails with [`crate::HardwareError::NotOpen`] while the
/// transport is closed, and [`Transport::open`] fails with
/// [`crate::HardwareError::AlreadyOpen`] when called twice.
pub trait Transport: Send {
    fn hardware(&self) -> &Hardware;

    fn open(&mut self) -> HardwareResult<()>;

    fn close(&mut self) -> HardwareResult<()>;

    fn is_open(&self) -> bool;

    /// Write an output report (HID) or raw bytes (serial).
    fn write(&mut self, data: &[u8]) -> HardwareResult<usize>;

    /// Read up to `nbytes`, waiting at most `timeout_ms`.
    fn read(&mut self, nbytes: usize, timeout_ms: u32) -> HardwareResult<Vec<u8>>;

    fn send_feature_report(&mut self, data: &[u8]) -> HardwareResult<usize>;

    fn get_feature_report(&mut self, report_id: u8, nbytes: usize) -> HardwareResult<Vec<u8>>;
}
