//! Shared fixtures for vendor tests.

use busylight_hid::Hardware;
use busylight_hid::mock::MockTransport;

use crate::config::LightOptions;
use crate::driver::Driver;
use crate::error::LightResult;
use crate::light::LightCore;

pub const PLATFORM: &str = "Linux_6.8.0";

/// Acquire a shared core for `driver` over a fresh mock device.
pub fn mock_core(
    driver: &'static Driver,
    hardware: Hardware,
) -> LightResult<(LightCore, MockTransport)> {
    let device = MockTransport::new(hardware.clone());
    let options = LightOptions::default().with_reset(false);
    let core = LightCore::new(driver, hardware, device.boxed(), options, PLATFORM)?;
    Ok((core, device))
}

/// The last payload written to `device`, or empty when nothing was.
pub fn last_write(device: &MockTransport) -> Vec<u8> {
    device.write_history().pop().unwrap_or_default()
}
