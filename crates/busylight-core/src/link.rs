//! Shared, lockable connection between a light and its transport.
//!
//! A [`DeviceLink`] is cloned into background tasks so keep-alive writes go
//! through the same lock as foreground updates. Every write is performed
//! under that lock, which totally orders writes to one device.

use std::sync::Arc;

use busylight_hid::{ConnectionType, Hardware, HardwareError, HardwareResult, Transport};
use parking_lot::Mutex;
use tracing::{debug, error};

use crate::error::{LightError, LightResult};
use crate::platform::frame_output_report;

/// How serialized state reaches the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteStrategy {
    /// HID output report, or a plain write for serial devices.
    #[default]
    OutputReport,
    /// HID feature report; the payload carries its own report id.
    FeatureReport,
}

struct LinkInner {
    transport: Box<dyn Transport>,
    platform: String,
}

/// Serialized access to one device's transport.
///
/// Clones share the transport, so a keep-alive task and its light write
/// through the same handle in call order.
#[derive(Clone)]
pub struct DeviceLink {
    inner: Arc<Mutex<LinkInner>>,
    hardware: Hardware,
    strategy: WriteStrategy,
    exclusive: bool,
}

impl std::fmt::Debug for DeviceLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceLink")
            .field("path", &self.hardware.path)
            .field("strategy", &self.strategy)
            .field("exclusive", &self.exclusive)
            .finish()
    }
}

impl DeviceLink {
    pub fn new(
        transport: Box<dyn Transport>,
        platform: impl Into<String>,
        strategy: WriteStrategy,
        exclusive: bool,
    ) -> Self {
        let hardware = transport.hardware().clone();
        Self {
            inner: Arc::new(Mutex::new(LinkInner {
                transport,
                platform: platform.into(),
            })),
            hardware,
            strategy,
            exclusive,
        }
    }

    pub fn hardware(&self) -> &Hardware {
        &self.hardware
    }

    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    pub fn strategy(&self) -> WriteStrategy {
        self.strategy
    }

    pub fn platform(&self) -> String {
        self.inner.lock().platform.clone()
    }

    pub fn set_platform(&self, platform: impl Into<String>) {
        self.inner.lock().platform = platform.into();
    }

    /// Open the transport.
    ///
    /// # Errors
    ///
    /// [`LightError::HardwareUnavailable`] when the device cannot be opened,
    /// typically because another claimant holds it.
    pub fn acquire(&self) -> LightResult<()> {
        let mut inner = self.inner.lock();
        inner
            .transport
            .open()
            .map_err(|source| LightError::HardwareUnavailable {
                path: self.hardware.path.clone(),
                source,
            })?;
        debug!(
            "Acquired VID=0x{:04X} PID=0x{:04X} at {}",
            self.hardware.vendor_id, self.hardware.product_id, self.hardware.path
        );
        Ok(())
    }

    /// Close the transport if it is open.
    pub fn release(&self) {
        let mut inner = self.inner.lock();
        if inner.transport.is_open() {
            if let Err(e) = inner.transport.close() {
                debug!("Release of {} failed: {e}", self.hardware.path);
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock().transport.is_open()
    }

    /// Run `op` against an open transport.
    ///
    /// Exclusive links are already open. Shared links are opened for the
    /// duration of `op` and closed afterwards, whatever `op` returns.
    fn exclusive_access<T>(
        &self,
        op: impl FnOnce(&mut LinkInner) -> HardwareResult<T>,
    ) -> LightResult<T> {
        let mut inner = self.inner.lock();
        let opened_here = !self.exclusive && !inner.transport.is_open();
        if opened_here {
            inner
                .transport
                .open()
                .map_err(|source| LightError::HardwareUnavailable {
                    path: self.hardware.path.clone(),
                    source,
                })?;
        }
        let result = op(&mut inner);
        if opened_here {
            if let Err(e) = inner.transport.close() {
                debug!("Close of {} failed: {e}", self.hardware.path);
            }
        }
        result.map_err(|source| self.unavailable(source))
    }

    fn unavailable(&self, source: HardwareError) -> LightError {
        error!(
            "Write to {} at {} failed: {source}",
            self.hardware.display_name(),
            self.hardware.path
        );
        LightError::LightUnavailable {
            name: self.hardware.display_name(),
            path: self.hardware.path.clone(),
            source,
        }
    }

    /// Write one serialized state, framed for the host platform.
    ///
    /// # Errors
    ///
    /// [`LightError::LightUnavailable`] when the transport rejects the write.
    pub fn write(&self, payload: &[u8]) -> LightResult<usize> {
        let strategy = self.strategy;
        let hid = self.hardware.connection_type == ConnectionType::Hid;
        self.exclusive_access(|inner| match strategy {
            WriteStrategy::FeatureReport => inner.transport.send_feature_report(payload),
            WriteStrategy::OutputReport if hid => {
                let framed = frame_output_report(&inner.platform, payload);
                inner.transport.write(&framed)
            }
            WriteStrategy::OutputReport => inner.transport.write(payload),
        })
    }

    /// Read up to `nbytes`, waiting at most `timeout_ms`.
    ///
    /// # Errors
    ///
    /// [`LightError::LightUnavailable`] when the read fails.
    pub fn read(&self, nbytes: usize, timeout_ms: u32) -> LightResult<Vec<u8>> {
        self.exclusive_access(|inner| inner.transport.read(nbytes, timeout_ms))
    }

    /// # Errors
    ///
    /// [`LightError::LightUnavailable`] when the report cannot be sent.
    pub fn send_feature_report(&self, payload: &[u8]) -> LightResult<usize> {
        self.exclusive_access(|inner| inner.transport.send_feature_report(payload))
    }
}
