//! Static per-model driver descriptors.
//!
//! A [`Driver`] is the registry's unit of dispatch: it declares the USB ids
//! a model answers to, an optional secondary claim check, the write
//! strategy and a constructor that wraps a [`LightCore`] in the model's
//! concrete [`Light`].

use std::fmt;

use busylight_hid::{Hardware, Transport};
use tracing::debug;

use crate::config::LightOptions;
use crate::error::{LightError, LightResult};
use crate::light::{Light, LightCore};
use crate::link::WriteStrategy;
use crate::platform::current_platform;
use crate::udev;

/// `(vendor_id, product_id, display name)`.
pub type DeviceId = (u16, u16, &'static str);

/// Secondary claim check run after the id check succeeds.
pub type ClaimCheck = fn(&Driver, &Hardware) -> bool;

/// Wrap an acquired core in the model's light type.
pub type Build = fn(LightCore) -> LightResult<Box<dyn Light>>;

/// Everything the registry knows about one light model.
///
/// Drivers are `static` values declared in the vendor modules and listed
/// in claim order by [`crate::vendors::DRIVERS`].
pub struct Driver {
    pub vendor: &'static str,
    pub model: &'static str,
    pub supported_device_ids: &'static [DeviceId],
    pub write_strategy: WriteStrategy,
    claim_check: Option<ClaimCheck>,
    build: Build,
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("vendor", &self.vendor)
            .field("model", &self.model)
            .field("supported_device_ids", &self.supported_device_ids)
            .field("write_strategy", &self.write_strategy)
            .finish()
    }
}

impl PartialEq for Driver {
    fn eq(&self, other: &Self) -> bool {
        self.vendor == other.vendor && self.model == other.model
    }
}

impl Eq for Driver {}

impl Driver {
    /// Driver with an id-only claim check and output report writes.
    pub const fn new(
        vendor: &'static str,
        model: &'static str,
        supported_device_ids: &'static [DeviceId],
        build: Build,
    ) -> Self {
        Self {
            vendor,
            model,
            supported_device_ids,
            write_strategy: WriteStrategy::OutputReport,
            claim_check: None,
            build,
        }
    }

    /// Narrow claiming with `check`, run after the id check passes.
    pub const fn with_claim_check(mut self, check: ClaimCheck) -> Self {
        self.claim_check = Some(check);
        self
    }

    pub const fn with_write_strategy(mut self, strategy: WriteStrategy) -> Self {
        self.write_strategy = strategy;
        self
    }

    /// True when `hardware`'s vendor and product id are declared.
    pub fn claims_id(&self, hardware: &Hardware) -> bool {
        self.supported_device_ids
            .iter()
            .any(|(vid, pid, _)| hardware.matches(*vid, *pid))
    }

    /// Whether this driver will drive `hardware`.
    ///
    /// The id check always runs first; a model's secondary check only
    /// narrows it.
    pub fn claims(&self, hardware: &Hardware) -> bool {
        if !self.claims_id(hardware) {
            return false;
        }
        self.claim_check.is_none_or(|check| check(self, hardware))
    }

    /// Display name declared for `hardware`'s id, or the model name.
    pub fn name_for(&self, hardware: &Hardware) -> &'static str {
        self.supported_device_ids
            .iter()
            .find(|(vid, pid, _)| hardware.matches(*vid, *pid))
            .map_or(self.model, |(_, _, name)| name)
    }

    /// Declared display names without duplicates, in declaration order.
    pub fn unique_device_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Vec::new();
        for (_, _, name) in self.supported_device_ids {
            if !names.contains(name) {
                names.push(*name);
            }
        }
        names
    }

    /// udev rules for this driver's ids, or every driver's when it has none.
    pub fn udev_rules(&self, mode: u32) -> udev::Rules {
        if self.supported_device_ids.is_empty() {
            return udev::udev_rules(crate::vendors::DRIVERS, mode);
        }
        udev::udev_rules(&[self], mode)
    }

    /// Claim, acquire and construct a light.
    ///
    /// The device is opened during construction. Shared (non-exclusive)
    /// lights close it again straight away and reopen around each write.
    /// With `options.reset` the light is turned off before it is returned.
    ///
    /// # Errors
    ///
    /// [`LightError::HardwareUnsupported`] when this driver does not claim
    /// `hardware`, [`LightError::HardwareUnavailable`] when it cannot be
    /// acquired, or any error raised by the initial reset.
    pub fn open(
        &'static self,
        hardware: Hardware,
        transport: Box<dyn Transport>,
        options: LightOptions,
    ) -> LightResult<Box<dyn Light>> {
        self.open_on(current_platform(), hardware, transport, options)
    }

    /// [`Driver::open`] with an explicit `"{System}_{release}"` platform.
    ///
    /// # Errors
    ///
    /// Same as [`Driver::open`].
    pub fn open_on(
        &'static self,
        platform: impl Into<String>,
        hardware: Hardware,
        transport: Box<dyn Transport>,
        options: LightOptions,
    ) -> LightResult<Box<dyn Light>> {
        if !self.claims(&hardware) {
            debug!(
                "{} rejected VID=0x{:04X} PID=0x{:04X}",
                self.model, hardware.vendor_id, hardware.product_id
            );
            return Err(LightError::HardwareUnsupported {
                driver: self.model.to_string(),
                vendor_id: hardware.vendor_id,
                product_id: hardware.product_id,
            });
        }
        options.validate()?;
        let core = LightCore::new(self, hardware, transport, options, platform)?;
        let mut light = (self.build)(core)?;
        if options.reset {
            light.reset()?;
        }
        Ok(light)
    }
}
