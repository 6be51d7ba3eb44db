//! Discovery: match enumerated hardware to drivers and open lights.
//!
//! Drivers are consulted in their declared order and the first one whose
//! claim succeeds wins a device. That order is fixed in
//! [`crate::vendors::DRIVERS`], so the outcome does not depend on anything
//! discovered at runtime.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use busylight_hid::{ConnectionType, Hardware, Port, SystemPort};
use tracing::{debug, info};

use crate::config::LightOptions;
use crate::driver::Driver;
use crate::error::{LightError, LightResult};
use crate::light::LightHandle;
use crate::vendors::DRIVERS;

/// Every known driver in claim order.
pub fn drivers() -> &'static [&'static Driver] {
    DRIVERS
}

/// Alias of [`drivers`]; every driver is a concrete model.
pub fn subclasses() -> &'static [&'static Driver] {
    DRIVERS
}

/// Drivers for one vendor, matched case-insensitively.
pub fn vendor_drivers(vendor: &str) -> Vec<&'static Driver> {
    DRIVERS
        .iter()
        .copied()
        .filter(|driver| driver.vendor.eq_ignore_ascii_case(vendor))
        .collect()
}

/// Drivers scoped to a set and a port to enumerate through.
#[derive(Clone)]
pub struct Registry {
    drivers: Vec<&'static Driver>,
    port: Arc<dyn Port>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let models: Vec<&str> = self.drivers.iter().map(|d| d.model).collect();
        f.debug_struct("Registry").field("drivers", &models).finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::all()
    }
}

impl Registry {
    /// Every driver, enumerating the host's devices.
    pub fn all() -> Self {
        Self::new(DRIVERS.to_vec(), Arc::new(SystemPort::new()))
    }

    /// One vendor's drivers, enumerating the host's devices.
    pub fn vendor(vendor: &str) -> Self {
        Self::new(vendor_drivers(vendor), Arc::new(SystemPort::new()))
    }

    pub fn new(drivers: Vec<&'static Driver>, port: Arc<dyn Port>) -> Self {
        Self { drivers, port }
    }

    /// The same drivers, enumerating through `port`.
    pub fn with_port(mut self, port: Arc<dyn Port>) -> Self {
        self.port = port;
        self
    }

    pub fn drivers(&self) -> &[&'static Driver] {
        &self.drivers
    }

    /// Vendor name to display names, across every driver in scope.
    pub fn supported_lights(&self) -> BTreeMap<&'static str, Vec<&'static str>> {
        let mut lights: BTreeMap<&'static str, Vec<&'static str>> = BTreeMap::new();
        for driver in &self.drivers {
            let names = lights.entry(driver.vendor).or_default();
            names.extend(driver.unique_device_names());
        }
        lights
    }

    /// Display names across every driver, without duplicates.
    pub fn unique_device_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Vec::new();
        for driver in &self.drivers {
            for name in driver.unique_device_names() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// First driver, in registry order, that claims `hardware`.
    pub fn claimant(&self, hardware: &Hardware) -> Option<&'static Driver> {
        self.drivers
            .iter()
            .copied()
            .find(|driver| driver.claims(hardware))
    }

    /// Group `hardware` by claiming driver.
    ///
    /// Unclaimed descriptors are dropped; each descriptor lands with at
    /// most one driver. Drivers appear in registry order.
    pub fn available_hardware_in(
        &self,
        hardware: impl IntoIterator<Item = Hardware>,
    ) -> Vec<(&'static Driver, Vec<Hardware>)> {
        let mut claimed: Vec<(&'static Driver, Vec<Hardware>)> = Vec::new();
        for descriptor in hardware {
            let Some(driver) = self.claimant(&descriptor) else {
                continue;
            };
            debug!("{} claims {descriptor}", driver.model);
            match claimed.iter_mut().find(|(d, _)| *d == driver) {
                Some((_, list)) => list.push(descriptor),
                None => claimed.push((driver, vec![descriptor])),
            }
        }
        claimed.sort_by_key(|(driver, _)| {
            self.drivers
                .iter()
                .position(|d| d == driver)
                .unwrap_or(usize::MAX)
        });
        claimed
    }

    /// Enumerate the port and group what it finds by claiming driver.
    ///
    /// # Errors
    ///
    /// [`LightError::Hardware`] when enumeration fails.
    pub fn available_hardware(&self) -> LightResult<Vec<(&'static Driver, Vec<Hardware>)>> {
        let hardware = self.port.enumerate(ConnectionType::Any)?;
        Ok(self.available_hardware_in(hardware))
    }

    /// Open `hardware` with `driver` through this registry's port.
    ///
    /// # Errors
    ///
    /// See [`Driver::open`].
    pub fn open_light(
        &self,
        driver: &'static Driver,
        hardware: Hardware,
        options: LightOptions,
    ) -> LightResult<LightHandle> {
        let transport = self.port.open(&hardware)?;
        driver.open(hardware, transport, options)
    }

    /// Open every claimed device.
    ///
    /// Fails fast: the first light that cannot be opened aborts the call
    /// and lights opened so far are dropped.
    ///
    /// # Errors
    ///
    /// Enumeration errors or the first construction error.
    pub fn all_lights(&self, options: LightOptions) -> LightResult<Vec<LightHandle>> {
        let mut lights = Vec::new();
        for (driver, hardware) in self.available_hardware()? {
            for descriptor in hardware {
                lights.push(self.open_light(driver, descriptor, options)?);
            }
        }
        info!("Opened {} lights", lights.len());
        Ok(lights)
    }

    /// Open the first claimed device.
    ///
    /// # Errors
    ///
    /// [`LightError::NoLightsFound`] when nothing is claimed, otherwise
    /// enumeration or construction errors.
    pub fn first_light(&self, options: LightOptions) -> LightResult<LightHandle> {
        let claimed = self.available_hardware()?;
        let Some((driver, descriptor)) = claimed
            .into_iter()
            .find_map(|(driver, hardware)| hardware.into_iter().next().map(|h| (driver, h)))
        else {
            return Err(LightError::NoLightsFound);
        };
        self.open_light(driver, descriptor, options)
    }
}

/// [`Registry::supported_lights`] over every driver.
pub fn supported_lights() -> BTreeMap<&'static str, Vec<&'static str>> {
    Registry::all().supported_lights()
}

/// [`Registry::unique_device_names`] over every driver.
pub fn unique_device_names() -> Vec<&'static str> {
    Registry::all().unique_device_names()
}

/// [`Registry::available_hardware`] over every driver and host device.
///
/// # Errors
///
/// Enumeration failures.
pub fn available_hardware() -> LightResult<Vec<(&'static Driver, Vec<Hardware>)>> {
    Registry::all().available_hardware()
}

/// [`Registry::available_hardware_in`] over every driver.
pub fn available_hardware_in(
    hardware: impl IntoIterator<Item = Hardware>,
) -> Vec<(&'static Driver, Vec<Hardware>)> {
    Registry::all().available_hardware_in(hardware)
}

/// [`Registry::all_lights`] over every driver and host device.
///
/// # Errors
///
/// See [`Registry::all_lights`].
pub fn all_lights(options: LightOptions) -> LightResult<Vec<LightHandle>> {
    Registry::all().all_lights(options)
}

/// [`Registry::first_light`] over every driver and host device.
///
/// # Errors
///
/// See [`Registry::first_light`].
pub fn first_light(options: LightOptions) -> LightResult<LightHandle> {
    Registry::all().first_light(options)
}

/// Open `hardware` on the host with `driver`.
///
/// # Errors
///
/// See [`Driver::open`].
pub fn open_light(
    driver: &'static Driver,
    hardware: Hardware,
    options: LightOptions,
) -> LightResult<LightHandle> {
    Registry::all().open_light(driver, hardware, options)
}
