//! The light contract shared by every vendor driver.
//!
//! A concrete light is a [`LightCore`] (hardware link, options, color,
//! sort key and task registry) plus whatever device state its protocol
//! needs. Drivers implement [`Light::to_bytes`] and [`Light::on`]; the
//! write path, batching, ordering and task plumbing come from here.

use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use busylight_hid::{Hardware, Transport};
use tracing::{debug, error};

use crate::color::{ColorState, Rgb};
use crate::config::LightOptions;
use crate::driver::Driver;
use crate::error::{LightError, LightResult, TaskError};
use crate::link::DeviceLink;
use crate::tasks::{ManagedTask, TaskPriority, TaskRegistry};

/// `(vendor, name, path)` with vendor and name lowercased.
///
/// Equality, ordering and hashing of lights all go through this key. The
/// hash is computed once at construction.
#[derive(Debug, Clone)]
pub struct SortKey {
    vendor: String,
    name: String,
    path: String,
    hash: u64,
}

impl SortKey {
    /// Key for a light; vendor and name compare case-insensitively.
    pub fn new(vendor: &str, name: &str, path: &str) -> Self {
        let vendor = vendor.to_lowercase();
        let name = name.to_lowercase();
        let path = path.to_string();
        let mut hasher = DefaultHasher::new();
        (&vendor, &name, &path).hash(&mut hasher);
        Self {
            hash: hasher.finish(),
            vendor,
            name,
            path,
        }
    }

    /// `(vendor, name, path)` as stored, lowercased where applicable.
    pub fn as_tuple(&self) -> (&str, &str, &str) {
        (&self.vendor, &self.name, &self.path)
    }

    /// The cached hash of the key tuple.
    pub fn cached_hash(&self) -> u64 {
        self.hash
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.as_tuple() == other.as_tuple()
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_tuple().cmp(&other.as_tuple())
    }
}

impl Hash for SortKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

/// State every light carries regardless of vendor.
pub struct LightCore {
    driver: &'static Driver,
    name: &'static str,
    hardware: Hardware,
    link: DeviceLink,
    options: LightOptions,
    color: ColorState,
    sort_key: SortKey,
    tasks: TaskRegistry,
}

impl fmt::Debug for LightCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LightCore")
            .field("driver", &self.driver.model)
            .field("name", &self.name)
            .field("path", &self.hardware.path)
            .field("options", &self.options)
            .field("color", &self.color)
            .finish()
    }
}

impl LightCore {
    /// Acquire `transport` for `driver`.
    ///
    /// Claiming is the caller's job; see [`Driver::open`].
    ///
    /// # Errors
    ///
    /// [`LightError::HardwareUnavailable`] when the device cannot be opened.
    pub fn new(
        driver: &'static Driver,
        hardware: Hardware,
        transport: Box<dyn Transport>,
        options: LightOptions,
        platform: impl Into<String>,
    ) -> LightResult<Self> {
        let link = DeviceLink::new(
            transport,
            platform,
            driver.write_strategy,
            options.exclusive,
        );
        link.acquire()?;
        if !options.exclusive {
            link.release();
        }
        let name = driver.name_for(&hardware);
        let sort_key = SortKey::new(driver.vendor, name, &hardware.path);
        debug!("Opened {} {name} at {}", driver.vendor, hardware.path);
        Ok(Self {
            driver,
            name,
            hardware,
            link,
            options,
            color: ColorState::default(),
            sort_key,
            tasks: TaskRegistry::new(),
        })
    }

    pub fn driver(&self) -> &'static Driver {
        self.driver
    }

    /// Display name the driver declares for this hardware's id.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn hardware(&self) -> &Hardware {
        &self.hardware
    }

    /// The shared write path to the device.
    pub fn link(&self) -> &DeviceLink {
        &self.link
    }

    /// Options the light was opened with.
    pub fn options(&self) -> &LightOptions {
        &self.options
    }

    /// Last color requested, not necessarily what the device shows.
    pub fn color(&self) -> Rgb {
        self.color.color()
    }

    /// Record `color` without writing to the device.
    pub fn set_color(&mut self, color: Rgb) {
        self.color.set_color(color);
    }

    pub fn sort_key(&self) -> &SortKey {
        &self.sort_key
    }

    /// Background tasks owned by this light, cancelled on drop.
    pub fn tasks(&self) -> &TaskRegistry {
        &self.tasks
    }

    /// Send `payload` through the link.
    ///
    /// # Errors
    ///
    /// [`LightError::LightUnavailable`] when the write fails.
    pub fn write(&self, payload: &[u8]) -> LightResult<()> {
        self.link.write(payload)?;
        Ok(())
    }
}

impl Drop for LightCore {
    fn drop(&mut self) {
        if let Err(e) = self.tasks.cancel_tasks(None) {
            error!("Failed to cancel tasks for {}: {e}", self.name);
        }
        if self.options.exclusive {
            self.link.release();
        }
    }
}

/// One physical status light.
pub trait Light: Send {
    fn core(&self) -> &LightCore;

    fn core_mut(&mut self) -> &mut LightCore;

    /// The exact payload the firmware expects for the current state.
    ///
    /// # Errors
    ///
    /// [`LightError::Unsupported`] when the state holds a command the
    /// driver cannot encode.
    fn to_bytes(&self) -> LightResult<Vec<u8>>;

    /// Light `led` (0 for every LED) with `color`.
    ///
    /// # Errors
    ///
    /// Transport failures from the resulting write.
    fn on(&mut self, color: Rgb, led: u8) -> LightResult<()>;

    /// # Errors
    ///
    /// Transport failures from the resulting write.
    fn off(&mut self, led: u8) -> LightResult<()> {
        self.on(Rgb::OFF, led)
    }

    /// Return the device to a known dark state.
    ///
    /// # Errors
    ///
    /// Transport failures from the resulting write.
    fn reset(&mut self) -> LightResult<()> {
        self.off(0)
    }

    /// Serialize the current state and write it to the device.
    ///
    /// # Errors
    ///
    /// [`LightError::LightUnavailable`] when the write fails.
    fn update(&self) -> LightResult<()> {
        let payload = self.to_bytes()?;
        self.core().write(&payload)
    }

    /// Apply several mutations and write once.
    ///
    /// The write happens only if `f` returns `Ok`.
    ///
    /// # Errors
    ///
    /// Whatever `f` returns, or the error from the single write.
    fn batch_update<R, F>(&mut self, f: F) -> LightResult<R>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> LightResult<R>,
    {
        let value = f(self)?;
        self.update()?;
        Ok(value)
    }

    fn driver(&self) -> &'static Driver {
        self.core().driver()
    }

    fn name(&self) -> &str {
        self.core().name()
    }

    fn vendor(&self) -> &str {
        self.core().driver().vendor
    }

    fn hardware(&self) -> &Hardware {
        self.core().hardware()
    }

    fn path(&self) -> &str {
        &self.core().hardware().path
    }

    fn platform(&self) -> String {
        self.core().link().platform()
    }

    fn sort_key(&self) -> &SortKey {
        self.core().sort_key()
    }

    fn color(&self) -> Rgb {
        self.core().color()
    }

    fn set_color(&mut self, color: Rgb) {
        self.core_mut().set_color(color);
    }

    fn is_lit(&self) -> bool {
        self.color().is_lit()
    }

    /// Current payload as colon separated hex bytes.
    ///
    /// # Errors
    ///
    /// See [`Light::to_bytes`].
    fn hex(&self) -> LightResult<String> {
        Ok(self
            .to_bytes()?
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect::<Vec<_>>()
            .join(":"))
    }

    fn is_button(&self) -> bool {
        false
    }

    /// Read the button state of lights that have one.
    ///
    /// # Errors
    ///
    /// [`LightError::Unsupported`] for lights without a button.
    fn button_on(&mut self) -> LightResult<bool> {
        Err(LightError::Unsupported(format!(
            "{} has no button",
            self.name()
        )))
    }

    fn tasks(&self) -> &TaskRegistry {
        self.core().tasks()
    }

    fn cancel_task(&self, name: &str) -> Option<Arc<dyn ManagedTask>> {
        self.core().tasks().cancel_task(name)
    }

    /// # Errors
    ///
    /// See [`TaskRegistry::cancel_tasks`].
    fn cancel_tasks(&self, priority: Option<TaskPriority>) -> Result<usize, TaskError> {
        self.core().tasks().cancel_tasks(priority)
    }
}

/// An opened light of any vendor.
pub type LightHandle = Box<dyn Light>;

impl dyn Light {
    /// [`Light::batch_update`] for trait objects such as a [`LightHandle`].
    ///
    /// # Errors
    ///
    /// Whatever `f` returns, or the error from the single write.
    pub fn batch_update_dyn<R>(
        &mut self,
        f: impl FnOnce(&mut dyn Light) -> LightResult<R>,
    ) -> LightResult<R> {
        let value = f(self)?;
        self.update()?;
        Ok(value)
    }
}

impl PartialEq for dyn Light {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for dyn Light {}

impl PartialOrd for dyn Light {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for dyn Light {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(other.sort_key())
    }
}

impl Hash for dyn Light {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sort_key().hash(state);
    }
}

impl fmt::Debug for dyn Light {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (vendor, name, path) = self.sort_key().as_tuple();
        write!(f, "Light({vendor}, {name}, {path})")
    }
}

impl fmt::Display for dyn Light {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.vendor(), self.name(), self.path())
    }
}
