//! Device claiming, state encoding and keep-alive scheduling for USB status
//! lights.
//!
//! A [`Driver`] describes one light model: the USB ids it answers to, how
//! it claims hardware and how it builds a [`Light`]. The [`registry`] walks
//! every driver to match enumerated [`Hardware`] and open lights. Lights
//! serialize their device state with the `busylight-word` engine and push
//! it through a [`DeviceLink`]. Kuando lights additionally run a keep-alive
//! task from their [`TaskRegistry`].
//!
//! ```no_run
//! use busylight_core::{LightOptions, Rgb, registry};
//!
//! # fn main() -> busylight_core::LightResult<()> {
//! let mut light = registry::first_light(LightOptions::default())?;
//! light.on(Rgb::new(255, 0, 0), 0)?;
//! light.off(0)?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod color;
pub mod config;
pub mod driver;
pub mod error;
pub mod light;
pub mod link;
pub mod platform;
pub mod registry;
pub mod tasks;
pub mod udev;
pub mod vendors;


pub use busylight_hid::{ConnectionType, Hardware};
pub use color::{ColorState, Rgb};
pub use config::LightOptions;
pub use driver::{DeviceId, Driver};
pub use error::{LightError, LightResult, TaskError};
pub use light::{Light, LightCore, LightHandle, SortKey};
pub use link::{DeviceLink, WriteStrategy};
pub use platform::current_platform;
pub use registry::Registry;
pub use tasks::{ManagedTask, SpawnedTask, TaskPriority, TaskRegistry, TaskState, TaskStatus};
