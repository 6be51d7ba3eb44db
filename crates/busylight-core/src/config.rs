//! Options applied when a light is opened.

use serde::{Deserialize, Serialize};

use crate::error::{LightError, LightResult};

/// Longest keep-alive interval, in seconds, the Kuando firmware accepts.
pub const MAX_KEEPALIVE_INTERVAL: u8 = 15;

/// How a light is opened and kept alive.
///
/// Missing fields take their defaults, so `{}` is a valid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightOptions {
    /// Turn the light off as soon as it is opened.
    pub reset: bool,
    /// Hold the device open for the lifetime of the light instead of
    /// opening it around every write.
    pub exclusive: bool,
    /// Seconds the hardware waits for a heartbeat before reverting.
    pub keepalive_interval: u8,
}

impl Default for LightOptions {
    fn default() -> Self {
        Self {
            reset: true,
            exclusive: false,
            keepalive_interval: MAX_KEEPALIVE_INTERVAL,
        }
    }
}

impl LightOptions {
    pub fn new(reset: bool, exclusive: bool) -> Self {
        Self {
            reset,
            exclusive,
            ..Self::default()
        }
    }

    pub fn with_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }

    pub fn with_exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }

    pub fn with_keepalive_interval(mut self, seconds: u8) -> Self {
        self.keepalive_interval = seconds;
        self
    }

    /// Parse and validate options from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`LightError::Config`] for malformed JSON or unknown fields
    /// and [`LightError::InvalidArgument`] for an out of range interval.
    pub fn from_json(json: &str) -> LightResult<Self> {
        let options: Self =
            serde_json::from_str(json).map_err(|e| LightError::Config(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// # Errors
    ///
    /// Returns [`LightError::InvalidArgument`] when the keep-alive interval
    /// exceeds [`MAX_KEEPALIVE_INTERVAL`].
    pub fn validate(&self) -> LightResult<()> {
        if self.keepalive_interval > MAX_KEEPALIVE_INTERVAL {
            return Err(LightError::InvalidArgument(format!(
                "keepalive_interval {} exceeds {MAX_KEEPALIVE_INTERVAL} seconds",
                self.keepalive_interval
            )));
        }
        Ok(())
    }
}
