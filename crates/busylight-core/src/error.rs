//! Error types for lights, the registry and background tasks.

use busylight_hid::HardwareError;
use busylight_word::WordError;
use thiserror::Error;

/// Errors raised while claiming, opening or driving a light.
#[derive(Debug, Error)]
pub enum LightError {
    /// The driver does not claim this hardware.
    #[error("Unsupported hardware {vendor_id:#06x}:{product_id:#06x} for {driver}")]
    HardwareUnsupported {
        /// Driver that rejected the hardware
        driver: String,
        /// USB vendor ID
        vendor_id: u16,
        /// USB product ID
        product_id: u16,
    },

    /// The hardware could not be acquired, usually because it is held.
    #[error("Hardware unavailable at {path}: {source}")]
    HardwareUnavailable {
        /// Device path
        path: String,
        /// Transport failure
        #[source]
        source: HardwareError,
    },

    /// A write to an acquired light failed.
    #[error("Light unavailable: {name} at {path}: {source}")]
    LightUnavailable {
        /// Device display name
        name: String,
        /// Device path
        path: String,
        /// Transport failure
        #[source]
        source: HardwareError,
    },

    /// Discovery found nothing to open.
    #[error("No lights found")]
    NoLightsFound,

    /// An argument was outside its accepted range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The light does not implement the requested feature.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Options could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Device state encoding failed.
    #[error(transparent)]
    Word(#[from] WordError),

    /// Enumeration or transport failure outside of a light write.
    #[error(transparent)]
    Hardware(#[from] HardwareError),

    /// Background task failure.
    #[error(transparent)]
    Task(#[from] TaskError),
}

impl LightError {
    /// True for failures where retrying discovery may help.
    pub fn is_discovery_error(&self) -> bool {
        matches!(self, Self::NoLightsFound | Self::Hardware(_))
    }

    /// True when the hardware exists but no driver will drive it.
    pub fn is_claim_error(&self) -> bool {
        matches!(self, Self::HardwareUnsupported { .. })
    }
}

/// Errors raised by the per-light task registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// No tokio runtime is available to spawn onto.
    #[error("No async runtime available to run task '{0}'")]
    NoRuntime(String),

    /// The task refused or failed to cancel.
    #[error("Failed to cancel task '{name}': {reason}")]
    CancelFailed {
        /// Task name
        name: String,
        /// Why cancellation failed
        reason: String,
    },
}

/// Result alias for light operations.
pub type LightResult<T> = Result<T, LightError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LightError::HardwareUnsupported {
            driver: "Kuando Busylight Alpha".to_string(),
            vendor_id: 0x1234,
            product_id: 0x00AB,
        };
        assert_eq!(
            err.to_string(),
            "Unsupported hardware 0x1234:0x00ab for Kuando Busylight Alpha"
        );
        assert_eq!(LightError::NoLightsFound.to_string(), "No lights found");
        assert_eq!(
            TaskError::NoRuntime("keepalive".to_string()).to_string(),
            "No async runtime available to run task 'keepalive'"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(LightError::NoLightsFound.is_discovery_error());
        assert!(!LightError::NoLightsFound.is_claim_error());
        let unsupported = LightError::HardwareUnsupported {
            driver: String::new(),
            vendor_id: 0,
            product_id: 0,
        };
        assert!(unsupported.is_claim_error());
        assert!(!unsupported.is_discovery_error());
    }

    #[test]
    fn test_word_error_converts() {
        let err: LightError = WordError::InvalidLength(3).into();
        assert!(matches!(err, LightError::Word(WordError::InvalidLength(3))));
    }
}
