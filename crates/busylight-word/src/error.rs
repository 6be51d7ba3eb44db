//! Errors raised by the word and field layer.

use thiserror::Error;

/// Word and bit-field errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WordError {
    /// Word length is zero or not a multiple of eight bits.
    #[error("Invalid word length {0}: must be a positive multiple of 8")]
    InvalidLength(usize),

    /// Bit index falls outside `[0, length)`.
    #[error("Bit index {index} out of range for {length}-bit word")]
    IndexOutOfRange {
        /// Requested bit index
        index: isize,
        /// Word length in bits
        length: usize,
    },

    /// Write attempted through a read-only field.
    #[error("Bit field [{start}, {stop}) is read-only")]
    Immutable {
        /// First bit of the field
        start: usize,
        /// One past the last bit of the field
        stop: usize,
    },
}

/// Result alias for word operations.
pub type WordResult<T> = Result<T, WordError>;
