//! Fixed-width bit registers for busylight wire protocols
//!
//! A [`Word`] is a byte-aligned unsigned register serialized big-endian.
//! Vendor device states are assembled from words plus `const` field
//! accessors ([`BitField`], [`ReadOnlyBitField`], [`BoolField`]) that read
//! and write named bit slices of the register.
//!
//! ```
//! use busylight_word::{BitField, Field, Word};
//!
//! const RED: BitField = BitField::new(16, 24);
//!
//! let mut word = Word::zeroed(24)?;
//! RED.set(&mut word, 0xAB)?;
//! assert_eq!(word.to_bytes(), vec![0xAB, 0x00, 0x00]);
//! assert_eq!(RED.get(&word), 0xAB);
//! # Ok::<(), busylight_word::WordError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod error;
pub mod field;
pub mod word;

pub use error::{WordError, WordResult};
pub use field::{BitField, BoolField, Field, ReadOnlyBitField};
pub use word::Word;
