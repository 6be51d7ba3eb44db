//! Named accessors over bit slices of a [`Word`].
//!
//! Fields are plain `const` values declared next to the state struct that
//! owns the word. Several fields may overlap the same bits; layout is the
//! declaring protocol's responsibility.

use crate::error::{WordError, WordResult};
use crate::word::Word;

/// Read/write access to a slice of a [`Word`].
pub trait Field {
    /// First bit of the slice.
    fn start(&self) -> usize;

    /// One past the last bit of the slice.
    fn stop(&self) -> usize;

    /// Read the slice as an unsigned integer.
    fn get(&self, word: &Word) -> u64;

    /// Replace the slice with `value`, dropping bits wider than the slice.
    ///
    /// # Errors
    ///
    /// Fails with [`WordError::IndexOutOfRange`] when the slice extends
    /// past the word, or [`WordError::Immutable`] for read-only fields.
    fn set(&self, word: &mut Word, value: u64) -> WordResult<()>;

    /// Slice width in bits.
    fn width(&self) -> usize {
        self.stop().saturating_sub(self.start())
    }

    /// Mask covering `width()` low bits.
    fn mask(&self) -> u64 {
        match self.width() {
            0 => 0,
            w if w >= 64 => u64::MAX,
            w => (1u64 << w) - 1,
        }
    }
}

/// Writable bit slice `[start, stop)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitField {
    start: usize,
    stop: usize,
}

impl BitField {
    /// Field covering bits `[start, stop)`.
    ///
    /// Slices wider than 64 bits are clamped to 64 bits.
    pub const fn new(start: usize, stop: usize) -> Self {
        let stop = if stop < start {
            start
        } else if stop - start > 64 {
            start + 64
        } else {
            stop
        };
        Self { start, stop }
    }

    /// Field of `width` bits beginning at `offset`.
    pub const fn with_width(offset: usize, width: usize) -> Self {
        Self::new(offset, offset + width)
    }

    /// Write `value` into the slice, dropping bits that fall past the end
    /// of `word`.
    ///
    /// Device states whose fields are laid out inside a fixed-width word
    /// use this infallible form; [`Field::set`] is the checked one.
    pub fn put(&self, word: &mut Word, value: u64) {
        let value = value & self.mask();
        for (shift, position) in (self.start..self.stop).enumerate() {
            word.write_bit(position, (value >> shift) & 1 == 1);
        }
    }

    /// The same slice, rejecting writes.
    pub const fn read_only(self) -> ReadOnlyBitField {
        ReadOnlyBitField(self)
    }
}

impl Field for BitField {
    fn start(&self) -> usize {
        self.start
    }

    fn stop(&self) -> usize {
        self.stop
    }

    fn get(&self, word: &Word) -> u64 {
        (self.start..self.stop)
            .enumerate()
            .fold(0u64, |acc, (shift, position)| {
                acc | (u64::from(word.read_bit(position)) << shift)
            })
    }

    fn set(&self, word: &mut Word, value: u64) -> WordResult<()> {
        if self.stop > word.len() {
            return Err(WordError::IndexOutOfRange {
                index: isize::try_from(self.stop - 1).unwrap_or(isize::MAX),
                length: word.len(),
            });
        }
        self.put(word, value);
        Ok(())
    }
}

/// Bit slice that can be read but never written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReadOnlyBitField(BitField);

impl ReadOnlyBitField {
    /// Read-only field covering bits `[start, stop)`.
    pub const fn new(start: usize, stop: usize) -> Self {
        Self(BitField::new(start, stop))
    }
}

impl Field for ReadOnlyBitField {
    fn start(&self) -> usize {
        self.0.start
    }

    fn stop(&self) -> usize {
        self.0.stop
    }

    fn get(&self, word: &Word) -> u64 {
        self.0.get(word)
    }

    fn set(&self, _word: &mut Word, _value: u64) -> WordResult<()> {
        Err(WordError::Immutable {
            start: self.0.start,
            stop: self.0.stop,
        })
    }
}

/// One-bit flag read back as `0xFF`/`0`.
///
/// Writes store `1` for any odd value and `0` for any even value, which is
/// how MuteMe style firmware encodes its on/off channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoolField(BitField);

impl BoolField {
    /// Flag stored at bit `offset`.
    pub const fn new(offset: usize) -> Self {
        Self(BitField::new(offset, offset + 1))
    }
}

impl BoolField {
    /// Infallible write, see [`BitField::put`].
    pub fn put(&self, word: &mut Word, value: u64) {
        self.0.put(word, value & 1);
    }
}

impl Field for BoolField {
    fn start(&self) -> usize {
        self.0.start
    }

    fn stop(&self) -> usize {
        self.0.stop
    }

    fn get(&self, word: &Word) -> u64 {
        if self.0.get(word) != 0 { 0xFF } else { 0 }
    }

    fn set(&self, word: &mut Word, value: u64) -> WordResult<()> {
        self.0.set(word, value & 1)
    }
}
