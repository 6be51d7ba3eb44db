//! Byte-aligned unsigned register.

use std::fmt;

use crate::error::{WordError, WordResult};

/// A fixed-width unsigned register whose length is a multiple of eight bits.
///
/// Storage is big-endian: the first byte holds the most significant bits.
/// Bit `0` is the least significant bit of the last byte.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Word {
    bytes: Vec<u8>,
}

impl Word {
    /// Create a word of `length` bits holding `value`.
    ///
    /// Bits of `value` above `length` are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`WordError::InvalidLength`] when `length` is zero or not a
    /// multiple of eight.
    pub fn new(value: u128, length: usize) -> WordResult<Self> {
        let mut word = Self::zeroed(length)?;
        for (shift, byte) in word.bytes.iter_mut().rev().enumerate().take(16) {
            *byte = (value >> (shift * 8)) as u8;
        }
        Ok(word)
    }

    /// Create an all-zero word of `length` bits.
    ///
    /// # Errors
    ///
    /// Returns [`WordError::InvalidLength`] for a zero or unaligned length.
    pub fn zeroed(length: usize) -> WordResult<Self> {
        if length == 0 || !length.is_multiple_of(8) {
            return Err(WordError::InvalidLength(length));
        }
        Ok(Self {
            bytes: vec![0; length / 8],
        })
    }

    /// Build a word from big-endian bytes.
    ///
    /// # Errors
    ///
    /// Returns [`WordError::InvalidLength`] when `bytes` is empty.
    pub fn from_bytes(bytes: &[u8]) -> WordResult<Self> {
        if bytes.is_empty() {
            return Err(WordError::InvalidLength(0));
        }
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// Build a word from a fixed big-endian byte array.
    ///
    /// Arrays must hold at least one byte; an empty array fails to compile.
    pub fn from_array<const N: usize>(bytes: [u8; N]) -> Self {
        const { assert!(N > 0, "a word holds at least one byte") };
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// Width in bits.
    pub fn len(&self) -> usize {
        self.bytes.len() * 8
    }

    /// Always false; words have at least eight bits.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Low 128 bits of the register.
    pub fn value(&self) -> u128 {
        self.bytes
            .iter()
            .rev()
            .take(16)
            .enumerate()
            .fold(0u128, |acc, (shift, byte)| {
                acc | (u128::from(*byte) << (shift * 8))
            })
    }

    /// Replace the register contents, masking `value` to the word width.
    pub fn set_value(&mut self, value: u128) {
        self.clear();
        for (shift, byte) in self.bytes.iter_mut().rev().enumerate().take(16) {
            *byte = (value >> (shift * 8)) as u8;
        }
    }

    /// Reset every bit to zero.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    /// Read bit `index`, where `0` is the least significant bit.
    ///
    /// # Errors
    ///
    /// Returns [`WordError::IndexOutOfRange`] for negative indices or
    /// indices at or beyond the word length.
    pub fn bit(&self, index: isize) -> WordResult<bool> {
        let position = self.checked_index(index)?;
        Ok(self.read_bit(position))
    }

    /// Set or clear bit `index`.
    ///
    /// # Errors
    ///
    /// Same range rules as [`Word::bit`].
    pub fn set_bit(&mut self, index: isize, value: bool) -> WordResult<()> {
        let position = self.checked_index(index)?;
        self.write_bit(position, value);
        Ok(())
    }

    /// Big-endian serialization, `len() / 8` bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// Borrow the big-endian bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercase hex text, `0x` prefixed and padded to the full width.
    pub fn hex(&self) -> String {
        let mut text = String::with_capacity(2 + self.bytes.len() * 2);
        text.push_str("0x");
        for byte in &self.bytes {
            text.push_str(&format!("{byte:02x}"));
        }
        text
    }

    /// Binary text, `0b` prefixed and padded to the full width.
    pub fn bin(&self) -> String {
        let mut text = String::with_capacity(2 + self.len());
        text.push_str("0b");
        for byte in &self.bytes {
            text.push_str(&format!("{byte:08b}"));
        }
        text
    }

    fn checked_index(&self, index: isize) -> WordResult<usize> {
        usize::try_from(index)
            .ok()
            .filter(|position| *position < self.len())
            .ok_or(WordError::IndexOutOfRange {
                index,
                length: self.len(),
            })
    }

    /// Bits at or beyond the word length read as zero.
    pub(crate) fn read_bit(&self, position: usize) -> bool {
        let Some(offset) = self.byte_offset(position) else {
            return false;
        };
        self.bytes
            .get(offset)
            .is_some_and(|byte| (byte >> (position % 8)) & 1 == 1)
    }

    pub(crate) fn write_bit(&mut self, position: usize, value: bool) {
        let Some(offset) = self.byte_offset(position) else {
            return;
        };
        if let Some(byte) = self.bytes.get_mut(offset) {
            let mask = 1u8 << (position % 8);
            if value {
                *byte |= mask;
            } else {
                *byte &= !mask;
            }
        }
    }

    fn byte_offset(&self, position: usize) -> Option<usize> {
        self.bytes.len().checked_sub(1 + position / 8)
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word({}, {})", self.hex(), self.len())
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

impl From<Word> for Vec<u8> {
    fn from(word: Word) -> Self {
        word.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_lengths_keep_top_bit() -> WordResult<()> {
        for length in [8usize, 16, 32, 64] {
            let value = 1u128 << (length - 1);
            let word = Word::new(value, length)?;
            assert_eq!(word.value(), value);
            assert_eq!(word.len(), length);
            assert_eq!(word.to_bytes().len(), length / 8);
        }
        Ok(())
    }

    #[test]
    fn test_value_one_past_width_masks_to_zero() -> WordResult<()> {
        for length in [8usize, 16, 32, 64] {
            let word = Word::new(1u128 << length, length)?;
            assert_eq!(word.value(), 0);
        }
        Ok(())
    }

    #[test]
    fn test_invalid_lengths() {
        for length in (0..8).chain(9..13) {
            assert_eq!(
                Word::new(0, length),
                Err(WordError::InvalidLength(length)),
                "length {length} should be rejected"
            );
        }
    }

    #[test]
    fn test_wide_word_beyond_u128() -> WordResult<()> {
        let mut word = Word::zeroed(512)?;
        word.set_bit(511, true)?;
        assert_eq!(word.as_bytes().first(), Some(&0x80));
        assert_eq!(word.value(), 0);
        Ok(())
    }

    #[test]
    fn test_clear() -> WordResult<()> {
        let mut word = Word::new(0xFFFF, 16)?;
        word.clear();
        assert_eq!(word.value(), 0);
        assert_eq!(word.len(), 16);
        Ok(())
    }

    #[test]
    fn test_bit_get_and_set() -> WordResult<()> {
        let mut word = Word::zeroed(8)?;
        for index in 0..8 {
            assert!(!word.bit(index)?);
            word.set_bit(index, true)?;
            assert!(word.bit(index)?);
        }
        assert_eq!(word.value(), 0xFF);
        word.set_bit(3, false)?;
        assert_eq!(word.value(), 0xF7);
        Ok(())
    }

    #[test]
    fn test_bit_index_out_of_range() -> WordResult<()> {
        let mut word = Word::zeroed(8)?;
        let past_end = WordError::IndexOutOfRange {
            index: 8,
            length: 8,
        };
        let negative = WordError::IndexOutOfRange {
            index: -1,
            length: 8,
        };
        assert_eq!(word.bit(8), Err(past_end));
        assert_eq!(word.bit(-1), Err(negative));
        assert_eq!(word.set_bit(8, true), Err(past_end));
        assert_eq!(word.set_bit(-1, true), Err(negative));
        Ok(())
    }

    #[test]
    fn test_big_endian_bytes_and_text() -> WordResult<()> {
        let word = Word::new(0x0102_0304, 32)?;
        assert_eq!(word.to_bytes(), vec![0x01, 0x02, 0x03, 0x04]);
        assert_eq!(word.hex(), "0x01020304");
        assert_eq!(Word::new(5, 8)?.bin(), "0b00000101");
        assert_eq!(format!("{word:?}"), "Word(0x01020304, 32)");
        Ok(())
    }

    #[test]
    fn test_from_bytes_round_trip() -> WordResult<()> {
        let word = Word::from_bytes(&[0xDE, 0xAD])?;
        assert_eq!(word.value(), 0xDEAD);
        assert_eq!(word, Word::new(0xDEAD, 16)?);
        assert_eq!(Word::from_bytes(&[]), Err(WordError::InvalidLength(0)));
        Ok(())
    }

    #[test]
    fn test_from_array() -> WordResult<()> {
        let word = Word::from_array([0x12, 0x34, 0x56]);
        assert_eq!(word.len(), 24);
        assert_eq!(word, Word::new(0x12_3456, 24)?);
        Ok(())
    }

    #[test]
    fn test_equality_includes_length() -> WordResult<()> {
        assert_ne!(Word::new(1, 8)?, Word::new(1, 16)?);
        Ok(())
    }
}
