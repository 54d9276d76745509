//! Ordered bit sequence shared by the encode and decode paths.

use std::fmt;
use std::str::FromStr;

/// An ordered sequence of bits.
///
/// Insertion order is payload order: bit 0 is the most significant bit
/// of the first payload byte. A `BitString` is never mutated once it has
/// been handed between pipeline stages; stages produce new values.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BitString {
    bits: Vec<bool>,
}

impl BitString {
    /// Creates an empty bit string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty bit string with room for `capacity` bits.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: Vec::with_capacity(capacity),
        }
    }

    /// Wraps an existing vector of bits.
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Returns the bits as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    /// Returns the number of bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Returns true if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Appends one bit.
    #[inline]
    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    /// Appends all bits of `other`.
    pub fn extend_from(&mut self, other: &BitString) {
        self.bits.extend_from_slice(&other.bits);
    }

    /// Returns a new bit string holding the first `len` bits.
    ///
    /// Returns a copy of the whole string if `len` exceeds its length.
    pub fn prefix(&self, len: usize) -> BitString {
        let end = len.min(self.bits.len());
        Self::from_bits(self.bits[..end].to_vec())
    }

    /// Iterates over consecutive chunks of at most `size` bits.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn chunks(&self, size: usize) -> std::slice::Chunks<'_, bool> {
        self.bits.chunks(size)
    }

    /// Counts the set bits.
    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Consumes the string and returns the underlying bits.
    pub fn into_bits(self) -> Vec<bool> {
        self.bits
    }
}

impl FromIterator<bool> for BitString {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self {
            bits: iter.into_iter().collect(),
        }
    }
}

/// Error parsing a textual `0`/`1` bit string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid bit character {found:?} at position {position}")]
pub struct ParseBitsError {
    /// Offending character.
    pub found: char,
    /// Character index within the input.
    pub position: usize,
}

impl FromStr for BitString {
    type Err = ParseBitsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .enumerate()
            .map(|(position, c)| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                found => Err(ParseBitsError { found, position }),
            })
            .collect()
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const PREVIEW: usize = 32;
        let preview: String = self
            .bits
            .iter()
            .take(PREVIEW)
            .map(|&b| if b { '1' } else { '0' })
            .collect();
        f.debug_struct("BitString")
            .field("len", &self.bits.len())
            .field("ones", &self.count_ones())
            .field("head", &preview)
            .finish()
    }
}
