//! Declared and padded chunk sizes

use std::fmt;

use crate::{FORM_SIZE, HEADER_SIZE};

/// The size of a chunk's data
///
/// `unpadded` is the value stored in the chunk's size field. `padded` is that
/// value rounded up to the next even number: odd-length data is followed by a
/// single pad byte that the size field does not count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkSize {
    unpadded: u64,
    padded: u64,
}

impl ChunkSize {
    /// Size for `unpadded` octets of data, adding a pad byte if `unpadded` is odd
    pub const fn pad_if_necessary(unpadded: u64) -> Self {
        Self {
            unpadded,
            padded: unpadded + (unpadded & 1),
        }
    }

    /// Size with no pad byte; `size` is expected to be even
    pub const fn exact(size: u64) -> Self {
        Self {
            unpadded: size,
            padded: size,
        }
    }

    /// The value stored in the size field
    pub const fn unpadded(&self) -> u64 {
        self.unpadded
    }

    /// The number of octets the data occupies including any pad byte
    pub const fn padded(&self) -> u64 {
        self.padded
    }

    /// Returns `true` if a pad byte follows the data
    pub const fn is_padded(&self) -> bool {
        self.padded != self.unpadded
    }

    /// Header plus padded data, or `None` on overflow
    pub fn checked_total(&self) -> Option<u64> {
        self.padded.checked_add(HEADER_SIZE)
    }

    /// The same size with a leading form field removed
    pub(crate) fn without_form(&self) -> Self {
        Self::pad_if_necessary(self.unpadded.saturating_sub(FORM_SIZE))
    }
}

impl fmt::Display for ChunkSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_padded() {
            write!(f, "{} (padded {})", self.unpadded, self.padded)
        } else {
            write!(f, "{}", self.unpadded)
        }
    }
}
