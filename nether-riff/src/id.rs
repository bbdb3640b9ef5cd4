//! Four-character chunk identifiers

use std::fmt;
use std::str::FromStr;

use crate::error::InvalidChunkId;
use crate::{FOURCC_FFIR, FOURCC_LIST, FOURCC_RIFF, FOURCC_RIFX};

/// A chunk identifier (FourCC)
///
/// Always exactly four bytes. The bytes are conventionally ASCII but are
/// stored and compared raw, so identifiers read from corrupted files are
/// still representable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId([u8; 4]);

impl ChunkId {
    /// Create an identifier from exactly four bytes
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Create an identifier from a slice, which must be four bytes long
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, InvalidChunkId> {
        let bytes: [u8; 4] = bytes.try_into().map_err(|_| InvalidChunkId {
            length: bytes.len(),
        })?;
        Ok(Self(bytes))
    }

    /// The raw identifier bytes
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Returns `true` for `RIFF`, `RIFX`, `FFIR` and `LIST`, which carry a form
    /// type and subchunks
    pub fn is_container(&self) -> bool {
        *self == FOURCC_RIFF || *self == FOURCC_RIFX || *self == FOURCC_FFIR || *self == FOURCC_LIST
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkId(\"{}\")", self)
    }
}

impl FromStr for ChunkId {
    type Err = InvalidChunkId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(s.as_bytes())
    }
}

impl TryFrom<&str> for ChunkId {
    type Error = InvalidChunkId;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<&[u8]> for ChunkId {
    type Error = InvalidChunkId;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(value)
    }
}

impl From<[u8; 4]> for ChunkId {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_exact() {
        let id = ChunkId::from_bytes(b"fmt ").unwrap();
        assert_eq!(id.as_bytes(), b"fmt ");
        assert_eq!(id, ChunkId::new(*b"fmt "));
    }

    #[test]
    fn test_from_bytes_wrong_length() {
        assert_eq!(
            ChunkId::from_bytes(b"abc"),
            Err(InvalidChunkId { length: 3 })
        );
        assert_eq!(
            ChunkId::from_bytes(b"abcde"),
            Err(InvalidChunkId { length: 5 })
        );
        assert!("".parse::<ChunkId>().is_err());
    }

    #[test]
    fn test_equality_is_byte_exact() {
        let upper: ChunkId = "LIST".parse().unwrap();
        let lower: ChunkId = "list".parse().unwrap();
        assert_ne!(upper, lower);
        assert!(upper.is_container());
        assert!(!lower.is_container());
    }

    #[test]
    fn test_display_escapes_non_ascii() {
        assert_eq!(ChunkId::new(*b"data").to_string(), "data");
        assert_eq!(ChunkId::new([0, b'a', 0xff, b' ']).to_string(), "\\x00a\\xff ");
    }
}
