//! Per-file byte order

use byteorder::{BigEndian, ByteOrder as _, LittleEndian};
use std::fmt;

use crate::id::ChunkId;
use crate::{FOURCC_FFIR, FOURCC_RIFF, FOURCC_RIFX};

/// Byte order of every multi-byte integer in a file, fixed by its root identifier
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// `RIFF` files
    #[default]
    LittleEndian,
    /// `RIFX` and `FFIR` files
    BigEndian,
}

impl ByteOrder {
    /// The byte order implied by a root identifier, if it is one
    pub fn for_root(id: ChunkId) -> Option<Self> {
        if id == FOURCC_RIFF {
            Some(Self::LittleEndian)
        } else if id == FOURCC_RIFX || id == FOURCC_FFIR {
            Some(Self::BigEndian)
        } else {
            None
        }
    }

    /// The conventional root identifier for files in this byte order
    pub fn root_id(self) -> ChunkId {
        match self {
            Self::LittleEndian => FOURCC_RIFF,
            Self::BigEndian => FOURCC_RIFX,
        }
    }

    /// Decode a size field
    pub fn read_u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            Self::LittleEndian => LittleEndian::read_u32(&bytes),
            Self::BigEndian => BigEndian::read_u32(&bytes),
        }
    }

    /// Encode a size field
    pub fn u32_bytes(self, value: u32) -> [u8; 4] {
        let mut buf = [0u8; 4];
        match self {
            Self::LittleEndian => LittleEndian::write_u32(&mut buf, value),
            Self::BigEndian => BigEndian::write_u32(&mut buf, value),
        }
        buf
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LittleEndian => write!(f, "little-endian"),
            Self::BigEndian => write!(f, "big-endian"),
        }
    }
}
