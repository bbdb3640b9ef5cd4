//! Nether-RIFF: RIFF container parser, builder and writer for Nethercore
//!
//! This crate reads and writes the chunk structure of RIFF-family files (WAV,
//! SF2, AVI and friends). Payload bytes are never interpreted; the crate only
//! deals with the tree of tagged, length-prefixed, word-aligned chunks.
//!
//! # Key Features
//!
//! - **Defensive parser**: Every size field is checked against the region that
//!   contains it, so corrupted input produces a [`ParseError`], never a panic
//! - **Both byte orders**: `RIFF` (little-endian) and `RIFX`/`FFIR` (big-endian)
//! - **Builder**: Describe a file as a chunk tree before any bytes exist
//! - **Two-pass writer**: Container sizes are backpatched once children are written
//! - **Bounded payload writers**: A chunk's data writer cannot write past its declared size
//!
//! # RIFF Format Overview
//!
//! Every chunk is laid out as:
//!
//! ```text
//! ID (4) | SIZE (u32) | [FORM (4)] | DATA (SIZE bytes, minus 4 if FORM) | [PAD (1)]
//! ```
//!
//! - `FORM` is present only for the container markers `RIFF`, `RIFX`, `FFIR` and `LIST`
//! - `PAD` is a single zero byte present iff `SIZE` is odd
//!
//! # Usage
//!
//! ```ignore
//! use nether_riff::parse_riff;
//!
//! let data = std::fs::read("sound.wav").unwrap();
//! let file = parse_riff("sound.wav", &data).unwrap();
//!
//! for chunk in file.linearized_chunks() {
//!     println!("{}", chunk);
//! }
//! ```
//!
//! # Format Reference
//!
//! - Microsoft Multimedia Programming Interface and Data Specifications 1.0
//! - <https://en.wikipedia.org/wiki/Resource_Interchange_File_Format>

mod builder;
mod channel;
mod chunk;
mod error;
mod id;
mod order;
mod parser;
mod size;
mod writer;

pub use builder::{ChunkBuilder, ChunkDescription, DataWriter, FileDescription, RiffFileBuilder};
pub use channel::{RelativeChannel, RestrictedChannel, SeekableChannel};
pub use chunk::{ParsedChunk, ParsedFile};
pub use error::{
    Access, BuilderError, ChunkMissing, InvalidChunkId, OutOfBoundsError, ParseError, ParseErrorKind,
    RiffError, WriteError, WriteErrorKind,
};
pub use id::ChunkId;
pub use order::ByteOrder;
pub use parser::{RiffParser, parse_riff};
pub use size::ChunkSize;
pub use writer::RiffWriter;

// =============================================================================
// Constants
// =============================================================================

/// Little-endian root marker "RIFF"
pub const FOURCC_RIFF: ChunkId = ChunkId::new(*b"RIFF");

/// Big-endian root marker "RIFX"
pub const FOURCC_RIFX: ChunkId = ChunkId::new(*b"RIFX");

/// Big-endian root marker "FFIR" (byte-swapped "RIFF")
pub const FOURCC_FFIR: ChunkId = ChunkId::new(*b"FFIR");

/// Nested container marker "LIST"
pub const FOURCC_LIST: ChunkId = ChunkId::new(*b"LIST");

/// Size of a chunk identifier in octets
pub const CHUNK_ID_SIZE: u64 = 4;

/// Size of a chunk size field in octets
pub const SIZE_FIELD_SIZE: u64 = 4;

/// Size of a container form type in octets
pub const FORM_SIZE: u64 = 4;

/// Size of a chunk header (ID + size field) in octets
pub const HEADER_SIZE: u64 = CHUNK_ID_SIZE + SIZE_FIELD_SIZE;

/// Default maximum container nesting depth accepted by the parser
pub const DEFAULT_MAX_DEPTH: usize = 64;

// =============================================================================
// Tests
// =============================================================================
