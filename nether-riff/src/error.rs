//! Error types for RIFF parsing, building and writing

use std::fmt;
use std::io;

use thiserror::Error;

use crate::id::ChunkId;

/// A chunk identifier was constructed from the wrong number of bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("chunk identifiers must be exactly 4 bytes, got {length}")]
pub struct InvalidChunkId {
    /// Number of bytes supplied
    pub length: usize,
}

/// Malformed input detected by the parser
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{origin}: offset 0x{offset:x}: {kind}")]
pub struct ParseError {
    /// Source identifier supplied by the caller
    pub origin: String,
    /// Absolute offset of the chunk (or position) where the problem was found
    pub offset: u64,
    /// What went wrong
    pub kind: ParseErrorKind,
}

/// The kinds of malformed input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// The file does not start with `RIFF`, `RIFX` or `FFIR`
    #[error("starting chunk must be one of RIFF|RIFX|FFIR, received {received}")]
    InvalidMagic { received: ChunkId },

    /// Fewer bytes remain than a header or form field requires
    #[error("truncated: need {needed} octets, {remaining} remain")]
    Truncated { needed: u64, remaining: u64 },

    /// A size field claims more data than its enclosing region holds
    #[error("chunk {id} declares {declared} octets (padded {padded}) but only {available} are available")]
    DeclaredSizeExceedsAvailable {
        id: ChunkId,
        declared: u64,
        padded: u64,
        available: u64,
    },

    /// A container's size cannot even hold its form field
    #[error("chunk too small: {id} declares {size} octets")]
    ChunkTooSmall { id: ChunkId, size: u64 },

    /// A container's size leaves no room for a subchunk after the form field
    #[error("chunk too small to contain any subchunks: {id} has {size} octets of contents")]
    TooSmallForSubchunks { id: ChunkId, size: u64 },

    /// Containers are nested deeper than the parser accepts
    #[error("chunk {id} is nested too deeply (limit {limit})")]
    NestingTooDeep { id: ChunkId, limit: usize },
}

/// Misuse of the file builder
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    /// A chunk was given both subchunks and a data writer
    #[error("chunk {id} cannot have both subchunks and data")]
    MixedContent { id: ChunkId },

    /// `build` was called before a root chunk was set
    #[error("no root chunk was provided")]
    NoRootChunk,

    /// A chunk builder was never closed
    #[error("chunk builder for {id} has not been closed")]
    UnclosedChunk { id: ChunkId },
}

/// A failure while serializing a file description
#[derive(Debug, Error)]
#[error("{origin}: position 0x{position:x}: {kind}")]
pub struct WriteError {
    /// Destination identifier supplied by the caller
    pub origin: String,
    /// Destination channel position when the failure happened
    pub position: u64,
    /// What went wrong
    #[source]
    pub kind: WriteErrorKind,
}

/// The kinds of write failure
#[derive(Debug, Error)]
pub enum WriteErrorKind {
    /// A chunk's data writer wrote outside its declared size
    #[error("data writer for chunk {id} attempted an out-of-bounds write (chunk data at 0x{offset:x})")]
    OutOfBounds {
        id: ChunkId,
        offset: u64,
        #[source]
        source: OutOfBoundsError,
    },

    /// The destination accepted fewer bytes than requested
    #[error("short write at 0x{offset:x}: expected {expected} octets, wrote {wrote}")]
    ShortWrite {
        offset: u64,
        expected: usize,
        wrote: usize,
    },

    /// A computed size does not fit in a 32-bit size field
    #[error("size of chunk {id} does not fit in a size field")]
    SizeOverflow { id: ChunkId },

    /// Any other destination I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Direction of a rejected channel access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
        }
    }
}

/// A restricted channel rejected an access crossing its upper bound
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "attempted to {access} outside of the bounds of a restricted channel: attempted [{start}, {end}), permitted [0, {limit})"
)]
pub struct OutOfBoundsError {
    pub access: Access,
    pub start: u64,
    pub end: u64,
    pub limit: u64,
}

impl OutOfBoundsError {
    /// Recover the bounds violation carried by an I/O error, if any
    ///
    /// Wrapping I/O errors and `source()` chains are followed.
    pub fn find(err: &io::Error) -> Option<&OutOfBoundsError> {
        let mut next: Option<&(dyn std::error::Error + 'static)> = err.get_ref().map(|inner| inner as _);
        while let Some(current) = next {
            if let Some(found) = current.downcast_ref::<OutOfBoundsError>() {
                return Some(found);
            }
            // io::Error::source skips its own payload
            next = match current.downcast_ref::<io::Error>() {
                Some(wrapped) => wrapped.get_ref().map(|inner| inner as _),
                None => current.source(),
            };
        }
        None
    }
}

impl From<OutOfBoundsError> for io::Error {
    fn from(err: OutOfBoundsError) -> Self {
        io::Error::new(io::ErrorKind::InvalidInput, err)
    }
}

/// A required subchunk was not present
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("required chunk not found: expected {expected}{} as a subchunk of {parent}", form_suffix(.form))]
pub struct ChunkMissing {
    /// The identifier searched for
    pub expected: ChunkId,
    /// The form type searched for, if any
    pub form: Option<ChunkId>,
    /// The chunk that was searched
    pub parent: ChunkId,
}

fn form_suffix(form: &Option<ChunkId>) -> String {
    match form {
        Some(form) => format!(" (form {form})"),
        None => String::new(),
    }
}

/// Any error produced by this crate
#[derive(Debug, Error)]
pub enum RiffError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Builder(#[from] BuilderError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    InvalidChunkId(#[from] InvalidChunkId),

    #[error(transparent)]
    ChunkMissing(#[from] ChunkMissing),
}
