//! RIFF chunk tree parser
//!
//! Containers are descended with an explicit stack of open regions, bounded
//! by [`RiffParser::with_max_depth`].

use std::io::Cursor;

use crate::chunk::{ParsedFile, ParsedNode};
use crate::error::{ParseError, ParseErrorKind};
use crate::id::ChunkId;
use crate::order::ByteOrder;
use crate::size::ChunkSize;
use crate::{DEFAULT_MAX_DEPTH, FORM_SIZE, HEADER_SIZE};

mod helpers;

use helpers::{read_id, read_u32};

/// Parse a RIFF file held in memory
///
/// Shorthand for `RiffParser::new(origin, data).parse()`.
///
/// # Arguments
/// * `origin` - Source identifier used in error messages (usually a path)
/// * `data` - The complete file contents
pub fn parse_riff(origin: impl Into<String>, data: &[u8]) -> Result<ParsedFile, ParseError> {
    RiffParser::new(origin, data).parse()
}

/// A RIFF parser over an in-memory file
///
/// Only chunk headers and form types are read. Payload bytes are skipped, so
/// a [`ParsedFile`] records offsets and sizes, never data.
#[derive(Debug, Clone)]
pub struct RiffParser<'a> {
    origin: String,
    data: &'a [u8],
    max_depth: usize,
}

impl<'a> RiffParser<'a> {
    pub fn new(origin: impl Into<String>, data: &'a [u8]) -> Self {
        Self {
            origin: origin.into(),
            data,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Limit how deeply containers may nest (default [`DEFAULT_MAX_DEPTH`])
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn parse(&self) -> Result<ParsedFile, ParseError> {
        if self.data.len() < 4 {
            return Err(self.error(
                0,
                ParseErrorKind::Truncated {
                    needed: 4,
                    remaining: self.data.len() as u64,
                },
            ));
        }

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&self.data[..4]);
        let magic = ChunkId::new(magic);
        let order = ByteOrder::for_root(magic)
            .ok_or_else(|| self.error(0, ParseErrorKind::InvalidMagic { received: magic }))?;

        tracing::debug!("{}: {} file, {} octets", self.origin, order, self.data.len());

        let mut state = ParseState {
            parser: self,
            cursor: Cursor::new(self.data),
            order,
            nodes: Vec::new(),
        };
        let roots = state.parse_regions(self.data.len() as u64)?;

        Ok(ParsedFile::new(order, state.nodes, roots))
    }

    fn error(&self, offset: u64, kind: ParseErrorKind) -> ParseError {
        ParseError {
            origin: self.origin.clone(),
            offset,
            kind,
        }
    }
}

struct ParseState<'p, 'a> {
    parser: &'p RiffParser<'a>,
    cursor: Cursor<&'a [u8]>,
    order: ByteOrder,
    nodes: Vec<ParsedNode>,
}

/// A region of consecutive chunks still being read
///
/// Open regions form an explicit stack, innermost last.
struct OpenRegion {
    /// Container owning the region; `None` for the top level
    parent: Option<usize>,
    start: u64,
    depth: usize,
    left: u64,
    chunks: Vec<usize>,
}

impl OpenRegion {
    fn new(parent: Option<usize>, start: u64, depth: usize, limit: u64) -> Self {
        tracing::trace!("region at 0x{:x}: {} octets, depth {}", start, limit, depth);
        Self {
            parent,
            start,
            depth,
            left: limit,
            chunks: Vec::new(),
        }
    }
}

impl ParseState<'_, '_> {
    /// Parse consecutive chunks filling exactly `limit` octets from the cursor
    ///
    /// Returns the arena indices of the top-level chunks, in file order.
    fn parse_regions(&mut self, limit: u64) -> Result<Vec<usize>, ParseError> {
        let mut open = vec![OpenRegion::new(None, self.cursor.position(), 0, limit)];
        let mut top_level = Vec::new();

        while let Some(mut region) = open.pop() {
            if region.left == 0 {
                tracing::trace!("region at 0x{:x} done: {} chunks", region.start, region.chunks.len());
                match region.parent {
                    Some(index) => self.close_container(index, region.chunks),
                    None => top_level = region.chunks,
                }
                continue;
            }

            let child = self.parse_chunk(&mut region)?;
            open.push(region);
            open.extend(child);
        }

        Ok(top_level)
    }

    /// Read the next chunk header of `region`
    ///
    /// Returns the region of a container's subchunks, to be parsed before the
    /// rest of `region`.
    fn parse_chunk(&mut self, region: &mut OpenRegion) -> Result<Option<OpenRegion>, ParseError> {
        let offset = self.cursor.position();
        tracing::trace!("0x{:x}: {} octets left in region", offset, region.left);

        if region.left < HEADER_SIZE {
            return Err(self.parser.error(
                offset,
                ParseErrorKind::Truncated {
                    needed: HEADER_SIZE,
                    remaining: region.left,
                },
            ));
        }

        let name = read_id(&mut self.cursor).map_err(|kind| self.parser.error(offset, kind))?;
        let raw_size = read_u32(&mut self.cursor, self.order)
            .map_err(|kind| self.parser.error(offset, kind))?;
        let declared = u64::from(raw_size);
        let size = ChunkSize::pad_if_necessary(declared);

        let available = region.left - HEADER_SIZE;
        if size.padded() > available {
            return Err(self.parser.error(
                offset,
                ParseErrorKind::DeclaredSizeExceedsAvailable {
                    id: name,
                    declared,
                    padded: size.padded(),
                    available,
                },
            ));
        }

        let index = self.nodes.len();
        self.nodes.push(ParsedNode {
            name,
            offset,
            data_size: size,
            form_type: None,
            parent: region.parent,
            sub_chunks: Vec::new(),
            subtree_end: index + 1,
            depth: region.depth,
        });
        region.left -= HEADER_SIZE + size.padded();
        region.chunks.push(index);

        if name.is_container() {
            return self.open_container(index, declared, region.depth).map(Some);
        }

        tracing::debug!("depth {}: {} at 0x{:x}, size {}", region.depth, name, offset, size);
        self.cursor.set_position(offset + HEADER_SIZE + size.padded());
        Ok(None)
    }

    fn open_container(&mut self, index: usize, declared: u64, depth: usize) -> Result<OpenRegion, ParseError> {
        let name = self.nodes[index].name;
        let offset = self.nodes[index].offset;

        if declared <= FORM_SIZE {
            return Err(self.parser.error(
                offset,
                ParseErrorKind::ChunkTooSmall {
                    id: name,
                    size: declared,
                },
            ));
        }

        let form = read_id(&mut self.cursor).map_err(|kind| self.parser.error(offset, kind))?;
        self.nodes[index].form_type = Some(form);

        let contents = declared - FORM_SIZE;
        if contents <= HEADER_SIZE {
            return Err(self.parser.error(
                offset,
                ParseErrorKind::TooSmallForSubchunks {
                    id: name,
                    size: contents,
                },
            ));
        }

        if depth >= self.parser.max_depth {
            return Err(self.parser.error(
                offset,
                ParseErrorKind::NestingTooDeep {
                    id: name,
                    limit: self.parser.max_depth,
                },
            ));
        }

        tracing::debug!(
            "depth {}: {}({}) at 0x{:x}, size {}",
            depth,
            name,
            form,
            offset,
            declared
        );

        Ok(OpenRegion::new(Some(index), self.cursor.position(), depth + 1, contents))
    }

    /// Attach a fully parsed region to its container and skip the
    /// container's pad byte
    fn close_container(&mut self, index: usize, sub_chunks: Vec<usize>) {
        let sum: u64 = sub_chunks
            .iter()
            .map(|&child| self.nodes[child].data_size.padded() + HEADER_SIZE)
            .sum();

        let subtree_end = self.nodes.len();
        let node = &mut self.nodes[index];
        assert_eq!(
            sum + FORM_SIZE,
            node.data_size.unpadded(),
            "subchunk sizes of {} must add up to its declared size",
            node.name
        );

        node.sub_chunks = sub_chunks;
        node.subtree_end = subtree_end;
        self.cursor
            .set_position(node.offset + HEADER_SIZE + node.data_size.padded());
    }
}
