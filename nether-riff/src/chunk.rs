//! Parsed chunk tree and query helpers
//!
//! A [`ParsedFile`] owns every chunk in a flat arena stored in depth-first
//! pre-order. [`ParsedChunk`] is a cheap `Copy` handle into that arena, so
//! parent and child navigation never needs a second owner.

use std::fmt;

use crate::error::ChunkMissing;
use crate::id::ChunkId;
use crate::order::ByteOrder;
use crate::size::ChunkSize;
use crate::{FORM_SIZE, HEADER_SIZE};

/// One chunk as recorded by the parser
#[derive(Debug, Clone)]
pub(crate) struct ParsedNode {
    pub name: ChunkId,
    pub offset: u64,
    pub data_size: ChunkSize,
    pub form_type: Option<ChunkId>,
    pub parent: Option<usize>,
    pub sub_chunks: Vec<usize>,
    /// One past the last arena index of this chunk's subtree
    pub subtree_end: usize,
    pub depth: usize,
}

/// The result of parsing a RIFF file
#[derive(Debug, Clone)]
pub struct ParsedFile {
    byte_order: ByteOrder,
    nodes: Vec<ParsedNode>,
    roots: Vec<usize>,
}

impl ParsedFile {
    pub(crate) fn new(byte_order: ByteOrder, nodes: Vec<ParsedNode>, roots: Vec<usize>) -> Self {
        Self {
            byte_order,
            nodes,
            roots,
        }
    }

    /// Byte order detected from the leading identifier
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Top-level chunks in file order
    ///
    /// Conformant files have exactly one.
    pub fn chunks(&self) -> impl ExactSizeIterator<Item = ParsedChunk<'_>> {
        self.roots.iter().map(move |&index| ParsedChunk { file: self, index })
    }

    /// The first top-level chunk, if any
    pub fn root_chunk(&self) -> Option<ParsedChunk<'_>> {
        self.roots.first().map(|&index| ParsedChunk { file: self, index })
    }

    /// Every chunk in the file, depth-first, parents before children
    pub fn linearized_chunks(&self) -> impl ExactSizeIterator<Item = ParsedChunk<'_>> {
        (0..self.nodes.len()).map(move |index| ParsedChunk { file: self, index })
    }

    /// Total number of chunks at all depths
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A handle to one chunk of a [`ParsedFile`]
#[derive(Clone, Copy)]
pub struct ParsedChunk<'f> {
    file: &'f ParsedFile,
    index: usize,
}

impl<'f> ParsedChunk<'f> {
    fn node(&self) -> &'f ParsedNode {
        &self.file.nodes[self.index]
    }

    fn handle(&self, index: usize) -> ParsedChunk<'f> {
        ParsedChunk {
            file: self.file,
            index,
        }
    }

    /// The chunk identifier
    pub fn name(&self) -> ChunkId {
        self.node().name
    }

    /// Absolute file offset of the chunk's ID field
    pub fn offset(&self) -> u64 {
        self.node().offset
    }

    /// Declared size, including the form field when present
    pub fn data_size_including_form(&self) -> ChunkSize {
        self.node().data_size
    }

    /// Declared size minus the form field, padded to an even length
    pub fn data_size_excluding_form(&self) -> ChunkSize {
        let size = self.node().data_size;
        if self.node().form_type.is_some() {
            size.without_form()
        } else {
            size
        }
    }

    /// Header plus padded data size
    pub fn total_size(&self) -> u64 {
        self.node().data_size.padded() + HEADER_SIZE
    }

    /// Absolute offset of the first byte after the size field
    pub fn data_offset(&self) -> u64 {
        self.node().offset + HEADER_SIZE
    }

    /// Absolute offset of the first payload byte (after the form, if any)
    pub fn payload_offset(&self) -> u64 {
        match self.node().form_type {
            Some(_) => self.data_offset() + FORM_SIZE,
            None => self.data_offset(),
        }
    }

    /// Form type of a container chunk
    pub fn form_type(&self) -> Option<ChunkId> {
        self.node().form_type
    }

    /// Nesting depth; top-level chunks are at depth 0
    pub fn depth(&self) -> usize {
        self.node().depth
    }

    /// Direct subchunks in file order
    pub fn sub_chunks(self) -> impl ExactSizeIterator<Item = ParsedChunk<'f>> + 'f {
        let file = self.file;
        self.node()
            .sub_chunks
            .iter()
            .map(move |&index| ParsedChunk { file, index })
    }

    /// The enclosing container, if any
    pub fn parent(&self) -> Option<ParsedChunk<'f>> {
        self.node().parent.map(|index| self.handle(index))
    }

    /// This chunk and all of its descendants, depth-first, parents first
    pub fn linearized_descendants(self) -> impl ExactSizeIterator<Item = ParsedChunk<'f>> + 'f {
        let file = self.file;
        (self.index..self.node().subtree_end).map(move |index| ParsedChunk { file, index })
    }

    pub fn matches(&self, id: ChunkId) -> bool {
        self.name() == id
    }

    pub fn matches_with_form(&self, id: ChunkId, form: ChunkId) -> bool {
        self.name() == id && self.form_type() == Some(form)
    }

    pub fn find_optional_sub_chunk(&self, id: ChunkId) -> Option<ParsedChunk<'f>> {
        self.sub_chunks().find(|chunk| chunk.matches(id))
    }

    pub fn find_optional_sub_chunks(self, id: ChunkId) -> impl Iterator<Item = ParsedChunk<'f>> + 'f {
        self.sub_chunks().filter(move |chunk| chunk.matches(id))
    }

    pub fn find_optional_sub_chunk_with_form(
        &self,
        id: ChunkId,
        form: ChunkId,
    ) -> Option<ParsedChunk<'f>> {
        self.sub_chunks().find(|chunk| chunk.matches_with_form(id, form))
    }

    pub fn find_optional_sub_chunks_with_form(
        self,
        id: ChunkId,
        form: ChunkId,
    ) -> impl Iterator<Item = ParsedChunk<'f>> + 'f {
        self.sub_chunks()
            .filter(move |chunk| chunk.matches_with_form(id, form))
    }

    /// Like [`Self::find_optional_sub_chunk`], failing if nothing matches
    pub fn find_required_sub_chunk(&self, id: ChunkId) -> Result<ParsedChunk<'f>, ChunkMissing> {
        self.find_optional_sub_chunk(id)
            .ok_or_else(|| self.missing(id, None))
    }

    /// All matching subchunks, failing if there are none
    pub fn find_required_sub_chunks(&self, id: ChunkId) -> Result<Vec<ParsedChunk<'f>>, ChunkMissing> {
        let found: Vec<_> = self.find_optional_sub_chunks(id).collect();
        if found.is_empty() {
            return Err(self.missing(id, None));
        }
        Ok(found)
    }

    pub fn find_required_sub_chunk_with_form(
        &self,
        id: ChunkId,
        form: ChunkId,
    ) -> Result<ParsedChunk<'f>, ChunkMissing> {
        self.find_optional_sub_chunk_with_form(id, form)
            .ok_or_else(|| self.missing(id, Some(form)))
    }

    pub fn find_required_sub_chunks_with_form(
        &self,
        id: ChunkId,
        form: ChunkId,
    ) -> Result<Vec<ParsedChunk<'f>>, ChunkMissing> {
        let found: Vec<_> = self.find_optional_sub_chunks_with_form(id, form).collect();
        if found.is_empty() {
            return Err(self.missing(id, Some(form)));
        }
        Ok(found)
    }

    fn missing(&self, expected: ChunkId, form: Option<ChunkId>) -> ChunkMissing {
        ChunkMissing {
            expected,
            form,
            parent: self.name(),
        }
    }

    /// The chunk's payload (after the form, if any) within the buffer it was
    /// parsed from
    ///
    /// Returns `None` if `data` is too short to hold it.
    pub fn payload<'d>(&self, data: &'d [u8]) -> Option<&'d [u8]> {
        let start = usize::try_from(self.payload_offset()).ok()?;
        let len = usize::try_from(self.data_size_excluding_form().unpadded()).ok()?;
        data.get(start..start.checked_add(len)?)
    }
}

impl PartialEq for ParsedChunk<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.file, other.file) && self.index == other.index
    }
}

impl Eq for ParsedChunk<'_> {}

impl fmt::Debug for ParsedChunk<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedChunk")
            .field("name", &self.name())
            .field("offset", &self.offset())
            .field("data_size", &self.data_size_including_form())
            .field("form_type", &self.form_type())
            .field("sub_chunks", &self.node().sub_chunks.len())
            .finish()
    }
}

impl fmt::Display for ParsedChunk<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[RiffChunk {}", self.name())?;
        if let Some(form) = self.form_type() {
            write!(f, "({form})")?;
        }
        write!(
            f,
            " offset 0x{:x} size {}",
            self.offset(),
            self.data_size_including_form()
        )?;
        let count = self.node().sub_chunks.len();
        if count > 0 {
            write!(f, " {count} subchunks")?;
        }
        write!(f, "]")
    }
}
