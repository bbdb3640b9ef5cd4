//! Chunk tree builder
//!
//! A [`RiffFileBuilder`] collects mutable chunk drafts through scoped
//! [`ChunkBuilder`] guards. [`RiffFileBuilder::build`] then freezes the drafts
//! into an immutable [`FileDescription`] whose chunks carry pre-order
//! ordinals, ready for [`crate::RiffWriter`].
//!
//! ```ignore
//! let mut builder = RiffFileBuilder::new(ByteOrder::LittleEndian);
//! {
//!     let mut root = builder.set_root_chunk(FOURCC_RIFF, "WAVE".parse()?);
//!     root.add_sub_chunk("fmt ".parse()?)?
//!         .set_data_writer(|ch| ch.write_all(&fmt_bytes))?;
//!     root.add_sub_chunk("data".parse()?)?
//!         .set_data_writer(|ch| ch.write_all(&samples))?;
//! }
//! let description = builder.build()?;
//! ```

use std::fmt;
use std::io;

use crate::channel::SeekableChannel;
use crate::error::BuilderError;
use crate::id::ChunkId;
use crate::order::ByteOrder;


/// A payload producer, given a channel view positioned at the start of the
/// chunk's payload
pub type DataWriter = Box<dyn Fn(&mut dyn SeekableChannel) -> io::Result<()>>;

// =============================================================================
// Drafts
// =============================================================================

struct ChunkDraft {
    id: ChunkId,
    form: Option<ChunkId>,
    declared_size: Option<u64>,
    children: Vec<usize>,
    data_writer: Option<DataWriter>,
    closed: bool,
}

impl ChunkDraft {
    fn new(id: ChunkId, form: Option<ChunkId>) -> Self {
        Self {
            id,
            form,
            declared_size: None,
            children: Vec::new(),
            data_writer: None,
            closed: false,
        }
    }
}

impl fmt::Debug for ChunkDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkDraft")
            .field("id", &self.id)
            .field("form", &self.form)
            .field("declared_size", &self.declared_size)
            .field("children", &self.children)
            .field("data_writer", &self.data_writer.is_some())
            .field("closed", &self.closed)
            .finish()
    }
}

/// Mutable description of a RIFF file under construction
#[derive(Debug)]
pub struct RiffFileBuilder {
    order: ByteOrder,
    drafts: Vec<ChunkDraft>,
    root: Option<usize>,
}

impl RiffFileBuilder {
    pub fn new(order: ByteOrder) -> Self {
        Self {
            order,
            drafts: Vec::new(),
            root: None,
        }
    }

    pub fn set_order(&mut self, order: ByteOrder) -> &mut Self {
        self.order = order;
        self
    }

    /// Start the root chunk, replacing any previous root
    pub fn set_root_chunk(&mut self, id: ChunkId, form: ChunkId) -> ChunkBuilder<'_> {
        let index = self.drafts.len();
        self.drafts.push(ChunkDraft::new(id, Some(form)));
        self.root = Some(index);
        ChunkBuilder {
            builder: self,
            index,
        }
    }

    /// Freeze the drafts reachable from the root into a [`FileDescription`]
    ///
    /// Ordinals are assigned depth-first, parents before children, starting
    /// at 0 for the root.
    pub fn build(mut self) -> Result<FileDescription, BuilderError> {
        let root = self.root.ok_or(BuilderError::NoRootChunk)?;
        let mut nodes = Vec::new();
        self.freeze(root, None, &mut nodes)?;

        tracing::debug!("built file description with {} chunks", nodes.len());

        Ok(FileDescription {
            byte_order: self.order,
            nodes,
        })
    }

    fn freeze(
        &mut self,
        draft: usize,
        parent: Option<usize>,
        nodes: &mut Vec<DescriptionNode>,
    ) -> Result<usize, BuilderError> {
        let entry = &mut self.drafts[draft];
        let id = entry.id;
        if !entry.closed {
            return Err(BuilderError::UnclosedChunk { id });
        }

        let index = nodes.len();
        let children = std::mem::take(&mut entry.children);
        nodes.push(DescriptionNode {
            id,
            form: entry.form,
            declared_size: entry.declared_size,
            parent,
            children: Vec::with_capacity(children.len()),
            data_writer: entry.data_writer.take(),
        });
        tracing::trace!("ordinal {}: {}", index, id);

        for child in children {
            let child_index = self.freeze(child, Some(index), nodes)?;
            nodes[index].children.push(child_index);
        }
        Ok(index)
    }
}

/// Scoped access to one chunk draft
///
/// The draft is closed when the guard is dropped or [`ChunkBuilder::close`]d.
/// A guard returned by [`ChunkBuilder::add_sub_chunk`] borrows its parent, so
/// children are always closed before their parents.
pub struct ChunkBuilder<'b> {
    builder: &'b mut RiffFileBuilder,
    index: usize,
}

impl ChunkBuilder<'_> {
    fn draft(&mut self) -> &mut ChunkDraft {
        &mut self.builder.drafts[self.index]
    }

    pub fn set_id(&mut self, id: ChunkId) -> &mut Self {
        self.draft().id = id;
        self
    }

    /// Declare the payload size
    ///
    /// A data writer is then confined to this many octets.
    pub fn set_size(&mut self, size: u64) -> &mut Self {
        self.draft().declared_size = Some(size);
        self
    }

    pub fn clear_size(&mut self) -> &mut Self {
        self.draft().declared_size = None;
        self
    }

    pub fn set_form(&mut self, form: ChunkId) -> &mut Self {
        self.draft().form = Some(form);
        self
    }

    pub fn clear_form(&mut self) -> &mut Self {
        self.draft().form = None;
        self
    }

    /// Give the chunk a payload; fails if it already has subchunks
    pub fn set_data_writer<F>(&mut self, writer: F) -> Result<&mut Self, BuilderError>
    where
        F: Fn(&mut dyn SeekableChannel) -> io::Result<()> + 'static,
    {
        let draft = self.draft();
        if !draft.children.is_empty() {
            return Err(BuilderError::MixedContent { id: draft.id });
        }
        draft.data_writer = Some(Box::new(writer));
        Ok(self)
    }

    /// Start a subchunk; fails if the chunk already has a data writer
    pub fn add_sub_chunk(&mut self, id: ChunkId) -> Result<ChunkBuilder<'_>, BuilderError> {
        if self.draft().data_writer.is_some() {
            return Err(BuilderError::MixedContent {
                id: self.draft().id,
            });
        }

        let child = self.builder.drafts.len();
        self.builder.drafts.push(ChunkDraft::new(id, None));
        self.draft().children.push(child);

        Ok(ChunkBuilder {
            builder: &mut *self.builder,
            index: child,
        })
    }

    /// Close the draft
    pub fn close(self) {}
}

impl Drop for ChunkBuilder<'_> {
    fn drop(&mut self) {
        self.draft().closed = true;
    }
}

impl fmt::Debug for ChunkBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkBuilder")
            .field("draft", &self.builder.drafts[self.index])
            .finish()
    }
}

// =============================================================================
// Frozen description
// =============================================================================

struct DescriptionNode {
    id: ChunkId,
    form: Option<ChunkId>,
    declared_size: Option<u64>,
    parent: Option<usize>,
    children: Vec<usize>,
    data_writer: Option<DataWriter>,
}

/// An immutable chunk tree ready to be written
///
/// Chunks are stored in pre-order; a chunk's index is its ordinal.
pub struct FileDescription {
    byte_order: ByteOrder,
    nodes: Vec<DescriptionNode>,
}

impl FileDescription {
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn root_chunk(&self) -> ChunkDescription<'_> {
        ChunkDescription {
            file: self,
            index: 0,
        }
    }

    /// Every chunk, depth-first, parents before children (ordinal order)
    pub fn linearized_chunks(&self) -> impl ExactSizeIterator<Item = ChunkDescription<'_>> {
        (0..self.nodes.len()).map(move |index| ChunkDescription { file: self, index })
    }

    /// Number of chunks in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl fmt::Debug for FileDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileDescription")
            .field("byte_order", &self.byte_order)
            .field("chunks", &self.linearized_chunks().collect::<Vec<_>>())
            .finish()
    }
}

/// A handle to one chunk of a [`FileDescription`]
#[derive(Clone, Copy)]
pub struct ChunkDescription<'f> {
    file: &'f FileDescription,
    index: usize,
}

impl<'f> ChunkDescription<'f> {
    fn node(&self) -> &'f DescriptionNode {
        &self.file.nodes[self.index]
    }

    /// Pre-order position of this chunk; the root is 0
    pub fn ordinal(&self) -> u64 {
        self.index as u64
    }

    pub fn id(&self) -> ChunkId {
        self.node().id
    }

    pub fn form(&self) -> Option<ChunkId> {
        self.node().form
    }

    pub fn declared_size(&self) -> Option<u64> {
        self.node().declared_size
    }

    pub fn data_writer(&self) -> Option<&'f DataWriter> {
        self.node().data_writer.as_ref()
    }

    pub fn sub_chunks(self) -> impl ExactSizeIterator<Item = ChunkDescription<'f>> + 'f {
        let file = self.file;
        self.node()
            .children
            .iter()
            .map(move |&index| ChunkDescription { file, index })
    }

    pub fn parent(&self) -> Option<ChunkDescription<'f>> {
        let file = self.file;
        self.node()
            .parent
            .map(|index| ChunkDescription { file, index })
    }

    /// The description this chunk belongs to
    pub fn file(&self) -> &'f FileDescription {
        self.file
    }
}

impl PartialEq for ChunkDescription<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.file, other.file) && self.index == other.index
    }
}

impl Eq for ChunkDescription<'_> {}

impl fmt::Debug for ChunkDescription<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkDescription")
            .field("ordinal", &self.ordinal())
            .field("id", &self.id())
            .field("form", &self.form())
            .field("declared_size", &self.declared_size())
            .field("sub_chunks", &self.node().children.len())
            .field("data_writer", &self.data_writer().is_some())
            .finish()
    }
}
