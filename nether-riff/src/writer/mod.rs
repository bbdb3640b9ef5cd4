//! Two-pass RIFF writer
//!
//! Pass 1 walks the description in ordinal order, writing every header with a
//! zero size placeholder and running each leaf's data writer. Pass 2 walks it
//! backwards, so every container's children are sized before the container,
//! and overwrites the placeholders with the real sizes.

use std::io::{Seek, SeekFrom, Write};

use hashbrown::HashMap;

use crate::builder::{ChunkDescription, DataWriter, FileDescription};
use crate::channel::{RelativeChannel, RestrictedChannel, SeekableChannel};
use crate::error::{OutOfBoundsError, WriteError, WriteErrorKind};
use crate::order::ByteOrder;
use crate::size::ChunkSize;
use crate::{CHUNK_ID_SIZE, FORM_SIZE, HEADER_SIZE};


/// Serializes a [`FileDescription`] onto a seekable channel
///
/// The file is written starting at position 0 of the channel. On success the
/// channel is left positioned just past the last byte written.
pub struct RiffWriter<'d, 'c, C> {
    origin: String,
    description: &'d FileDescription,
    channel: &'c mut C,
}

impl<'d, 'c, C: SeekableChannel> RiffWriter<'d, 'c, C> {
    /// Create a writer
    ///
    /// # Arguments
    /// * `origin` - Destination identifier used in error messages
    /// * `description` - The chunk tree to write
    /// * `channel` - The destination
    pub fn new(origin: impl Into<String>, description: &'d FileDescription, channel: &'c mut C) -> Self {
        Self {
            origin: origin.into(),
            description,
            channel,
        }
    }

    pub fn write(self) -> Result<(), WriteError> {
        let Self {
            origin,
            description,
            channel,
        } = self;

        let mut pass = WritePass {
            channel: &mut *channel,
            order: description.byte_order(),
            size_offsets: HashMap::with_capacity(description.len()),
            leaf_sizes: HashMap::new(),
        };

        pass.run(description).map_err(|kind| {
            let position = channel.stream_position().unwrap_or_default();
            tracing::debug!("{}: write failed at 0x{:x}: {}", origin, position, kind);
            WriteError {
                origin,
                position,
                kind,
            }
        })
    }
}

struct WritePass<'c, C> {
    channel: &'c mut C,
    order: ByteOrder,
    /// Absolute offset of each chunk's size field, by ordinal
    size_offsets: HashMap<u64, u64>,
    /// Data size of each leaf, by ordinal
    leaf_sizes: HashMap<u64, u64>,
}

impl<C: SeekableChannel> WritePass<'_, C> {
    fn run(&mut self, description: &FileDescription) -> Result<(), WriteErrorKind> {
        self.channel.seek(SeekFrom::Start(0))?;

        tracing::trace!("pass 1: emitting {} chunks", description.len());
        for chunk in description.linearized_chunks() {
            self.emit(chunk)?;
        }
        let end = self.channel.stream_position()?;

        tracing::trace!("pass 2: backpatching sizes");
        let chunks: Vec<_> = description.linearized_chunks().collect();
        let mut sizes: HashMap<u64, u64> = HashMap::with_capacity(chunks.len());
        for chunk in chunks.iter().rev() {
            let size = self.compute_size(chunk, &sizes)?;
            sizes.insert(chunk.ordinal(), size);
            self.patch(chunk, size)?;
        }

        self.channel.seek(SeekFrom::Start(end))?;
        tracing::trace!("wrote {} octets", end);
        Ok(())
    }

    fn emit(&mut self, chunk: ChunkDescription<'_>) -> Result<(), WriteErrorKind> {
        let start = self.channel.stream_position()?;

        let mut header = RelativeChannel::new(&mut *self.channel, start);
        write_checked(&mut header, start, chunk.id().as_bytes())?;
        write_checked(&mut header, start + CHUNK_ID_SIZE, &[0u8; 4])?;
        if let Some(form) = chunk.form() {
            write_checked(&mut header, start + HEADER_SIZE, form.as_bytes())?;
        }
        let mut end = header.lower() + header.position();
        self.size_offsets.insert(chunk.ordinal(), start + CHUNK_ID_SIZE);

        if chunk.sub_chunks().next().is_none() {
            let payload = match chunk.data_writer() {
                Some(writer) => self.run_data_writer(chunk, writer, end)?,
                None => 0,
            };
            let form = if chunk.form().is_some() { FORM_SIZE } else { 0 };
            let overflow = || WriteErrorKind::SizeOverflow { id: chunk.id() };
            let size = payload.checked_add(form).ok_or_else(overflow)?;
            self.leaf_sizes.insert(chunk.ordinal(), size);
            end = end.checked_add(payload).ok_or_else(overflow)?;
        }

        self.channel.seek(SeekFrom::Start(end))?;
        if end % 2 == 1 {
            write_checked(self.channel, end, &[0])?;
        }

        tracing::trace!(
            "ordinal {}: {} at 0x{:x}, ends at 0x{:x}",
            chunk.ordinal(),
            chunk.id(),
            start,
            end
        );
        Ok(())
    }

    /// Run a leaf's data writer on a view starting at `payload_start`,
    /// returning the payload size
    fn run_data_writer(
        &mut self,
        chunk: ChunkDescription<'_>,
        writer: &DataWriter,
        payload_start: u64,
    ) -> Result<u64, WriteErrorKind> {
        let id = chunk.id();
        let reported = |err: std::io::Error| match OutOfBoundsError::find(&err) {
            Some(source) => WriteErrorKind::OutOfBounds {
                id,
                offset: payload_start,
                source: source.clone(),
            },
            None => WriteErrorKind::Io(err),
        };

        match chunk.declared_size() {
            Some(declared) => {
                let upper = payload_start
                    .checked_add(declared)
                    .ok_or(WriteErrorKind::SizeOverflow { id })?;
                let mut view = RestrictedChannel::new(&mut *self.channel, payload_start, upper)?;
                zero_fill(&mut view, payload_start, declared)?;
                view.seek(SeekFrom::Start(0))?;
                writer(&mut view).map_err(reported)?;
                view.seek(SeekFrom::Start(declared))?;
                Ok(declared)
            }
            None => {
                let mut view = RelativeChannel::new(&mut *self.channel, payload_start);
                writer(&mut view).map_err(reported)?;
                Ok(view.position())
            }
        }
    }

    fn compute_size(
        &self,
        chunk: &ChunkDescription<'_>,
        sizes: &HashMap<u64, u64>,
    ) -> Result<u64, WriteErrorKind> {
        let form = if chunk.form().is_some() { FORM_SIZE } else { 0 };
        if chunk.sub_chunks().next().is_none() {
            return Ok(self.leaf_sizes.get(&chunk.ordinal()).copied().unwrap_or(form));
        }

        let overflow = || WriteErrorKind::SizeOverflow { id: chunk.id() };
        let mut total = form;
        for child in chunk.sub_chunks() {
            let child_total = ChunkSize::pad_if_necessary(sizes[&child.ordinal()])
                .checked_total()
                .ok_or_else(overflow)?;
            total = total.checked_add(child_total).ok_or_else(overflow)?;
        }
        Ok(total)
    }

    fn patch(&mut self, chunk: &ChunkDescription<'_>, size: u64) -> Result<(), WriteErrorKind> {
        let field = u32::try_from(size).map_err(|_| WriteErrorKind::SizeOverflow { id: chunk.id() })?;
        let offset = self.size_offsets[&chunk.ordinal()];

        tracing::trace!("ordinal {}: {} size {} at 0x{:x}", chunk.ordinal(), chunk.id(), size, offset);

        self.channel.seek(SeekFrom::Start(offset))?;
        write_checked(self.channel, offset, &self.order.u32_bytes(field))
    }
}

/// Overwrite `len` octets from the current position with zeros
fn zero_fill<W: Write + ?Sized>(out: &mut W, offset: u64, len: u64) -> Result<(), WriteErrorKind> {
    const ZEROS: [u8; 512] = [0; 512];
    let mut done = 0;
    while done < len {
        let step = (len - done).min(ZEROS.len() as u64) as usize;
        write_checked(out, offset + done, &ZEROS[..step])?;
        done += step as u64;
    }
    Ok(())
}

/// Write all of `bytes` in a single call, treating a partial write as an error
fn write_checked<W: Write + ?Sized>(out: &mut W, offset: u64, bytes: &[u8]) -> Result<(), WriteErrorKind> {
    let wrote = out.write(bytes)?;
    if wrote != bytes.len() {
        return Err(WriteErrorKind::ShortWrite {
            offset,
            expected: bytes.len(),
            wrote,
        });
    }
    Ok(())
}
