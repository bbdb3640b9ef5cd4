//! Offset-relative channel view

use std::io::{self, Read, Seek, SeekFrom, Write};

use super::{SeekableChannel, resolve_seek, translate};

/// A view of a backing channel whose position zero is `lower` in the backing channel
///
/// The view is unbounded above. Every read or write first seeks the backing
/// channel to `lower + position`, so several views can take turns over the same
/// backing channel. Pass `&mut channel` to keep ownership of the backing
/// channel; a view that owns its backing channel drops (closes) it when dropped.
#[derive(Debug)]
pub struct RelativeChannel<C> {
    inner: C,
    lower: u64,
    position: u64,
}

impl<C: SeekableChannel> RelativeChannel<C> {
    /// Create a view whose position zero is `lower` in `inner`
    pub fn new(inner: C, lower: u64) -> Self {
        Self {
            inner,
            lower,
            position: 0,
        }
    }

    /// Offset of this view within the backing channel
    pub fn lower(&self) -> u64 {
        self.lower
    }

    /// Current logical position within the view
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Release the backing channel
    pub fn into_inner(self) -> C {
        self.inner
    }

    fn sync(&mut self) -> io::Result<()> {
        let target = translate(self.lower, self.position)?;
        self.inner.seek(SeekFrom::Start(target))?;
        Ok(())
    }
}

impl<C: SeekableChannel> Read for RelativeChannel<C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.sync()?;
        let n = self.inner.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}

impl<C: SeekableChannel> Write for RelativeChannel<C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sync()?;
        let n = self.inner.write(buf)?;
        self.position += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<C: SeekableChannel> Seek for RelativeChannel<C> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let end = self.inner.size()?.saturating_sub(self.lower);
        self.position = resolve_seek(self.position, end, pos)?;
        self.sync()?;
        Ok(self.position)
    }
}

impl<C: SeekableChannel> SeekableChannel for RelativeChannel<C> {
    /// The size of the backing channel
    fn size(&mut self) -> io::Result<u64> {
        self.inner.size()
    }

    fn truncate(&mut self, size: u64) -> io::Result<()> {
        self.inner.truncate(size)
    }
}
