//! Bounds-restricted channel view

use std::io::{self, Read, Seek, SeekFrom, Write};

use super::{SeekableChannel, resolve_seek, translate};
use crate::error::{Access, OutOfBoundsError};

/// A view of the range `[lower, upper)` of a backing channel
///
/// Position zero is `lower`. A read or write whose requested length would
/// cross `upper` fails with an [`OutOfBoundsError`] (inside the returned
/// [`io::Error`]) before the backing channel is touched. Seeking anywhere is
/// allowed; bounds are checked when data moves.
#[derive(Debug)]
pub struct RestrictedChannel<C> {
    inner: C,
    lower: u64,
    upper: u64,
    position: u64,
}

impl<C: SeekableChannel> RestrictedChannel<C> {
    /// Create a view of `[lower, upper)` in `inner`
    pub fn new(inner: C, lower: u64, upper: u64) -> io::Result<Self> {
        if lower > upper {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid bounds: lower {lower} must not exceed upper {upper}"),
            ));
        }
        Ok(Self {
            inner,
            lower,
            upper,
            position: 0,
        })
    }

    /// Number of addressable octets
    pub fn len(&self) -> u64 {
        self.upper - self.lower
    }

    /// Returns `true` if no octet is addressable
    pub fn is_empty(&self) -> bool {
        self.upper == self.lower
    }

    /// Current logical position within the view
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Release the backing channel
    pub fn into_inner(self) -> C {
        self.inner
    }

    fn check(&self, access: Access, count: usize) -> io::Result<()> {
        let limit = self.len();
        let end = self.position.saturating_add(count as u64);
        if end > limit {
            return Err(OutOfBoundsError {
                access,
                start: self.position,
                end,
                limit,
            }
            .into());
        }
        Ok(())
    }

    fn sync(&mut self) -> io::Result<()> {
        let target = translate(self.lower, self.position)?;
        self.inner.seek(SeekFrom::Start(target))?;
        Ok(())
    }
}

impl<C: SeekableChannel> Read for RestrictedChannel<C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.check(Access::Read, buf.len())?;
        self.sync()?;
        let n = self.inner.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}

impl<C: SeekableChannel> Write for RestrictedChannel<C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.check(Access::Write, buf.len())?;
        self.sync()?;
        let n = self.inner.write(buf)?;
        self.position += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<C: SeekableChannel> Seek for RestrictedChannel<C> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.position = resolve_seek(self.position, self.len(), pos)?;
        self.sync()?;
        Ok(self.position)
    }
}

impl<C: SeekableChannel> SeekableChannel for RestrictedChannel<C> {
    /// The width of the permitted range
    fn size(&mut self) -> io::Result<u64> {
        Ok(self.len())
    }

    fn truncate(&mut self, _size: u64) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "cannot truncate a restricted channel",
        ))
    }
}
