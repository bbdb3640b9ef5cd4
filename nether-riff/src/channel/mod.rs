//! Random-access byte channels and offset/bounds-restricted views over them
//!
//! The writer hands each chunk's data writer a view rather than the
//! destination itself. A [`RestrictedChannel`] confines the data writer to the
//! chunk's declared extent; a [`RelativeChannel`] only rebases positions so the
//! data writer sees its payload starting at zero.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

mod relative;
mod restricted;


pub use relative::RelativeChannel;
pub use restricted::RestrictedChannel;

/// A readable, writable, seekable byte channel with a known size
pub trait SeekableChannel: Read + Write + Seek {
    /// Current size of the channel in octets
    fn size(&mut self) -> io::Result<u64>;

    /// Shrink the channel to `size` octets; channels never grow through truncation
    fn truncate(&mut self, size: u64) -> io::Result<()>;
}

impl SeekableChannel for File {
    fn size(&mut self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate(&mut self, size: u64) -> io::Result<()> {
        if size < self.size()? {
            self.set_len(size)?;
        }
        let position = self.stream_position()?;
        if position > size {
            self.seek(SeekFrom::Start(size))?;
        }
        Ok(())
    }
}

impl SeekableChannel for Cursor<Vec<u8>> {
    fn size(&mut self) -> io::Result<u64> {
        Ok(self.get_ref().len() as u64)
    }

    fn truncate(&mut self, size: u64) -> io::Result<()> {
        truncate_vec(self.get_mut(), size);
        clamp_position(self, size);
        Ok(())
    }
}

impl SeekableChannel for Cursor<&mut Vec<u8>> {
    fn size(&mut self) -> io::Result<u64> {
        Ok(self.get_ref().len() as u64)
    }

    fn truncate(&mut self, size: u64) -> io::Result<()> {
        truncate_vec(self.get_mut(), size);
        clamp_position(self, size);
        Ok(())
    }
}

impl<C: SeekableChannel + ?Sized> SeekableChannel for &mut C {
    fn size(&mut self) -> io::Result<u64> {
        (**self).size()
    }

    fn truncate(&mut self, size: u64) -> io::Result<()> {
        (**self).truncate(size)
    }
}

impl<C: SeekableChannel + ?Sized> SeekableChannel for Box<C> {
    fn size(&mut self) -> io::Result<u64> {
        (**self).size()
    }

    fn truncate(&mut self, size: u64) -> io::Result<()> {
        (**self).truncate(size)
    }
}

fn truncate_vec(data: &mut Vec<u8>, size: u64) {
    if let Ok(size) = usize::try_from(size)
        && size < data.len()
    {
        data.truncate(size);
    }
}

fn clamp_position<T>(cursor: &mut Cursor<T>, size: u64) {
    if cursor.position() > size {
        cursor.set_position(size);
    }
}

/// `lower + offset` as a backing channel position
pub(crate) fn translate(lower: u64, offset: u64) -> io::Result<u64> {
    lower.checked_add(offset).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "channel position overflows the backing channel",
        )
    })
}

/// Resolve a seek against a logical position and logical end
pub(crate) fn resolve_seek(position: u64, end: u64, pos: SeekFrom) -> io::Result<u64> {
    let resolved = match pos {
        SeekFrom::Start(p) => Some(p),
        SeekFrom::Current(delta) => position.checked_add_signed(delta),
        SeekFrom::End(delta) => end.checked_add_signed(delta),
    };
    resolved.ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "invalid seek to a negative or overflowing position",
        )
    })
}
