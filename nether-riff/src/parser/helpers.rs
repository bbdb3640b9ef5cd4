//! Helper functions for reading chunk headers

use std::io::{Cursor, Read};

use crate::error::ParseErrorKind;
use crate::id::ChunkId;
use crate::order::ByteOrder;

/// Octets left between the cursor and the end of the buffer
pub(crate) fn remaining(cursor: &Cursor<&[u8]>) -> u64 {
    (cursor.get_ref().len() as u64).saturating_sub(cursor.position())
}

fn read_exact(cursor: &mut Cursor<&[u8]>, buf: &mut [u8]) -> Result<(), ParseErrorKind> {
    let remaining = remaining(cursor);
    cursor
        .read_exact(buf)
        .map_err(|_| ParseErrorKind::Truncated {
            needed: buf.len() as u64,
            remaining,
        })
}

/// Read a four-byte chunk identifier or form type
pub(crate) fn read_id(cursor: &mut Cursor<&[u8]>) -> Result<ChunkId, ParseErrorKind> {
    let mut buf = [0u8; 4];
    read_exact(cursor, &mut buf)?;
    Ok(ChunkId::new(buf))
}

/// Read a 32-bit size field in the file's byte order
pub(crate) fn read_u32(cursor: &mut Cursor<&[u8]>, order: ByteOrder) -> Result<u32, ParseErrorKind> {
    let mut buf = [0u8; 4];
    read_exact(cursor, &mut buf)?;
    Ok(order.read_u32(buf))
}
