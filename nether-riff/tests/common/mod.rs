//! Shared helpers for the integration tests

#![allow(dead_code)]

use std::io::{Cursor, Write};

use nether_riff::{
    ByteOrder, ChunkBuilder, ChunkId, FOURCC_LIST, FileDescription, ParsedChunk, ParsedFile,
    RiffFileBuilder, RiffWriter,
};
use rand::Rng;

pub fn id(s: &str) -> ChunkId {
    s.parse().unwrap()
}

/// A `RIFF(WAVE)` (or `RIFX(WAVE)`) file with `fmt `, `LIST(INFO)` and `data`
pub fn wav_description(order: ByteOrder, samples: Vec<u8>) -> FileDescription {
    let fmt: Vec<u8> = (0..16).collect();

    let mut builder = RiffFileBuilder::new(order);
    {
        let mut root = builder.set_root_chunk(order.root_id(), id("WAVE"));
        root.add_sub_chunk(id("fmt "))
            .unwrap()
            .set_size(16)
            .set_data_writer(move |ch| ch.write_all(&fmt))
            .unwrap();
        {
            let mut info = root.add_sub_chunk(FOURCC_LIST).unwrap();
            info.set_form(id("INFO"));
            info.add_sub_chunk(id("INAM"))
                .unwrap()
                .set_data_writer(|ch| ch.write_all(b"Nether Theme\0"))
                .unwrap();
            info.add_sub_chunk(id("ISFT"))
                .unwrap()
                .set_data_writer(|ch| ch.write_all(b"nether-riff\0"))
                .unwrap();
        }
        root.add_sub_chunk(id("data"))
            .unwrap()
            .set_data_writer(move |ch| ch.write_all(&samples))
            .unwrap();
    }
    builder.build().unwrap()
}

/// Serialize a description into memory
pub fn write(description: &FileDescription) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    RiffWriter::new("memory", description, &mut out)
        .write()
        .unwrap();
    out.into_inner()
}

/// Rebuild a description from a parsed file, replaying each leaf's payload
pub fn replay(file: &ParsedFile, data: &[u8]) -> FileDescription {
    let root = file.root_chunk().unwrap();
    let mut builder = RiffFileBuilder::new(file.byte_order());
    {
        let mut guard = builder.set_root_chunk(root.name(), root.form_type().unwrap());
        replay_children(&mut guard, root, data);
    }
    builder.build().unwrap()
}

fn replay_children(parent: &mut ChunkBuilder<'_>, chunk: ParsedChunk<'_>, data: &[u8]) {
    for child in chunk.sub_chunks() {
        let mut guard = parent.add_sub_chunk(child.name()).unwrap();
        match child.form_type() {
            Some(form) => {
                guard.set_form(form);
                replay_children(&mut guard, child, data);
            }
            None => {
                let payload = child.payload(data).unwrap().to_vec();
                guard
                    .set_data_writer(move |ch| ch.write_all(&payload))
                    .unwrap();
            }
        }
    }
}

/// Build a random tree below `parent`, at most `depth` containers deep
pub fn random_children<R: Rng>(rng: &mut R, parent: &mut ChunkBuilder<'_>, depth: usize) {
    let count = rng.random_range(1..5);
    for n in 0..count {
        if depth > 0 && rng.random_bool(0.3) {
            let mut list = parent.add_sub_chunk(FOURCC_LIST).unwrap();
            list.set_form(ChunkId::new([b'l', b's', b't', b'0' + n as u8]));
            random_children(rng, &mut list, depth - 1);
        } else {
            let len = rng.random_range(1..40usize);
            let payload: Vec<u8> = (0..len).map(|_| rng.random()).collect();
            let mut leaf = parent
                .add_sub_chunk(ChunkId::new([b'c', b'k', b'0' + n as u8, b' ']))
                .unwrap();
            if rng.random_bool(0.25) {
                leaf.set_size(len as u64 + rng.random_range(0..8u64));
            }
            leaf.set_data_writer(move |ch| ch.write_all(&payload))
                .unwrap();
        }
    }
}

/// Check that every container's children add up to its declared size and
/// every chunk lies inside the buffer
pub fn assert_structurally_valid(file: &ParsedFile, len: usize) {
    for chunk in file.linearized_chunks() {
        assert!(chunk.offset() + chunk.total_size() <= len as u64);
        if chunk.form_type().is_some() {
            let sum: u64 = chunk.sub_chunks().map(|c| c.total_size()).sum();
            assert_eq!(sum + 4, chunk.data_size_including_form().unpadded());
        } else {
            assert_eq!(chunk.sub_chunks().len(), 0);
        }
        for sub in chunk.sub_chunks() {
            assert_eq!(sub.parent(), Some(chunk));
        }
    }
}
