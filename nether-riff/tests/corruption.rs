//! Parser robustness against damaged input.
//!
//! None of these inputs may panic: each must parse to a structurally valid
//! tree or fail with a `ParseError`.

mod common;

use nether_riff::{ByteOrder, ChunkId, ParseErrorKind, RiffParser, parse_riff};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use common::{assert_structurally_valid, wav_description, write};

fn sample_file() -> Vec<u8> {
    let samples: Vec<u8> = (0..257u32).map(|n| (n * 7 % 256) as u8).collect();
    write(&wav_description(ByteOrder::LittleEndian, samples))
}

/// Flipping a small fraction of bytes never yields anything but a valid tree
/// or an error
#[test]
fn test_random_byte_flips() {
    let original = sample_file();
    let mut parsed_ok = 0;

    for seed in 0..500u64 {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut data = original.clone();
        for byte in data.iter_mut() {
            if rng.random_bool(0.01) {
                *byte ^= 1u8 << rng.random_range(0..8u32);
            }
        }

        match parse_riff(format!("seed {seed}"), &data) {
            Ok(file) => {
                assert_structurally_valid(&file, data.len());
                parsed_ok += 1;
            }
            Err(err) => assert_eq!(err.origin, format!("seed {seed}")),
        }
    }

    // payload-only damage still parses
    assert!(parsed_ok > 0);
}

/// Damage aimed at the header fields specifically
#[test]
fn test_random_header_damage() {
    let original = sample_file();
    let file = parse_riff("original", &original).unwrap();
    let header_offsets: Vec<usize> = file
        .linearized_chunks()
        .flat_map(|c| {
            let start = c.offset() as usize;
            start..start + 12
        })
        .filter(|&n| n < original.len())
        .collect();

    for seed in 0..500u64 {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut data = original.clone();
        for _ in 0..rng.random_range(1..4) {
            let at = header_offsets[rng.random_range(0..header_offsets.len())];
            data[at] = rng.random();
        }

        if let Ok(file) = parse_riff("damaged", &data) {
            assert_structurally_valid(&file, data.len());
        }
    }
}

/// Every strict prefix of a valid file is rejected
#[test]
fn test_truncated_prefixes() {
    let original = sample_file();
    for len in 0..original.len() {
        let err = parse_riff("prefix", &original[..len]).unwrap_err();
        if len < 8 {
            assert!(matches!(err.kind, ParseErrorKind::Truncated { .. }), "len {len}");
        } else {
            assert!(
                matches!(err.kind, ParseErrorKind::DeclaredSizeExceedsAvailable { .. }),
                "len {len}: {err}"
            );
        }
    }
    assert!(parse_riff("whole", &original).is_ok());
}

/// Random bytes behind a valid magic
#[test]
fn test_random_garbage() {
    for seed in 0..500u64 {
        let mut rng = Pcg32::seed_from_u64(seed);
        let len = rng.random_range(4..256);
        let mut data: Vec<u8> = (0..len).map(|_| rng.random()).collect();
        data[..4].copy_from_slice(b"RIFF");

        if let Ok(file) = parse_riff("garbage", &data) {
            assert_structurally_valid(&file, data.len());
        }
    }
}

/// Deeply nested containers stop at the depth limit, and parse without
/// exhausting the stack when the limit is lifted
#[test]
fn test_hostile_nesting() {
    let mut chunk = b"leaf\x02\x00\x00\x00ok".to_vec();
    for _ in 0..10_000 {
        let mut wrapper = b"LIST".to_vec();
        wrapper.extend_from_slice(&(chunk.len() as u32 + 4).to_le_bytes());
        wrapper.extend_from_slice(b"deep");
        wrapper.extend_from_slice(&chunk);
        chunk = wrapper;
    }
    chunk[..4].copy_from_slice(b"RIFF");

    let err = parse_riff("deep", &chunk).unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::NestingTooDeep { limit: 64, .. }));

    let err = RiffParser::new("deep", &chunk)
        .with_max_depth(500)
        .parse()
        .unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::NestingTooDeep { limit: 500, .. }));

    let file = RiffParser::new("deep", &chunk)
        .with_max_depth(usize::MAX)
        .parse()
        .unwrap();
    assert_eq!(file.len(), 10_001);
    let leaf = file.linearized_chunks().last().unwrap();
    assert_eq!(leaf.name(), ChunkId::new(*b"leaf"));
    assert_eq!(leaf.depth(), 10_000);
    assert_structurally_valid(&file, chunk.len());
}
