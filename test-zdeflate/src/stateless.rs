use zdeflate::{
    compress_bound, compress_slice, compress_stateless, stored_bound, DeflateConfig, DeflateError,
    Flush, Histogram, HuffTables, StatelessOptions, MAX_LEVEL,
};

use crate::helpers::{inflate_raw, random, text};

fn compress(input: &[u8], level: i32) -> Vec<u8> {
    let mut output = vec![0u8; compress_bound(input.len())];
    compress_slice(&mut output, input, DeflateConfig::new(level))
        .unwrap()
        .to_vec()
}

#[test]
fn sizes_at_every_level() {
    for len in [0, 1, 2, 3, 257, 4095, 4096, 65535, 65536, (1 << 20) + 17] {
        let input = text(len, len as u32);

        for level in 0..=MAX_LEVEL {
            let compressed = compress(&input, level);
            assert_eq!(inflate_raw(&compressed, len), input, "len {len} level {level}");
        }
    }
}

#[test]
fn higher_levels_compress_better() {
    let input = text(200_000, 42);

    let level1 = compress(&input, 1).len();
    let level3 = compress(&input, 3).len();
    assert!(level3 <= level1, "{level3} > {level1}");
}

#[test]
fn zeros() {
    let input = vec![0u8; 16 * 1024];

    for level in 0..=MAX_LEVEL {
        let compressed = compress(&input, level);
        assert!(compressed.len() < 40, "level {level}: {}", compressed.len());
        assert_eq!(inflate_raw(&compressed, input.len()), input);
    }
}

#[test]
fn random_data_is_not_expanded_past_stored() {
    let input = random(300_000, 3);

    for level in 0..=MAX_LEVEL {
        let compressed = compress(&input, level);
        assert!(compressed.len() <= stored_bound(input.len()));
        assert_eq!(inflate_raw(&compressed, input.len()), input);
    }
}

#[test]
fn overflow() {
    let input = random(10_000, 4);

    for level in 0..=MAX_LEVEL {
        let mut output = vec![0u8; 100];
        assert_eq!(
            compress_slice(&mut output, &input, DeflateConfig::new(level)).err(),
            Some(DeflateError::StatelessOverflow)
        );
    }
}

#[test]
fn stored_fallback() {
    let input = random(100_000, 5);
    let mut output = vec![0u8; stored_bound(input.len())];

    for level in 0..=MAX_LEVEL {
        let compressed = compress_slice(&mut output, &input, DeflateConfig::new(level)).unwrap();
        assert!(compressed.len() <= stored_bound(input.len()));
        assert_eq!(inflate_raw(compressed, input.len()), input);
    }
}

#[test]
fn independent_chunks_concatenate() {
    let input = text(300_000, 6);

    for level in 0..=MAX_LEVEL {
        for chunk_len in [1000, 65536, 100_000] {
            let mut compressed = Vec::new();
            let mut chunks = input.chunks(chunk_len).peekable();

            while let Some(chunk) = chunks.next() {
                let options = StatelessOptions {
                    flush: Flush::FullFlush,
                    end_of_stream: chunks.peek().is_none(),
                    tables: None,
                };

                let mut output = vec![0u8; compress_bound(chunk.len())];
                let part =
                    compress_stateless(&mut output, chunk, DeflateConfig::new(level), options)
                        .unwrap();
                compressed.extend_from_slice(part);
            }

            assert_eq!(inflate_raw(&compressed, input.len()), input);
        }
    }
}

#[test]
fn empty_non_final_chunk_is_a_sync_point() {
    let options = StatelessOptions {
        flush: Flush::SyncFlush,
        end_of_stream: false,
        tables: None,
    };

    let mut output = [0u8; 64];
    let part = compress_stateless(&mut output, &[], DeflateConfig::new(2), options).unwrap();
    assert_eq!(part, &[0, 0, 0, 0xff, 0xff]);
}

#[test]
fn non_final_chunk_needs_a_flush() {
    let options = StatelessOptions {
        flush: Flush::NoFlush,
        end_of_stream: false,
        tables: None,
    };

    let mut output = [0u8; 64];
    assert_eq!(
        compress_stateless(&mut output, b"abc", DeflateConfig::new(0), options).err(),
        Some(DeflateError::InvalidFlush)
    );
}

#[test]
fn custom_tables() {
    let sample = text(40_000, 8);
    let input = text(40_000, 9);

    let mut histogram = Histogram::new();
    histogram.update(&sample);
    let tables = HuffTables::from_histogram(&histogram).unwrap();
    assert!(tables.is_complete());

    let options = StatelessOptions {
        tables: Some(&tables),
        ..StatelessOptions::default()
    };

    let mut output = vec![0u8; compress_bound(input.len())];
    let tuned = compress_stateless(&mut output, &input, DeflateConfig::new(0), options)
        .unwrap()
        .to_vec();
    assert_eq!(inflate_raw(&tuned, input.len()), input);

    let builtin = compress(&input, 0);
    assert!(tuned.len() < builtin.len());

    // levels 1 to 3 choose their own codes per block
    let mut output = vec![0u8; compress_bound(input.len())];
    let compressed =
        compress_stateless(&mut output, &input, DeflateConfig::new(2), options).unwrap();
    assert_eq!(inflate_raw(compressed, input.len()), input);
}

#[test]
fn histogram_counts() {
    let mut histogram = Histogram::new();
    histogram.update(b"aaaa");

    assert_eq!(histogram.lit_len()[b'a' as usize], 4);
    assert_eq!(histogram.dist().iter().sum::<u64>(), 0);

    let mut histogram = Histogram::new();
    histogram.update(&[b'x'; 1000]);
    assert!(histogram.lit_len()[285] > 0);
    assert!(histogram.dist()[0] > 0);

    // counts accumulate over calls
    let before = histogram.lit_len()[b'x' as usize];
    histogram.update(b"x");
    assert_eq!(histogram.lit_len()[b'x' as usize], before + 1);
}

#[test]
fn bounds() {
    assert_eq!(stored_bound(0), 5);
    assert_eq!(stored_bound(65535), 65540);
    assert_eq!(stored_bound(65536), 65546);

    for len in [0, 1, 1000, 1 << 20] {
        assert!(compress_bound(len) > stored_bound(len));
    }
}

quickcheck::quickcheck! {
    fn compress_bound_is_enough(input: Vec<u8>, config: DeflateConfig) -> bool {
        let mut output = vec![0u8; compress_bound(input.len())];
        compress_slice(&mut output, &input, config).is_ok()
    }
}
