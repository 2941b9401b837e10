use zdeflate::{
    DeflateConfig, DeflateError, DeflateStream, Flush, Histogram, HuffTables, ReturnCode,
    MAX_LEVEL,
};

use crate::helpers::{deflate_chunked, finish, inflate_raw, random, text};

const LEVELS: core::ops::RangeInclusive<i32> = 0..=MAX_LEVEL;

fn stream(level: i32) -> DeflateStream {
    DeflateStream::new(DeflateConfig::new(level)).unwrap()
}

#[test]
fn empty_and_single_byte() {
    for level in LEVELS {
        let compressed = deflate_chunked(&mut stream(level), &[], 1, 64, Flush::NoFlush);
        assert_eq!(compressed, [0x03, 0x00]);

        let compressed = deflate_chunked(&mut stream(level), b"!", 1, 64, Flush::NoFlush);
        assert_eq!(inflate_raw(&compressed, 1), b"!");
    }
}

#[test]
fn more_than_a_mebibyte() {
    let mut input = text(1 << 20, 1);
    input.extend_from_slice(&random(100_000, 2));
    input.extend_from_slice(&text(50_000, 3));

    for level in LEVELS {
        let compressed = deflate_chunked(&mut stream(level), &input, 1 << 16, 1 << 16, Flush::NoFlush);
        assert!(compressed.len() < input.len() / 2, "level {level}");
        assert_eq!(inflate_raw(&compressed, input.len()), input, "level {level}");
    }
}

#[test]
fn random_input_into_small_buffers() {
    let input = random(1 << 20, 5);

    for level in LEVELS {
        let mut stream = stream(level);
        let compressed = deflate_chunked(&mut stream, &input, 37, 16, Flush::NoFlush);

        assert_eq!(stream.total_in(), input.len() as u64);
        assert_eq!(inflate_raw(&compressed, input.len()), input, "level {level}");
    }
}

#[test]
fn repeated_pattern() {
    let input: Vec<u8> = b"abc".iter().copied().cycle().take(1000).collect();

    for level in LEVELS {
        let compressed = deflate_chunked(&mut stream(level), &input, 1000, 4096, Flush::NoFlush);
        assert_eq!(inflate_raw(&compressed, input.len()), input);

        // level 0 always pays for the header of its table
        if level > 0 {
            assert!(compressed.len() < 40, "level {level}: {} bytes", compressed.len());
        }
    }
}

#[test]
fn zeros_in_one_call() {
    let input = vec![0u8; 16 * 1024];

    for level in LEVELS {
        let mut stream = stream(level);
        let mut output = vec![0u8; 4096];

        let progress = stream
            .deflate(&input, &mut output, Flush::NoFlush, true)
            .unwrap();
        assert_eq!(progress.code, ReturnCode::StreamEnd);
        assert!(progress.produced < 40, "level {level}: {}", progress.produced);
        assert_eq!(inflate_raw(&output[..progress.produced], input.len()), input);
    }
}

#[test]
fn buffer_full_fills_the_buffer() {
    let input = text(50_000, 9);

    for level in LEVELS {
        for out_len in [1, 2, 7, 16, 17, 100, 1000] {
            let mut stream = stream(level);
            let mut output = vec![0u8; out_len];
            let mut compressed = Vec::new();
            let mut rest = &input[..];

            loop {
                let progress = stream
                    .deflate(rest, &mut output, Flush::NoFlush, true)
                    .unwrap();
                rest = &rest[progress.consumed..];
                compressed.extend_from_slice(&output[..progress.produced]);

                match progress.code {
                    ReturnCode::BufferFull => assert_eq!(progress.produced, out_len),
                    ReturnCode::StreamEnd => break,
                    ReturnCode::Ok => panic!("all input was available"),
                }
            }

            assert_eq!(inflate_raw(&compressed, input.len()), input);
        }
    }
}

#[test]
fn output_stays_in_bounds() {
    let input = text(20_000, 4);

    for level in LEVELS {
        for out_len in [1, 9, 15, 16, 17, 24, 31, 64] {
            // the bytes after the output slice must never be touched
            let mut backing = vec![0xAAu8; out_len + 64];
            let mut stream = stream(level);
            let mut compressed = Vec::new();
            let mut rest = &input[..];

            loop {
                let (output, canary) = backing.split_at_mut(out_len);
                let progress = stream
                    .deflate(rest, output, Flush::NoFlush, true)
                    .unwrap();
                assert!(canary.iter().all(|&b| b == 0xAA));

                rest = &rest[progress.consumed..];
                compressed.extend_from_slice(&output[..progress.produced]);

                if progress.code == ReturnCode::StreamEnd {
                    break;
                }
            }

            assert_eq!(inflate_raw(&compressed, input.len()), input);
        }
    }
}

#[test]
fn sync_flush_per_chunk() {
    let input = text(30_000, 8);

    for level in LEVELS {
        for flush in [Flush::SyncFlush, Flush::FullFlush] {
            let mut stream = stream(level);
            let mut output = vec![0u8; 8192];
            let mut compressed = Vec::new();

            for chunk in input.chunks(1000) {
                let progress = stream.deflate(chunk, &mut output, flush, false).unwrap();
                assert_eq!(progress.code, ReturnCode::Ok);
                assert_eq!(progress.consumed, chunk.len());

                let produced = &output[..progress.produced];
                assert!(produced.ends_with(&[0, 0, 0xff, 0xff]), "level {level}");
                compressed.extend_from_slice(produced);
            }

            finish(&mut stream, &mut output, &mut compressed);
            assert_eq!(inflate_raw(&compressed, input.len()), input);
        }
    }
}

#[test]
fn flush_is_idempotent() {
    for level in LEVELS {
        let mut stream = stream(level);
        let mut output = vec![0u8; 1024];

        let progress = stream
            .deflate(b"some data", &mut output, Flush::SyncFlush, false)
            .unwrap();
        assert!(progress.produced > 0);

        for flush in [Flush::SyncFlush, Flush::FullFlush, Flush::SyncFlush] {
            let again = stream.deflate(&[], &mut output, flush, false).unwrap();
            assert_eq!(again.produced, 0, "level {level}");
            assert_eq!(again.code, ReturnCode::Ok);
        }
    }
}

#[test]
fn flush_on_empty_stream_writes_a_sync_point() {
    let mut stream = stream(1);
    let mut output = vec![0u8; 64];

    let progress = stream
        .deflate(&[], &mut output, Flush::SyncFlush, false)
        .unwrap();
    assert_eq!(&output[..progress.produced], &[0, 0, 0, 0xff, 0xff]);
}

#[test]
fn no_flush_may_hold_back_output() {
    let mut stream = stream(2);
    let mut output = vec![0u8; 1024];

    let progress = stream
        .deflate(b"short", &mut output, Flush::NoFlush, false)
        .unwrap();
    assert_eq!(progress.code, ReturnCode::Ok);
    assert_eq!(progress.consumed, 5);
    assert_eq!(progress.produced, 0);

    let mut compressed = Vec::new();
    finish(&mut stream, &mut output, &mut compressed);
    assert_eq!(inflate_raw(&compressed, 5), b"short");
}

#[test]
fn end_of_stream_is_sticky() {
    let input = text(10_000, 6);

    let mut stream = stream(3);
    let mut output = vec![0u8; 10];
    let mut compressed = Vec::new();

    let progress = stream
        .deflate(&input, &mut output, Flush::NoFlush, true)
        .unwrap();
    assert_eq!(progress.code, ReturnCode::BufferFull);
    compressed.extend_from_slice(&output[..progress.produced]);
    let mut rest = &input[progress.consumed..];

    // later calls forget to pass the flag
    loop {
        let progress = stream
            .deflate(rest, &mut output, Flush::NoFlush, false)
            .unwrap();
        rest = &rest[progress.consumed..];
        compressed.extend_from_slice(&output[..progress.produced]);

        if progress.code == ReturnCode::StreamEnd {
            break;
        }
    }

    assert_eq!(inflate_raw(&compressed, input.len()), input);

    assert_eq!(
        stream.deflate(b"x", &mut output, Flush::NoFlush, true),
        Err(DeflateError::StreamFinished)
    );
}

#[test]
fn reset_and_reuse() {
    let first = text(40_000, 1);
    let second = random(40_000, 2);

    for level in LEVELS {
        let mut stream = stream(level);

        let a = deflate_chunked(&mut stream, &first, 999, 4096, Flush::NoFlush);
        stream.reset();
        assert_eq!((stream.total_in(), stream.total_out()), (0, 0));

        let b = deflate_chunked(&mut stream, &second, 999, 4096, Flush::NoFlush);
        assert_eq!(inflate_raw(&a, first.len()), first);
        assert_eq!(inflate_raw(&b, second.len()), second);

        stream.reset();
        let c = deflate_chunked(&mut stream, &first, 999, 4096, Flush::NoFlush);
        assert_eq!(a, c);
    }
}

#[test]
fn installed_tables() {
    let sample = text(50_000, 100);
    let input = text(50_000, 200);

    let mut histogram = Histogram::new();
    histogram.update(&sample);
    let tables = HuffTables::from_histogram(&histogram).unwrap();

    let builtin = deflate_chunked(&mut stream(0), &input, 4096, 4096, Flush::NoFlush);

    let mut tuned_stream = stream(0);
    tuned_stream.set_hufftables(tables.clone()).unwrap();
    let tuned = deflate_chunked(&mut tuned_stream, &input, 4096, 4096, Flush::NoFlush);

    assert_eq!(inflate_raw(&tuned, input.len()), input);
    assert!(tuned.len() < builtin.len(), "{} vs {}", tuned.len(), builtin.len());

    // the tables also work for input they were not sampled on
    let noise = random(20_000, 1);
    let mut tuned_stream = stream(0);
    tuned_stream.set_hufftables(tables).unwrap();
    let compressed = deflate_chunked(&mut tuned_stream, &noise, 4096, 4096, Flush::NoFlush);
    assert_eq!(inflate_raw(&compressed, noise.len()), noise);
}

#[test]
fn tables_installed_mid_stream() {
    let input = text(30_000, 12);

    let mut histogram = Histogram::new();
    histogram.update(&input);
    let tables = HuffTables::from_histogram(&histogram).unwrap();

    let mut stream = stream(0);
    let mut output = vec![0u8; 4096];

    let (head, tail) = input.split_at(10_000);
    let progress = stream.deflate(head, &mut output, Flush::SyncFlush, false).unwrap();
    let mut compressed = output[..progress.produced].to_vec();

    stream.set_hufftables(tables).unwrap();
    compressed.extend(deflate_chunked(&mut stream, tail, 1000, 4096, Flush::NoFlush));

    assert_eq!(inflate_raw(&compressed, input.len()), input);
}

#[test]
fn invalid_configurations() {
    for level in [-2, 4, 9, i32::MAX] {
        assert_eq!(
            DeflateStream::new(DeflateConfig::new(level)).err().map(|e| e.to_string()),
            Some(DeflateError::InvalidLevel.to_string())
        );
    }

    for window_bits in [0, 7, 16, 31, -7, -16] {
        let config = DeflateConfig {
            level: 1,
            window_bits,
        };
        assert!(matches!(
            DeflateStream::new(config),
            Err(DeflateError::InvalidWindowBits)
        ));
    }

    assert_eq!(Flush::try_from(1), Ok(Flush::SyncFlush));
    assert_eq!(Flush::try_from(3), Err(DeflateError::InvalidFlush));
    assert_eq!(i32::from(ReturnCode::BufferFull), 2);
}

#[test]
fn every_window_size() {
    let mut input = text(20_000, 77);
    input.extend_from_within(..5000);

    for window_bits in 8..=15 {
        for level in LEVELS {
            let config = DeflateConfig {
                level,
                window_bits: -window_bits,
            };
            let mut stream = DeflateStream::new(config).unwrap();
            let compressed = deflate_chunked(&mut stream, &input, 3000, 3000, Flush::NoFlush);
            assert_eq!(inflate_raw(&compressed, input.len()), input);
        }
    }
}

quickcheck::quickcheck! {
    fn chunked_with_flushes(input: Vec<u8>, config: DeflateConfig, chunk: u8, sync: bool) -> bool {
        let flush = if sync { Flush::SyncFlush } else { Flush::FullFlush };
        let chunk = Ord::max(1, chunk as usize);

        let mut stream = DeflateStream::new(config).unwrap();
        let compressed = deflate_chunked(&mut stream, &input, chunk, 64, flush);

        inflate_raw(&compressed, input.len()) == input
    }
}
