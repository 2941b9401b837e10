use zdeflate::{DeflateConfig, DeflateStream, Flush, Wrapper};

use crate::helpers::{deflate_chunked, inflate_with, random, text};

/// Minimal gzip framing: no file name, no header crc.
#[derive(Default)]
struct Gzip {
    crc: crc32fast::Hasher,
    headers: usize,
}

impl Wrapper for Gzip {
    fn header(&mut self) -> Vec<u8> {
        self.crc = crc32fast::Hasher::new();
        self.headers += 1;

        // magic, deflate, no flags, no mtime, no extra flags, unknown os
        vec![0x1f, 0x8b, 8, 0, 0, 0, 0, 0, 0, 0xff]
    }

    fn update(&mut self, consumed: &[u8]) {
        self.crc.update(consumed);
    }

    fn trailer(&mut self, total_in: u64) -> Vec<u8> {
        let crc = self.crc.clone().finalize();

        let mut trailer = Vec::with_capacity(8);
        trailer.extend_from_slice(&crc.to_le_bytes());
        trailer.extend_from_slice(&(total_in as u32).to_le_bytes());
        trailer
    }
}

fn gunzip(compressed: &[u8], len: usize) -> Vec<u8> {
    inflate_with(compressed, len, 16 + 15)
}

#[test]
fn gzip_every_level() {
    let input = text(100_000, 7);

    for level in 0..=3 {
        let mut stream = DeflateStream::with_wrapper(DeflateConfig::new(level), Gzip::default())
            .unwrap();
        let compressed = deflate_chunked(&mut stream, &input, 4096, 1000, Flush::NoFlush);

        assert_eq!(&compressed[..3], &[0x1f, 0x8b, 8]);
        assert_eq!(gunzip(&compressed, input.len()), input);
    }
}

#[test]
fn gzip_tiny_output() {
    // header and trailer bytes also go through the small buffers
    let input = random(3000, 11);

    let mut stream =
        DeflateStream::with_wrapper(DeflateConfig::new(2), Gzip::default()).unwrap();
    let compressed = deflate_chunked(&mut stream, &input, 100, 1, Flush::SyncFlush);

    assert_eq!(gunzip(&compressed, input.len()), input);
}

#[test]
fn gzip_constant_input() {
    // the whole input is consumed in one call, and must still reach the checksum
    let input = vec![b'a'; 50_000];

    let mut stream =
        DeflateStream::with_wrapper(DeflateConfig::new(1), Gzip::default()).unwrap();
    let mut output = vec![0u8; 1024];
    let progress = stream
        .deflate(&input, &mut output, Flush::NoFlush, true)
        .unwrap();

    assert_eq!(progress.code, zdeflate::ReturnCode::StreamEnd);
    assert_eq!(progress.consumed, input.len());
    assert_eq!(gunzip(&output[..progress.produced], input.len()), input);
}

#[test]
fn reset_writes_a_new_header() {
    let input = text(5000, 3);

    let mut stream =
        DeflateStream::with_wrapper(DeflateConfig::new(3), Gzip::default()).unwrap();
    let first = deflate_chunked(&mut stream, &input, 5000, 64, Flush::NoFlush);

    stream.reset();
    let second = deflate_chunked(&mut stream, &input, 5000, 64, Flush::NoFlush);

    assert_eq!(stream.wrapper().headers, 2);
    assert_eq!(first, second);
    assert_eq!(gunzip(&second, input.len()), input);
}
