use zdeflate::{DeflateStream, Flush, ReturnCode, Wrapper};
use zlib_rs::inflate::InflateConfig;

/// Inflate a raw deflate stream that is known to decode to `len` bytes.
pub fn inflate_raw(compressed: &[u8], len: usize) -> Vec<u8> {
    inflate_with(compressed, len, -15)
}

/// Inflate with zlib's `window_bits` convention: negative for raw, 16 and up for gzip.
pub fn inflate_with(compressed: &[u8], len: usize, window_bits: i32) -> Vec<u8> {
    // one spare byte, so trailing garbage in the output would show up
    let mut output = vec![0u8; len + 1];
    let (decoded, err) =
        zlib_rs::inflate::uncompress_slice(&mut output, compressed, InflateConfig { window_bits });

    assert_eq!(err, zlib_rs::ReturnCode::Ok, "zlib-rs cannot decode these bytes");
    decoded.to_vec()
}

/// Feed `input` in pieces of `in_chunk` bytes, each call with `flush`, and then end the stream.
/// Every call gets at most `out_chunk` bytes of output space.
pub fn deflate_chunked<W: Wrapper>(
    stream: &mut DeflateStream<W>,
    input: &[u8],
    in_chunk: usize,
    out_chunk: usize,
    flush: Flush,
) -> Vec<u8> {
    let mut compressed = Vec::new();
    let mut output = vec![0u8; out_chunk];

    for chunk in input.chunks(in_chunk) {
        let mut chunk = chunk;

        loop {
            let progress = stream.deflate(chunk, &mut output, flush, false).unwrap();
            compressed.extend_from_slice(&output[..progress.produced]);
            chunk = &chunk[progress.consumed..];

            match progress.code {
                ReturnCode::BufferFull => assert_eq!(progress.produced, output.len()),
                ReturnCode::Ok => {
                    assert!(chunk.is_empty());
                    break;
                }
                ReturnCode::StreamEnd => panic!("stream ended before the end was requested"),
            }
        }
    }

    finish(stream, &mut output, &mut compressed);

    compressed
}

/// Call `deflate` with an ending flag and no input until the stream ends.
pub fn finish<W: Wrapper>(
    stream: &mut DeflateStream<W>,
    output: &mut [u8],
    compressed: &mut Vec<u8>,
) {
    loop {
        let progress = stream.deflate(&[], output, Flush::NoFlush, true).unwrap();
        compressed.extend_from_slice(&output[..progress.produced]);

        match progress.code {
            ReturnCode::StreamEnd => break,
            ReturnCode::BufferFull => assert_eq!(progress.produced, output.len()),
            ReturnCode::Ok => panic!("an ending stream asked for more input"),
        }
    }
}

/// Text built from a small vocabulary, compresses well.
pub fn text(len: usize, seed: u32) -> Vec<u8> {
    const WORDS: &[&str] = &[
        "the ", "quick ", "brown ", "fox ", "jumps ", "over ", "lazy ", "dog", ". ", "\n",
        "compression ", "window ", "block ", "huffman ",
    ];

    let mut rng = XorShift(seed | 1);
    let mut out = Vec::with_capacity(len + 16);
    while out.len() < len {
        out.extend_from_slice(WORDS[rng.next() as usize % WORDS.len()].as_bytes());
    }

    out.truncate(len);
    out
}

/// Bytes without structure, do not compress.
pub fn random(len: usize, seed: u32) -> Vec<u8> {
    let mut rng = XorShift(seed | 1);
    (0..len).map(|_| rng.next() as u8).collect()
}

struct XorShift(u32);

impl XorShift {
    fn next(&mut self) -> u32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 17;
        self.0 ^= self.0 << 5;
        self.0
    }
}
