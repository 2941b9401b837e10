#![no_main]
use libfuzzer_sys::fuzz_target;

use zdeflate::{compress_bound, compress_stateless, DeflateConfig, Flush, StatelessOptions};

fuzz_target!(|input: (DeflateConfig, u16, bool, &[u8])| {
    let (config, chunk_len, full_flush, data) = input;
    let chunk_len = Ord::max(1, chunk_len as usize);
    let flush = if full_flush {
        Flush::FullFlush
    } else {
        Flush::SyncFlush
    };

    let mut compressed = Vec::new();
    let mut chunks = data.chunks(chunk_len).peekable();
    if chunks.peek().is_none() {
        return;
    }

    while let Some(chunk) = chunks.next() {
        let options = StatelessOptions {
            flush,
            end_of_stream: chunks.peek().is_none(),
            tables: None,
        };

        let mut output = vec![0u8; compress_bound(chunk.len())];
        let Ok(part) = compress_stateless(&mut output, chunk, config, options) else {
            return;
        };
        compressed.extend_from_slice(part);
    }

    let mut decoded = vec![0u8; data.len()];
    let config = zlib_rs::inflate::InflateConfig { window_bits: -15 };
    let (decoded, error) = zlib_rs::inflate::uncompress_slice(&mut decoded, &compressed, config);
    assert_eq!(zlib_rs::ReturnCode::Ok, error);
    assert_eq!(decoded, data);
});
