#![no_main]
use libfuzzer_sys::{arbitrary, fuzz_target};

use zdeflate::{DeflateConfig, DeflateStream, Flush, ReturnCode};

#[derive(Debug, arbitrary::Arbitrary)]
struct Run<'a> {
    config: DeflateConfig,
    data: &'a [u8],
    /// input bytes per call, and the flush of that call
    chunks: Vec<(u8, Flush)>,
    out_len: u8,
}

fuzz_target!(|run: Run| {
    let Ok(mut stream) = DeflateStream::new(run.config) else {
        return;
    };

    let mut output = vec![0u8; Ord::max(1, run.out_len as usize)];
    let mut compressed = Vec::new();
    let mut rest = run.data;

    let mut chunks = run.chunks.iter().cycle();
    while !rest.is_empty() {
        let (len, flush) = match chunks.next() {
            Some(&(len, flush)) => (Ord::max(1, len as usize), flush),
            None => (rest.len(), Flush::NoFlush),
        };

        let (mut chunk, tail) = rest.split_at(Ord::min(len, rest.len()));
        rest = tail;

        loop {
            let progress = stream.deflate(chunk, &mut output, flush, false).unwrap();
            compressed.extend_from_slice(&output[..progress.produced]);
            chunk = &chunk[progress.consumed..];

            match progress.code {
                ReturnCode::BufferFull => assert_eq!(progress.produced, output.len()),
                ReturnCode::Ok => break,
                ReturnCode::StreamEnd => unreachable!("the end was never requested"),
            }
        }

        assert!(chunk.is_empty());

        if flush != Flush::NoFlush {
            assert!(compressed.ends_with(&[0, 0, 0xff, 0xff]));
        }
    }

    loop {
        let progress = stream.deflate(&[], &mut output, Flush::NoFlush, true).unwrap();
        compressed.extend_from_slice(&output[..progress.produced]);

        if progress.code == ReturnCode::StreamEnd {
            break;
        }
    }

    assert_eq!(stream.total_in(), run.data.len() as u64);

    let mut decoded = vec![0u8; run.data.len()];
    let config = zlib_rs::inflate::InflateConfig { window_bits: -15 };
    let (decoded, error) = zlib_rs::inflate::uncompress_slice(&mut decoded, &compressed, config);
    assert_eq!(zlib_rs::ReturnCode::Ok, error);
    assert_eq!(decoded, run.data);
});
