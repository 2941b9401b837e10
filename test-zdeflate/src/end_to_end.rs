use zdeflate::{compress_bound, compress_slice, DeflateConfig, DeflateStream, Flush};

use crate::helpers::{deflate_chunked, inflate_raw};

#[test]
fn end_to_end() {
    ::quickcheck::quickcheck(test as fn(_, _) -> _);
}

#[test]
fn end_to_end_chunked() {
    ::quickcheck::quickcheck(test_chunked as fn(_, _, _, _) -> _);
}

/// One shot compression must inflate back to `data`, and fit in `compress_bound`.
pub fn test(data: Vec<u8>, config: DeflateConfig) -> bool {
    let mut output = vec![0u8; compress_bound(data.len())];
    let compressed = compress_slice(&mut output, &data, config).unwrap();

    assert_eq!(inflate_raw(compressed, data.len()), data);

    true
}

/// The stateful stream must inflate back to `data` for any split of input and output.
pub fn test_chunked(data: Vec<u8>, config: DeflateConfig, in_chunk: u8, out_chunk: u8) -> bool {
    let in_chunk = Ord::max(1, in_chunk as usize);
    let out_chunk = Ord::max(1, out_chunk as usize);

    let mut stream = DeflateStream::new(config).unwrap();
    let compressed = deflate_chunked(&mut stream, &data, in_chunk, out_chunk, Flush::NoFlush);

    assert_eq!(stream.total_in(), data.len() as u64);
    assert_eq!(stream.total_out(), compressed.len() as u64);
    assert_eq!(inflate_raw(&compressed, data.len()), data);

    true
}
