use crate::deflate::bit_writer::BitWriter;
use crate::deflate::header::{write_stored_header, STORED_HEADER_MAX_BITS};

/// Maximum stored block length in deflate format (not including header).
pub(crate) const MAX_STORED: usize = u16::MAX as usize;

/// Upper bound of the bits needed to write `len` bytes as stored blocks.
pub(crate) fn stored_block_bits(len: usize) -> u64 {
    let blocks = Ord::max(1, len.div_ceil(MAX_STORED));
    (blocks * STORED_HEADER_MAX_BITS) as u64 + 8 * len as u64
}

/// Write `data` as one or more stored blocks. The writer must have room for all of it.
pub(crate) fn write_stored_blocks(writer: &mut BitWriter, data: &[u8], last: bool) {
    let mut chunks = data.chunks(MAX_STORED).peekable();

    if chunks.peek().is_none() {
        write_stored_header(writer, last, 0);
        return;
    }

    while let Some(chunk) = chunks.next() {
        let is_last = last && chunks.peek().is_none();
        write_stored_header(writer, is_last, chunk.len() as u16);
        writer.write_bytes(chunk);
    }
}
