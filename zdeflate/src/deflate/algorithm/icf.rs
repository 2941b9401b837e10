use crate::deflate::bit_writer::BitWriter;
use crate::deflate::icf::IcfBuffer;
use crate::deflate::tables::HuffTables;

use super::{stored_block_bits, BlockTables, BlockType};

/// Pick the cheapest way to write the block collected in `icf`.
///
/// `raw_len` is the number of input bytes of the block when they can still be copied into a stored
/// block. On return `tables.dynamic` holds the block's own codes if those were chosen.
pub(crate) fn choose_block_type(
    icf: &IcfBuffer,
    raw_len: Option<usize>,
    tables: &mut BlockTables,
) -> BlockType {
    let histogram = icf.block_histogram();

    let stored = raw_len.map(stored_block_bits);

    // the fixed codes cover every symbol
    let fixed = tables.fixed.body_bits(&histogram).map(|body| 3 + body);

    let dynamic = match HuffTables::for_block(&histogram) {
        Ok(block_tables) => {
            let cost = block_tables
                .body_bits(&histogram)
                .map(|body| block_tables.header_bits() as u64 + body);
            tables.dynamic = block_tables;
            cost
        }
        Err(error) => {
            trace!("no dynamic codes for this block: {error}");

            let block_type = match raw_len {
                Some(_) => BlockType::Stored,
                None => BlockType::Default,
            };

            trace!("block of {} records written as {block_type:?}", icf.len());
            return block_type;
        }
    };

    let mut best = (BlockType::Dynamic, dynamic.unwrap_or(u64::MAX));
    if let Some(fixed) = fixed {
        if fixed <= best.1 {
            best = (BlockType::Fixed, fixed);
        }
    }
    if let Some(stored) = stored {
        if stored < best.1 {
            best = (BlockType::Stored, stored);
        }
    }

    trace!(
        "block of {} records ({:?} raw bytes): dynamic {dynamic:?} fixed {fixed:?} stored {stored:?} bits, using {:?}",
        icf.len(),
        raw_len,
        best.0,
    );

    best.0
}

/// Entropy code the pending records of `icf`. Returns false when the writer filled up first.
pub(crate) fn write_records(writer: &mut BitWriter, icf: &mut IcfBuffer, tables: &HuffTables) -> bool {
    let pending = icf.pending();

    let mut written = 0;
    for record in pending {
        if writer.is_full() {
            break;
        }

        let (bits, count) = record.encode(tables);
        writer.write(bits, count);
        written += 1;
    }

    let done = written == pending.len();
    icf.consume(written);

    done
}
