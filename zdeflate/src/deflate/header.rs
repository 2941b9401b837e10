use crate::DeflateError;

use super::bit_writer::{BitWriter, PendingBits, BIT_WRITER_MARGIN};
use super::huffman::build_code;
use super::tables::{HuffCode, BL_CODES, D_CODES, L_CODES, LITERALS, MAX_BL_BITS};

/// The order in which the code-length code lengths are sent
pub(crate) const BL_ORDER: [u8; BL_CODES] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// repeat previous bit length 3-6 times (2 bits of repeat count)
const REP_3_6: u8 = 16;

/// repeat a zero length 3-10 times  (3 bits of repeat count)
const REPZ_3_10: u8 = 17;

/// repeat a zero length 11-138 times  (7 bits of repeat count)
const REPZ_11_138: u8 = 18;

/// Worst case: block type and counts, 19 three-bit lengths, and a 7-bit code with 7 extra bits
/// for every code length.
pub(crate) const MAX_HEADER_BYTES: usize =
    (3 + 5 + 5 + 4 + 3 * BL_CODES + 14 * (L_CODES + D_CODES)).div_ceil(8);

/// Largest number of header bits handed to the bit writer at once.
const HEADER_CHUNK_BITS: usize = 56;

/// An encoded block header. The final-block bit is left clear and is set when the header is written.
#[derive(Debug, Clone)]
pub(crate) struct BlockHeader {
    bytes: [u8; MAX_HEADER_BYTES + BIT_WRITER_MARGIN],
    bits: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct RleSymbol {
    symbol: u8,
    extra: u8,
}

impl RleSymbol {
    fn extra_bits(self) -> u32 {
        match self.symbol {
            REP_3_6 => 2,
            REPZ_3_10 => 3,
            REPZ_11_138 => 7,
            _ => 0,
        }
    }
}

impl BlockHeader {
    pub(crate) fn fixed() -> Self {
        let mut bytes = [0; MAX_HEADER_BYTES + BIT_WRITER_MARGIN];
        bytes[0] = 0b010;

        Self { bytes, bits: 3 }
    }

    pub(crate) fn dynamic(
        lit_len: &[HuffCode; L_CODES],
        dist: &[HuffCode; D_CODES],
    ) -> Result<Self, DeflateError> {
        let hlit = lit_len
            .iter()
            .rposition(|c| !c.is_empty())
            .map_or(0, |i| i + 1)
            .max(LITERALS + 1);
        let hdist = dist
            .iter()
            .rposition(|c| !c.is_empty())
            .map_or(0, |i| i + 1)
            .max(1);

        let mut lengths = [0u8; L_CODES + D_CODES];
        for (dst, code) in lengths.iter_mut().zip(&lit_len[..hlit]) {
            *dst = code.len();
        }
        for (dst, code) in lengths[hlit..].iter_mut().zip(&dist[..hdist]) {
            *dst = code.len();
        }

        let mut rle = [RleSymbol::default(); L_CODES + D_CODES];
        let rle_len = run_length_encode(&lengths[..hlit + hdist], &mut rle);
        let rle = &rle[..rle_len];

        let mut bl_freq = [0u64; BL_CODES];
        for entry in rle {
            bl_freq[entry.symbol as usize] += 1;
        }

        let mut bl_codes = [HuffCode::default(); BL_CODES];
        build_code(&bl_freq, MAX_BL_BITS, &mut bl_codes)
            .map_err(|_| DeflateError::InvalidHuffmanCode)?;

        // at least 4 code-length code lengths are always sent
        let hclen = BL_ORDER
            .iter()
            .rposition(|&symbol| !bl_codes[symbol as usize].is_empty())
            .map_or(0, |i| i + 1)
            .max(4);

        let mut bytes = [0; MAX_HEADER_BYTES + BIT_WRITER_MARGIN];
        let mut writer = BitWriter::new(&mut bytes, PendingBits::default());

        writer.write(0b100, 3);
        writer.write((hlit - 257) as u64, 5);
        writer.write((hdist - 1) as u64, 5);
        writer.write((hclen - 4) as u64, 4);

        for &symbol in &BL_ORDER[..hclen] {
            writer.write(bl_codes[symbol as usize].len() as u64, 3);
        }

        for entry in rle {
            let code = bl_codes[entry.symbol as usize];
            writer.write(code.code() as u64, code.len() as u32);
            writer.write(entry.extra as u64, entry.extra_bits());
        }

        let bits = 8 * writer.bytes_written() + writer.pending_count() as usize;
        writer.flush();

        trace!("dynamic header: hlit {hlit} hdist {hdist} hclen {hclen}, {bits} bits");

        Ok(Self { bytes, bits })
    }

    /// Length in bits, including the three block type bits.
    pub(crate) fn bit_len(&self) -> usize {
        self.bits
    }

    /// The (at most 56) header bits starting at bit `pos`.
    pub(crate) fn chunk(&self, pos: usize, last: bool) -> (u64, u32) {
        debug_assert!(pos < self.bits);

        let n = Ord::min(HEADER_CHUNK_BITS, self.bits - pos);
        let mut word = [0u8; 8];
        word.copy_from_slice(&self.bytes[pos / 8..][..8]);

        let mut value = (u64::from_le_bytes(word) >> (pos % 8)) & ((1 << n) - 1);
        if pos == 0 && last {
            value |= 1;
        }

        (value, n as u32)
    }

    /// Write the whole header at once. The writer must have room for it.
    pub(crate) fn write_all(&self, writer: &mut BitWriter, last: bool) {
        let mut pos = 0;
        while pos < self.bits {
            let (value, n) = self.chunk(pos, last);
            writer.write(value, n);
            pos += n as usize;
        }
    }
}

fn run_length_encode(lengths: &[u8], out: &mut [RleSymbol]) -> usize {
    let mut n = 0;
    let mut push = |symbol: u8, extra: u8| {
        out[n] = RleSymbol { symbol, extra };
        n += 1;
    };

    let mut i = 0;
    while i < lengths.len() {
        let len = lengths[i];
        let run = lengths[i..].iter().take_while(|&&l| l == len).count();
        i += run;

        let mut left = run;
        if len == 0 {
            while left >= 11 {
                let count = Ord::min(left, 138);
                push(REPZ_11_138, (count - 11) as u8);
                left -= count;
            }

            if left >= 3 {
                push(REPZ_3_10, (left - 3) as u8);
                left = 0;
            }
        } else {
            push(len, 0);
            left -= 1;

            while left >= 3 {
                let count = Ord::min(left, 6);
                push(REP_3_6, (count - 3) as u8);
                left -= count;
            }
        }

        for _ in 0..left {
            push(len, 0);
        }
    }

    n
}

/// Bits of a stored block header: 3 type bits, at most 7 bits of padding, LEN and NLEN.
pub(crate) const STORED_HEADER_MAX_BITS: usize = 3 + 7 + 32;

/// Block type bits, padding to a byte boundary, then LEN and NLEN.
pub(crate) fn write_stored_header(writer: &mut BitWriter, last: bool, len: u16) {
    writer.write(last as u64, 3);
    writer.flush();
    writer.write(len as u64 | (!len as u64) << 16, 32);
}
