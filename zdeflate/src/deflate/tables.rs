use crate::DeflateError;

use super::header::BlockHeader;
use super::huffman::{build_code, codes_from_lengths};

pub(crate) const LITERALS: usize = 256;
pub(crate) const END_BLOCK: usize = 256;

/// number of length codes, not counting the special END_BLOCK code
pub(crate) const LENGTH_CODES: usize = 29;

/// number of literal/length codes, including the END_BLOCK code
pub(crate) const L_CODES: usize = LITERALS + 1 + LENGTH_CODES;

/// number of distance codes
pub(crate) const D_CODES: usize = 30;

/// number of codes used to transfer the bit lengths
pub(crate) const BL_CODES: usize = 19;

/// All codes must not exceed MAX_BITS bits
pub(crate) const MAX_BITS: usize = 15;

/// Bit length codes must not exceed MAX_BL_BITS bits
pub(crate) const MAX_BL_BITS: u8 = 7;

/// Literal/length codes of generated tables stay below this, so that a whole match fits one write.
pub(crate) const MAX_SAFE_LIT_BITS: u8 = 13;
pub(crate) const MAX_SAFE_DIST_BITS: u8 = 12;

pub(crate) const STD_MIN_MATCH: usize = 3;
pub(crate) const STD_MAX_MATCH: usize = 258;

pub(crate) const BASE_LENGTH: [u16; LENGTH_CODES] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

pub(crate) const EXTRA_LBITS: [u8; LENGTH_CODES] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

pub(crate) const BASE_DIST: [u16; D_CODES] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

pub(crate) const EXTRA_DBITS: [u8; D_CODES] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// length code index (0..29) for each match length (3..=258)
pub(crate) const LENGTH_CODE: [u8; STD_MAX_MATCH + 1] = length_code_table();

const fn length_code_table() -> [u8; STD_MAX_MATCH + 1] {
    let mut table = [0u8; STD_MAX_MATCH + 1];

    let mut code = 0;
    while code < LENGTH_CODES {
        let base = BASE_LENGTH[code] as usize;
        let mut n = 0;
        while n < (1 << EXTRA_LBITS[code]) && base + n <= STD_MAX_MATCH {
            table[base + n] = code as u8;
            n += 1;
        }
        code += 1;
    }

    table
}

/// Length code index, extra value and extra bit count for a match length.
#[inline(always)]
pub(crate) fn length_symbol(len: usize) -> (usize, u32, u32) {
    debug_assert!((STD_MIN_MATCH..=STD_MAX_MATCH).contains(&len));

    let code = LENGTH_CODE[len] as usize;
    let extra = (len - BASE_LENGTH[code] as usize) as u32;

    (code, extra, EXTRA_LBITS[code] as u32)
}

/// Distance code, extra value and extra bit count for a match distance.
///
/// Distances are banded by the highest set bit of `dist - 1`: each band holds two codes.
#[inline(always)]
pub(crate) fn dist_symbol(dist: usize) -> (usize, u32, u32) {
    debug_assert!((1..=32768).contains(&dist));

    let d = (dist - 1) as u32;
    if d < 4 {
        return (d as usize, 0, 0);
    }

    let top = u32::BITS - 1 - d.leading_zeros();
    let extra_bits = top - 1;
    let code = 2 * top + ((d >> extra_bits) & 1);

    (code as usize, d & ((1 << extra_bits) - 1), extra_bits)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HuffCode {
    code: u16,
    len: u8,
}

impl HuffCode {
    pub(crate) const fn new(code: u16, len: u8) -> Self {
        Self { code, len }
    }

    /// The bit-reversed code, ready to be written lsb first.
    pub fn code(self) -> u16 {
        self.code
    }

    pub fn len(self) -> u8 {
        self.len
    }

    pub fn is_empty(self) -> bool {
        self.len == 0
    }
}

/// Literal/length and distance symbol frequencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    pub(crate) lit_len: [u64; L_CODES],
    pub(crate) dist: [u64; D_CODES],
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    pub const fn new() -> Self {
        Self {
            lit_len: [0; L_CODES],
            dist: [0; D_CODES],
        }
    }

    pub fn lit_len(&self) -> &[u64; L_CODES] {
        &self.lit_len
    }

    pub fn dist(&self) -> &[u64; D_CODES] {
        &self.dist
    }

    pub(crate) fn clear(&mut self) {
        self.lit_len.fill(0);
        self.dist.fill(0);
    }

    #[inline(always)]
    pub(crate) fn add_literal(&mut self, byte: u8) {
        self.lit_len[byte as usize] += 1;
    }

    #[inline(always)]
    pub(crate) fn add_copy(&mut self, len_code: usize, dist_code: usize) {
        self.lit_len[LITERALS + 1 + len_code] += 1;
        self.dist[dist_code] += 1;
    }

    /// A rough model of text-heavy data, used for the default table of the fastest level.
    pub(crate) fn builtin() -> Self {
        let mut histogram = Self::new();

        for (byte, freq) in histogram.lit_len[..LITERALS].iter_mut().enumerate() {
            *freq = match byte as u8 {
                b' ' => 180,
                b'e' | b't' | b'a' | b'o' | b'i' | b'n' | b's' | b'r' => 90,
                b'a'..=b'z' => 40,
                b'A'..=b'Z' | b'0'..=b'9' => 20,
                b'\n' | b'.' | b',' | b'"' | b'<' | b'>' | b'/' | b'=' => 16,
                0x21..=0x7e => 8,
                0 => 24,
                0xff => 8,
                _ => 3,
            };
        }

        histogram.lit_len[END_BLOCK] = 1;

        for (code, freq) in histogram.lit_len[LITERALS + 1..].iter_mut().enumerate() {
            *freq = Ord::max(320 >> (code / 2), 2);
        }

        for (code, freq) in histogram.dist.iter_mut().enumerate() {
            *freq = 40u64.saturating_sub(code as u64) + 4 * (code as u64 % 2);
        }

        histogram
    }
}

/// Huffman codes for one block, together with the encoded block header that announces them.
#[derive(Debug, Clone)]
pub struct HuffTables {
    pub(crate) lit_len: [HuffCode; L_CODES],
    pub(crate) dist: [HuffCode; D_CODES],
    pub(crate) header: BlockHeader,
}

impl HuffTables {
    /// The fixed codes of RFC 1951 section 3.2.6.
    pub fn fixed() -> Self {
        let mut lit_lengths = [0u8; L_CODES + 2];
        lit_lengths[..144].fill(8);
        lit_lengths[144..256].fill(9);
        lit_lengths[256..280].fill(7);
        lit_lengths[280..].fill(8);

        // symbols 286 and 287 take part in the code assignment but can't be used
        let mut lit_codes = [HuffCode::default(); L_CODES + 2];
        codes_from_lengths(&lit_lengths, &mut lit_codes);

        let mut lit_len = [HuffCode::default(); L_CODES];
        lit_len.copy_from_slice(&lit_codes[..L_CODES]);

        let mut dist = [HuffCode::default(); D_CODES];
        codes_from_lengths(&[5; D_CODES], &mut dist);

        Self {
            lit_len,
            dist,
            header: BlockHeader::fixed(),
        }
    }

    /// Tables that can encode any input, weighted by `histogram`.
    ///
    /// Every symbol gets a code, even the ones that did not occur in the histogram, so the result
    /// can be used for data that was never sampled.
    pub fn from_histogram(histogram: &Histogram) -> Result<Self, DeflateError> {
        let mut complete = histogram.clone();
        for freq in complete.lit_len.iter_mut().chain(complete.dist.iter_mut()) {
            *freq = freq.saturating_add(1);
        }

        Self::for_block(&complete)
    }

    /// Tables for exactly the symbols used by a block. The histogram must count END_BLOCK.
    pub(crate) fn for_block(histogram: &Histogram) -> Result<Self, DeflateError> {
        let mut lit_len = [HuffCode::default(); L_CODES];
        let mut dist = [HuffCode::default(); D_CODES];

        build_code(&histogram.lit_len, MAX_SAFE_LIT_BITS, &mut lit_len)
            .map_err(|_| DeflateError::InvalidLiteralHuffmanCode)?;
        build_code(&histogram.dist, MAX_SAFE_DIST_BITS, &mut dist)
            .map_err(|_| DeflateError::InvalidDistanceHuffmanCode)?;

        let header = BlockHeader::dynamic(&lit_len, &dist)?;

        Ok(Self {
            lit_len,
            dist,
            header,
        })
    }

    /// The table used by the fastest level when the caller did not install one.
    pub(crate) fn builtin() -> Self {
        match Self::from_histogram(&Histogram::builtin()) {
            Ok(tables) => tables,
            Err(error) => {
                trace!("builtin table failed to build ({error}), using the fixed codes");
                Self::fixed()
            }
        }
    }

    pub fn lit_len(&self) -> &[HuffCode; L_CODES] {
        &self.lit_len
    }

    pub fn dist(&self) -> &[HuffCode; D_CODES] {
        &self.dist
    }

    /// Size of the block header in bits, including the 3 block type bits.
    pub fn header_bits(&self) -> usize {
        self.header.bit_len()
    }

    /// True if every symbol has a code, so any data can be encoded with these tables.
    pub fn is_complete(&self) -> bool {
        self.lit_len.iter().chain(self.dist.iter()).all(|c| !c.is_empty())
    }

    #[inline(always)]
    pub(crate) fn literal(&self, byte: u8) -> (u64, u32) {
        let code = self.lit_len[byte as usize];
        (code.code as u64, code.len as u32)
    }

    #[inline(always)]
    pub(crate) fn end_of_block(&self) -> (u64, u32) {
        let code = self.lit_len[END_BLOCK];
        (code.code as u64, code.len as u32)
    }

    /// Length code, length extra bits, distance code and distance extra bits, as one burst.
    #[inline(always)]
    pub(crate) fn copy(
        &self,
        len_code: usize,
        len_extra: u32,
        dist_code: usize,
        dist_extra: u32,
    ) -> (u64, u32) {
        let lcode = self.lit_len[LITERALS + 1 + len_code];
        let mut bits = lcode.code as u64;
        let mut count = lcode.len as u32;

        bits |= (len_extra as u64) << count;
        count += EXTRA_LBITS[len_code] as u32;

        let dcode = self.dist[dist_code];
        bits |= (dcode.code as u64) << count;
        count += dcode.len as u32;

        bits |= (dist_extra as u64) << count;
        count += EXTRA_DBITS[dist_code] as u32;

        (bits, count)
    }

    /// Bits needed to encode the symbols counted in `histogram`, excluding the header.
    ///
    /// `None` when the histogram uses a symbol without a code.
    pub(crate) fn body_bits(&self, histogram: &Histogram) -> Option<u64> {
        let mut bits = 0u64;

        for (symbol, &freq) in histogram.lit_len.iter().enumerate() {
            if freq == 0 {
                continue;
            }

            let code = self.lit_len[symbol];
            if code.is_empty() {
                return None;
            }

            let extra = match symbol.checked_sub(LITERALS + 1) {
                Some(len_code) => EXTRA_LBITS[len_code] as u64,
                None => 0,
            };

            bits += freq * (code.len as u64 + extra);
        }

        for (symbol, &freq) in histogram.dist.iter().enumerate() {
            if freq == 0 {
                continue;
            }

            let code = self.dist[symbol];
            if code.is_empty() {
                return None;
            }

            bits += freq * (code.len as u64 + EXTRA_DBITS[symbol] as u64);
        }

        Some(bits)
    }
}
