//! The intermediate format: literals and matches recorded as fixed-width records, so that the
//! Huffman codes of a block can be derived from the block's own symbol frequencies.

use alloc::vec::Vec;

use super::matcher::SymbolSink;
use super::tables::{dist_symbol, length_symbol, Histogram, HuffTables, END_BLOCK, LITERALS};

/// `lit_len:9 | dist_code:5 | len_extra:5 | dist_extra:13`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub(crate) struct IcfRecord(u32);

impl IcfRecord {
    const DIST_CODE_SHIFT: u32 = 9;
    const LEN_EXTRA_SHIFT: u32 = 14;
    const DIST_EXTRA_SHIFT: u32 = 19;

    /// distance code of a literal
    const NO_DIST: u32 = 0x1f;

    pub(crate) const fn literal(byte: u8) -> Self {
        Self(byte as u32 | Self::NO_DIST << Self::DIST_CODE_SHIFT)
    }

    #[inline(always)]
    pub(crate) fn copy(len: usize, dist: usize) -> Self {
        let (len_code, len_extra, _) = length_symbol(len);
        let (dist_code, dist_extra, _) = dist_symbol(dist);

        Self::from_parts(LITERALS + 1 + len_code, dist_code, len_extra, dist_extra)
    }

    fn from_parts(lit_len: usize, dist_code: usize, len_extra: u32, dist_extra: u32) -> Self {
        Self(
            lit_len as u32
                | (dist_code as u32) << Self::DIST_CODE_SHIFT
                | len_extra << Self::LEN_EXTRA_SHIFT
                | dist_extra << Self::DIST_EXTRA_SHIFT,
        )
    }

    pub(crate) fn lit_len(self) -> usize {
        (self.0 & 0x1ff) as usize
    }

    pub(crate) fn dist_code(self) -> Option<usize> {
        match (self.0 >> Self::DIST_CODE_SHIFT) & 0x1f {
            Self::NO_DIST => None,
            code => Some(code as usize),
        }
    }

    pub(crate) fn len_extra(self) -> u32 {
        (self.0 >> Self::LEN_EXTRA_SHIFT) & 0x1f
    }

    pub(crate) fn dist_extra(self) -> u32 {
        self.0 >> Self::DIST_EXTRA_SHIFT
    }

    /// The bits of this record under `tables`, as a single burst.
    #[inline(always)]
    pub(crate) fn encode(self, tables: &HuffTables) -> (u64, u32) {
        match self.dist_code() {
            None => {
                let code = tables.lit_len[self.lit_len()];
                (code.code() as u64, code.len() as u32)
            }
            Some(dist_code) => tables.copy(
                self.lit_len() - (LITERALS + 1),
                self.len_extra(),
                dist_code,
                self.dist_extra(),
            ),
        }
    }
}

/// Records of the block that is being collected, and their frequencies.
#[derive(Debug)]
pub(crate) struct IcfBuffer {
    records: Vec<IcfRecord>,
    capacity: usize,
    histogram: Histogram,
    /// input bytes covered by the records
    covered: usize,
    /// next record to entropy code
    cursor: usize,
}

impl IcfBuffer {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            capacity,
            histogram: Histogram::new(),
            covered: 0,
            cursor: 0,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
        self.histogram.clear();
        self.covered = 0;
        self.cursor = 0;
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn covered(&self) -> usize {
        self.covered
    }

    pub(crate) fn records_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    #[inline(always)]
    pub(crate) fn push_literal(&mut self, byte: u8) {
        debug_assert!(!self.records_full());

        self.records.push(IcfRecord::literal(byte));
        self.histogram.add_literal(byte);
        self.covered += 1;
    }

    #[inline(always)]
    pub(crate) fn push_copy(&mut self, len: usize, dist: usize) {
        debug_assert!(!self.records_full());

        let record = IcfRecord::copy(len, dist);
        self.records.push(record);
        self.histogram.lit_len[record.lit_len()] += 1;
        if let Some(dist_code) = record.dist_code() {
            self.histogram.dist[dist_code] += 1;
        }
        self.covered += len;
    }

    /// Symbol frequencies of the block, including its END_BLOCK.
    pub(crate) fn block_histogram(&self) -> Histogram {
        let mut histogram = self.histogram.clone();
        histogram.lit_len[END_BLOCK] += 1;
        histogram
    }

    /// Records that still have to be entropy coded.
    pub(crate) fn pending(&self) -> &[IcfRecord] {
        &self.records[self.cursor..]
    }

    pub(crate) fn consume(&mut self, n: usize) {
        self.cursor += n;
        debug_assert!(self.cursor <= self.records.len());
    }
}

/// Collects the matcher's decisions into an [`IcfBuffer`], up to a number of input bytes.
pub(crate) struct IcfSink<'a> {
    pub(crate) buffer: &'a mut IcfBuffer,
    pub(crate) max_input: usize,
}

impl SymbolSink for IcfSink<'_> {
    #[inline(always)]
    fn is_full(&self) -> bool {
        self.buffer.records_full() || self.buffer.covered >= self.max_input
    }

    #[inline(always)]
    fn literal(&mut self, byte: u8) {
        self.buffer.push_literal(byte)
    }

    #[inline(always)]
    fn copy(&mut self, len: usize, dist: usize) {
        self.buffer.push_copy(len, dist)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn literal_record() {
        let record = IcfRecord::literal(b'x');
        assert_eq!(record.lit_len(), b'x' as usize);
        assert_eq!(record.dist_code(), None);
    }

    #[test]
    fn copy_record() {
        let record = IcfRecord::copy(12, 6);
        assert_eq!(record.lit_len(), 265);
        assert_eq!(record.len_extra(), 1);
        assert_eq!(record.dist_code(), Some(4));
        assert_eq!(record.dist_extra(), 1);

        let record = IcfRecord::copy(258, 32768);
        assert_eq!(record.lit_len(), 285);
        assert_eq!(record.len_extra(), 0);
        assert_eq!(record.dist_code(), Some(29));
        assert_eq!(record.dist_extra(), 8191);

        let record = IcfRecord::copy(257, 1);
        assert_eq!(record.lit_len(), 284);
        assert_eq!(record.len_extra(), 30);
        assert_eq!(record.dist_code(), Some(0));
    }

    #[test]
    fn encode_matches_direct_emission() {
        let tables = HuffTables::fixed();

        let (bits, count) = IcfRecord::copy(12, 6).encode(&tables);
        assert_eq!((bits, count), tables.copy(8, 1, 4, 1));

        let (bits, count) = IcfRecord::literal(0).encode(&tables);
        assert_eq!((bits, count), tables.literal(0));
    }

    #[test]
    fn buffer_counts_symbols() {
        let mut buffer = IcfBuffer::new(4);
        buffer.push_literal(b'a');
        buffer.push_literal(b'a');
        buffer.push_copy(3, 1);

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.covered(), 5);
        assert!(!buffer.records_full());

        let histogram = buffer.block_histogram();
        assert_eq!(histogram.lit_len[b'a' as usize], 2);
        assert_eq!(histogram.lit_len[257], 1);
        assert_eq!(histogram.lit_len[END_BLOCK], 1);
        assert_eq!(histogram.dist[0], 1);

        buffer.consume(2);
        assert_eq!(buffer.pending().len(), 1);

        buffer.push_literal(b'b');
        assert!(buffer.records_full());

        buffer.clear();
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.pending().len(), 0);
    }

    #[test]
    fn sink_stops_at_input_limit() {
        let mut buffer = IcfBuffer::new(100);
        let mut sink = IcfSink {
            buffer: &mut buffer,
            max_input: 10,
        };

        sink.copy(9, 1);
        assert!(!sink.is_full());
        sink.literal(0);
        assert!(sink.is_full());
    }
}
