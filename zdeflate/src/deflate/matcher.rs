use alloc::boxed::Box;
use alloc::vec;

use super::compare258::compare258;
use super::hash_calc::{Crc32HashCalc, HashCalc, StandardHashCalc};
use super::tables::STD_MAX_MATCH;

/// Receives the matcher's decisions, one symbol at a time.
pub(crate) trait SymbolSink {
    /// No symbol may be written once this returns true.
    fn is_full(&self) -> bool;
    fn literal(&mut self, byte: u8);
    fn copy(&mut self, len: usize, dist: usize);
}

/// Hash and compare routines, picked once per process for the running cpu.
#[derive(Debug)]
pub(crate) struct Kernels {
    pub(crate) hash_index: fn(u32, u32) -> usize,
    pub(crate) compare: fn(&[u8], &[u8]) -> usize,
}

static STANDARD_KERNELS: Kernels = Kernels {
    hash_index: StandardHashCalc::hash_index,
    compare: compare258,
};

static CRC32_KERNELS: Kernels = Kernels {
    hash_index: Crc32HashCalc::hash_index,
    compare: compare258,
};

impl Kernels {
    pub(crate) fn detect() -> &'static Self {
        if Crc32HashCalc::is_supported() {
            &CRC32_KERNELS
        } else {
            &STANDARD_KERNELS
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MatchParams {
    pub(crate) hash_bits: u8,
    /// shortest match that is emitted, 3 or 4
    pub(crate) min_match: u8,
    /// candidates examined per position; 1 disables the chain
    pub(crate) max_chain: u16,
    /// only hash the first few positions inside a match
    pub(crate) limit_hash_update: bool,
}

/// 3-byte matches further away than this cost more than their literals.
const TOO_FAR: usize = 4096;

/// positions inside a match that are hashed when `limit_hash_update` is set
const HASH_UPDATE_LIMIT: usize = 3;

/// bytes needed to compute a hash
const HASH_BYTES: usize = 4;

const PREV_SIZE: usize = 1 << 15;

/// Greedy LZ77 match finder over a hash table of absolute stream positions.
#[derive(Debug)]
pub(crate) struct Matcher {
    head: Box<[u32]>,
    prev: Box<[u32]>,
    params: MatchParams,
    max_dist: usize,
    /// no match may reach back before this absolute offset
    floor: u64,
    kernels: &'static Kernels,
}

/// Bytes the matcher may read, and the absolute stream offset of `data[0]`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MatchInput<'a> {
    pub(crate) data: &'a [u8],
    pub(crate) base: u64,
}

impl Matcher {
    pub(crate) fn new(params: MatchParams, window_bits: u32) -> Self {
        let prev_size = if params.max_chain > 1 { PREV_SIZE } else { 0 };

        Self {
            head: vec![0; 1 << params.hash_bits].into_boxed_slice(),
            prev: vec![0; prev_size].into_boxed_slice(),
            params,
            max_dist: 1 << window_bits,
            floor: 0,
            kernels: Kernels::detect(),
        }
    }

    /// Forget all history; matches only reach back as far as `floor`.
    pub(crate) fn reset(&mut self, floor: u64) {
        self.head.fill(0);
        self.prev.fill(0);
        self.floor = floor;
    }

    /// Emit symbols for the positions `*pos..end` of `input.data`. Matches may extend past `end`
    /// up to the end of the data.
    ///
    /// Returns false when the sink filled up before `end` was reached.
    pub(crate) fn run<S: SymbolSink>(
        &mut self,
        input: MatchInput,
        pos: &mut usize,
        end: usize,
        sink: &mut S,
    ) -> bool {
        let data = input.data;
        debug_assert!(end <= data.len());

        let mut p = *pos;
        while p < end {
            if sink.is_full() {
                *pos = p;
                return false;
            }

            if p + HASH_BYTES > data.len() {
                sink.literal(data[p]);
                p += 1;
                continue;
            }

            let (len, dist) = self.longest_match(input, p);
            if len >= self.params.min_match as usize {
                sink.copy(len, dist);

                let mut update_end = p + len;
                if self.params.limit_hash_update {
                    update_end = Ord::min(update_end, p + 1 + HASH_UPDATE_LIMIT);
                }
                self.insert_range(input, p + 1, update_end);

                p += len;
            } else {
                sink.literal(data[p]);
                p += 1;
            }
        }

        *pos = p;
        true
    }

    #[inline(always)]
    fn hash_at(&self, data: &[u8], p: usize) -> usize {
        let mut bytes = [0u8; HASH_BYTES];
        bytes.copy_from_slice(&data[p..][..HASH_BYTES]);

        let mut val = u32::from_le_bytes(bytes);
        if self.params.min_match == 3 {
            val &= 0x00ff_ffff;
        }

        (self.kernels.hash_index)(val, self.params.hash_bits as u32)
    }

    #[inline(always)]
    fn insert(&mut self, h: usize, abs: u64) -> u32 {
        let candidate = self.head[h];
        self.head[h] = abs as u32;
        if !self.prev.is_empty() {
            self.prev[abs as usize & (PREV_SIZE - 1)] = candidate;
        }

        candidate
    }

    fn insert_range(&mut self, input: MatchInput, start: usize, end: usize) {
        let end = Ord::min(end, (input.data.len() + 1).saturating_sub(HASH_BYTES));

        for q in start..end {
            let h = self.hash_at(input.data, q);
            self.insert(h, input.base + q as u64);
        }
    }

    fn longest_match(&mut self, input: MatchInput, p: usize) -> (usize, usize) {
        let data = input.data;
        let abs = input.base + p as u64;

        let h = self.hash_at(data, p);
        let mut candidate = self.insert(h, abs);

        let reach = abs - Ord::max(self.floor, input.base);
        let limit = Ord::min(self.max_dist as u64, reach) as usize;

        let mut best = (0, 0);
        let mut chain = self.params.max_chain;

        loop {
            let dist = (abs as u32).wrapping_sub(candidate) as usize;
            if dist == 0 || dist > limit {
                break;
            }

            let len = (self.kernels.compare)(&data[p..], &data[p - dist..]);
            let worthwhile = len > 3 || dist <= TOO_FAR;
            if len > best.0 && worthwhile {
                best = (len, dist);
                if len == STD_MAX_MATCH {
                    break;
                }
            }

            chain -= 1;
            if chain == 0 || self.prev.is_empty() {
                break;
            }

            let next = self.prev[candidate as usize & (PREV_SIZE - 1)];
            // slots are reused after PREV_SIZE positions; only follow links that go back in time
            if (abs as u32).wrapping_sub(next) as usize <= dist {
                break;
            }
            candidate = next;
        }

        best
    }
}
