use alloc::boxed::Box;
use alloc::vec;

/// Input bytes of a stateful stream: history that matches may refer back to, the bytes that are
/// being matched, and lookahead.
///
/// Positions are tracked both as indices into the buffer and as absolute stream offsets; the
/// buffer slides forward when it is full.
#[derive(Debug)]
pub(crate) struct Window {
    buf: Box<[u8]>,
    /// number of valid bytes
    filled: usize,
    /// bytes before this index have been handed to the matcher
    processed: usize,
    /// absolute stream offset of `buf[0]`
    base: u64,
}

impl Window {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity].into_boxed_slice(),
            filled: 0,
            processed: 0,
            base: 0,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.filled = 0;
        self.processed = 0;
        self.base = 0;
    }

    /// Returns a shared reference to the filled portion of the buffer.
    #[inline]
    pub(crate) fn filled(&self) -> &[u8] {
        &self.buf[..self.filled]
    }

    pub(crate) fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn processed(&self) -> usize {
        self.processed
    }

    pub(crate) fn base(&self) -> u64 {
        self.base
    }

    pub(crate) fn processed_abs(&self) -> u64 {
        self.base + self.processed as u64
    }

    pub(crate) fn filled_abs(&self) -> u64 {
        self.base + self.filled as u64
    }

    /// Bytes that were read but not yet processed.
    pub(crate) fn unprocessed(&self) -> usize {
        self.filled - self.processed
    }

    pub(crate) fn set_processed(&mut self, processed: usize) {
        debug_assert!(processed <= self.filled);
        self.processed = processed;
    }

    /// Bytes `[start, end)` given as absolute offsets. They must still be in the window.
    pub(crate) fn range_abs(&self, start: u64, end: u64) -> &[u8] {
        let start = (start - self.base) as usize;
        let end = (end - self.base) as usize;
        &self.buf[start..end]
    }

    /// Copy as much of `input` as fits, sliding out bytes before `keep_from` (absolute) when the
    /// buffer is full. Returns the number of bytes taken.
    pub(crate) fn read(&mut self, input: &[u8], keep_from: u64) -> usize {
        if self.filled == self.capacity() {
            self.slide(keep_from);
        }

        let n = Ord::min(input.len(), self.capacity() - self.filled);
        self.buf[self.filled..][..n].copy_from_slice(&input[..n]);
        self.filled += n;

        n
    }

    fn slide(&mut self, keep_from: u64) {
        let keep = keep_from.saturating_sub(self.base) as usize;
        let keep = Ord::min(keep, self.processed);
        if keep == 0 {
            return;
        }

        self.buf.copy_within(keep..self.filled, 0);
        self.filled -= keep;
        self.processed -= keep;
        self.base += keep as u64;

        trace!("slide window by {keep} bytes, base is now {}", self.base);
    }
}
