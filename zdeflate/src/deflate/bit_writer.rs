/// Bytes past the logical end of an output buffer that a single burst may touch.
pub(crate) const BIT_WRITER_MARGIN: usize = 8;

/// Bits that did not yet make a whole byte when a [`BitWriter`] was finished.
///
/// Stored in the stream state between calls so the next writer continues where the last one
/// stopped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingBits {
    bits: u64,
    count: u8,
}

#[cfg(test)]
impl PendingBits {
    pub(crate) fn is_aligned(&self) -> bool {
        self.count == 0
    }

    pub(crate) fn count(&self) -> u8 {
        self.count
    }
}

pub(crate) struct BitWriter<'a> {
    buf: &'a mut [u8],
    /// next byte to write
    out: usize,
    /// `buf.len() - BIT_WRITER_MARGIN`, or 0 for very small buffers
    end: usize,
    bits: u64,
    count: u8,
}

impl<'a> BitWriter<'a> {
    pub(crate) fn new(buf: &'a mut [u8], pending: PendingBits) -> Self {
        debug_assert!(pending.count < 8);

        let end = buf.len().saturating_sub(BIT_WRITER_MARGIN);

        Self {
            buf,
            out: 0,
            end,
            bits: pending.bits,
            count: pending.count,
        }
    }

    /// True once the cursor passed the logical end. No code may be written in that case.
    #[inline(always)]
    pub(crate) fn is_full(&self) -> bool {
        self.out > self.end || self.buf.len() < BIT_WRITER_MARGIN
    }

    /// Bytes that can still be written with `write_bytes`.
    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.out
    }

    pub(crate) fn bytes_written(&self) -> usize {
        self.out
    }

    pub(crate) fn pending_count(&self) -> u8 {
        self.count
    }

    #[inline(always)]
    pub(crate) fn write(&mut self, code: u64, len: u32) {
        debug_assert!(len as usize + self.count as usize <= 64);
        debug_assert!(len == 64 || code >> len == 0, "code has bits above its length");

        if len == 0 {
            return;
        }

        self.bits |= code << self.count;
        let total = self.count as u32 + len;

        if total < 64 {
            self.count = total as u8;
            self.store();
        } else {
            // the bit buffer is completely full
            self.store_bytes(&self.bits.to_le_bytes());
            let overflow = total - 64;
            self.bits = code.checked_shr(len - overflow).unwrap_or(0);
            self.count = overflow as u8;
        }
    }

    /// Pad to a byte boundary and store everything that is left.
    pub(crate) fn flush(&mut self) {
        self.count = self.count.next_multiple_of(8);
        self.store();
        debug_assert_eq!(self.count, 0);
    }

    /// Copy whole bytes. The writer must be byte aligned.
    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        assert_eq!(self.count, 0, "raw bytes need a byte aligned writer");
        self.buf[self.out..][..bytes.len()].copy_from_slice(bytes);
        self.out += bytes.len();
    }

    /// Number of bytes written, and the bits that still have to be written by the next writer.
    pub(crate) fn finish(self) -> (usize, PendingBits) {
        let pending = PendingBits {
            bits: self.bits,
            count: self.count,
        };

        (self.out, pending)
    }

    #[inline(always)]
    fn store(&mut self) {
        let bytes = (self.count / 8) as usize;

        if self.out + 8 <= self.buf.len() {
            // the margin lets us store the whole word and only advance by the complete bytes
            self.buf[self.out..][..8].copy_from_slice(&self.bits.to_le_bytes());
        } else {
            self.buf[self.out..][..bytes].copy_from_slice(&self.bits.to_le_bytes()[..bytes]);
        }

        self.out += bytes;
        self.bits = self.bits.checked_shr(8 * bytes as u32).unwrap_or(0);
        self.count -= 8 * bytes as u8;
    }

    fn store_bytes(&mut self, bytes: &[u8; 8]) {
        self.buf[self.out..][..8].copy_from_slice(bytes);
        self.out += 8;
    }
}
