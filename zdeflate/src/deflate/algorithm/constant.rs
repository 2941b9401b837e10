//! Long runs of a single byte value skip the matcher: the records for one literal followed by
//! maximal copies at distance 1 are synthesized directly.

use crate::deflate::icf::IcfBuffer;
use crate::deflate::tables::{STD_MAX_MATCH, STD_MIN_MATCH};

/// Shortest input that is checked for a constant run.
pub(crate) const CONSTANT_RUN_MIN: usize = 4 * 1024;

/// The repeated byte if `data` is long enough and consists of a single value.
pub(crate) fn is_constant(data: &[u8]) -> Option<u8> {
    let (&first, rest) = data.split_first()?;

    if data.len() < CONSTANT_RUN_MIN {
        return None;
    }

    rest.iter().all(|&b| b == first).then_some(first)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ConstantRun {
    byte: u8,
    /// bytes not yet covered by records
    remaining: usize,
    /// the leading literal has been recorded
    started: bool,
}

impl ConstantRun {
    pub(crate) fn new(byte: u8, len: usize) -> Self {
        Self {
            byte,
            remaining: len,
            started: false,
        }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.remaining
    }

    /// Record the next part of the run into `icf`, covering at most `max_input` bytes.
    pub(crate) fn fill(&mut self, icf: &mut IcfBuffer, max_input: usize) {
        if !self.started && self.remaining > 0 {
            icf.push_literal(self.byte);
            self.remaining -= 1;
            self.started = true;
        }

        while self.remaining > 0 && !icf.records_full() && icf.covered() < max_input {
            if self.remaining >= STD_MIN_MATCH {
                let len = Ord::min(self.remaining, STD_MAX_MATCH);
                icf.push_copy(len, 1);
                self.remaining -= len;
            } else {
                icf.push_literal(self.byte);
                self.remaining -= 1;
            }
        }
    }
}
