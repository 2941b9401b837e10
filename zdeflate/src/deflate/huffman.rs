//! Length-limited canonical Huffman codes.
//!
//! The tree is built bottom-up over an index arena. Leaf depths are then counted with a walk that
//! visits the heavier child first, depths beyond the limit are folded back in while keeping the
//! code complete, and finally canonical codes are handed out per length.

use alloc::collections::BinaryHeap;
use alloc::vec::Vec;
use core::cmp::Reverse;

use super::tables::{HuffCode, MAX_BITS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CodeTooLong;

const NO_CHILD: u32 = u32::MAX;

#[derive(Debug, Clone, Copy)]
struct Node {
    freq: u64,
    left: u32,
    right: u32,
    /// symbol for a leaf
    value: u16,
}

impl Node {
    fn leaf(freq: u64, value: u16) -> Self {
        Self {
            freq,
            left: NO_CHILD,
            right: NO_CHILD,
            value,
        }
    }

    fn is_leaf(&self) -> bool {
        self.left == NO_CHILD
    }
}

/// Compute code lengths (at most `max_len`) for `freqs`, and the matching canonical codes.
///
/// Symbols with a zero frequency get no code, except that at least two symbols always get one so
/// that the code is complete. Returns the largest symbol with a code.
pub(crate) fn build_code(
    freqs: &[u64],
    max_len: u8,
    codes: &mut [HuffCode],
) -> Result<usize, CodeTooLong> {
    debug_assert_eq!(freqs.len(), codes.len());
    debug_assert!((1..=MAX_BITS as u8).contains(&max_len));

    let mut lengths = [0u8; 320];
    let lengths = &mut lengths[..freqs.len()];

    build_lengths(freqs, max_len, lengths)?;
    codes_from_lengths(lengths, codes);

    Ok(lengths.iter().rposition(|&len| len != 0).unwrap_or(0))
}

pub(crate) fn build_lengths(
    freqs: &[u64],
    max_len: u8,
    lengths: &mut [u8],
) -> Result<(), CodeTooLong> {
    lengths.fill(0);

    let mut arena: Vec<Node> = Vec::with_capacity(2 * freqs.len());
    let mut heap = BinaryHeap::with_capacity(freqs.len());

    for (symbol, &freq) in freqs.iter().enumerate() {
        if freq != 0 {
            heap.push(Reverse((freq, arena.len() as u32)));
            arena.push(Node::leaf(freq, symbol as u16));
        }
    }

    // a complete code needs at least two symbols
    let mut placeholder = 0;
    while arena.len() < 2 && placeholder < freqs.len() {
        if freqs[placeholder] == 0 {
            heap.push(Reverse((1, arena.len() as u32)));
            arena.push(Node::leaf(1, placeholder as u16));
        }
        placeholder += 1;
    }

    if arena.len() > 1 << max_len {
        return Err(CodeTooLong);
    }

    if arena.len() == 1 {
        // a single symbol alphabet
        lengths[arena[0].value as usize] = 1;
        return Ok(());
    }

    let leaves = arena.len();

    while let (Some(Reverse((a_freq, a))), Some(Reverse((b_freq, b)))) = (heap.pop(), heap.pop()) {
        let parent = Node {
            freq: a_freq.saturating_add(b_freq),
            left: a,
            right: b,
            value: 0,
        };

        let index = arena.len() as u32;
        arena.push(parent);

        if heap.is_empty() {
            break;
        }

        heap.push(Reverse((parent.freq, index)));
    }

    let root = arena.len() - 1;

    // leaves per depth; a tree over n leaves is never deeper than n - 1
    let mut depth_count = [0u32; 320];
    let mut max_depth = 0;

    let mut stack: Vec<(u32, usize)> = Vec::with_capacity(64);
    stack.push((root as u32, 0));

    while let Some((index, depth)) = stack.pop() {
        let node = arena[index as usize];

        if node.is_leaf() {
            depth_count[depth] += 1;
            max_depth = Ord::max(max_depth, depth);
            continue;
        }

        let (left, right) = (arena[node.left as usize], arena[node.right as usize]);
        let (heavy, light) = if left.freq >= right.freq {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        // the heavier child is popped, and therefore visited, first
        stack.push((light, depth + 1));
        stack.push((heavy, depth + 1));
    }

    let max_len = max_len as usize;

    // Two leaves at the deepest level become one leaf a level up and one leaf that pairs with
    // a leaf pulled down from the deepest level below the limit.
    while max_depth > max_len {
        let donor = (1..max_len).rev().find(|&d| depth_count[d] != 0);
        let Some(donor) = donor else {
            return Err(CodeTooLong);
        };

        depth_count[donor] -= 1;
        depth_count[donor + 1] += 2;
        depth_count[max_depth - 1] += 1;
        depth_count[max_depth] -= 2;

        while depth_count[max_depth] == 0 {
            max_depth -= 1;
        }
    }

    // heaviest symbols get the shortest codes
    let mut symbols: Vec<(u64, u16)> = arena[..leaves]
        .iter()
        .map(|node| (node.freq, node.value))
        .collect();
    symbols.sort_unstable_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    let mut symbols = symbols.into_iter();
    for (depth, &count) in depth_count.iter().enumerate().take(max_depth + 1) {
        for (_, symbol) in symbols.by_ref().take(count as usize) {
            lengths[symbol as usize] = depth as u8;
        }
    }

    Ok(())
}

/// Canonical codes for the given lengths, bit-reversed for the lsb-first bit writer.
pub(crate) fn codes_from_lengths(lengths: &[u8], codes: &mut [HuffCode]) {
    let mut bl_count = [0u16; MAX_BITS + 1];
    for &len in lengths {
        bl_count[len as usize] += 1;
    }
    bl_count[0] = 0;

    let mut next_code = [0u16; MAX_BITS + 1];
    let mut code = 0u16;
    for bits in 1..=MAX_BITS {
        code = (code + bl_count[bits - 1]) << 1;
        next_code[bits] = code;
    }

    for (len, huff) in lengths.iter().zip(codes.iter_mut()) {
        let len = *len;
        if len == 0 {
            *huff = HuffCode::default();
            continue;
        }

        let code = next_code[len as usize];
        next_code[len as usize] += 1;

        *huff = HuffCode::new(code.reverse_bits() >> (16 - len), len);
    }
}
