use super::tables::STD_MAX_MATCH;

/// Length of the common prefix of `src0` and `src1`, at most 258 bytes.
///
/// Compares 8 bytes at a time; the position of the first differing byte is found from the trailing
/// zeros of the xor of two words.
#[inline]
pub(crate) fn compare258(src0: &[u8], src1: &[u8]) -> usize {
    let limit = Ord::min(STD_MAX_MATCH, Ord::min(src0.len(), src1.len()));
    let (src0, src1) = (&src0[..limit], &src1[..limit]);

    let mut len = 0;

    for (a, b) in src0.chunks_exact(8).zip(src1.chunks_exact(8)) {
        let a = u64::from_le_bytes(a.try_into().unwrap_or_default());
        let b = u64::from_le_bytes(b.try_into().unwrap_or_default());

        let diff = a ^ b;
        if diff != 0 {
            return len + (diff.trailing_zeros() / 8) as usize;
        }

        len += 8;
    }

    len + src0[len..]
        .iter()
        .zip(&src1[len..])
        .take_while(|(x, y)| x == y)
        .count()
}
