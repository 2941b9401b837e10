/// Hash of the (little-endian) first bytes at a position. Table indices are taken from the top
/// bits of the result.
pub(crate) trait HashCalc {
    fn hash_calc(val: u32) -> u32;

    #[inline(always)]
    fn hash_index(val: u32, hash_bits: u32) -> usize {
        (Self::hash_calc(val) >> (u32::BITS - hash_bits)) as usize
    }
}

pub(crate) struct StandardHashCalc;

impl HashCalc for StandardHashCalc {
    #[inline(always)]
    fn hash_calc(val: u32) -> u32 {
        val.wrapping_mul(2654435761)
    }
}

pub(crate) struct Crc32HashCalc;

impl Crc32HashCalc {
    pub(crate) fn is_supported() -> bool {
        #[cfg(all(feature = "std", target_arch = "x86_64"))]
        return std::is_x86_feature_detected!("sse4.2");

        #[allow(unreachable_code)]
        false
    }
}

impl HashCalc for Crc32HashCalc {
    #[cfg(target_arch = "x86_64")]
    #[inline(always)]
    fn hash_calc(val: u32) -> u32 {
        #[target_feature(enable = "sse4.2")]
        unsafe fn crc32(val: u32) -> u32 {
            core::arch::x86_64::_mm_crc32_u32(0, val)
        }

        // SAFETY: only selected after `is_supported` confirmed sse4.2
        unsafe { crc32(val) }
    }

    #[cfg(not(target_arch = "x86_64"))]
    fn hash_calc(val: u32) -> u32 {
        StandardHashCalc::hash_calc(val)
    }
}
