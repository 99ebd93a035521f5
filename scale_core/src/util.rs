use core::ops::{Shl, Shr};

use crate::big_unsigned::BigUnsigned;

/// Clear every bit below `position`, e.g. to find the network address of a value with `position` host bits.
pub fn align_to<T: Shl<usize, Output=T> + Shr<usize, Output=T>>(num: T, position: usize) -> T {
    if position == 0 {
        return num;
    }
    (num >> position) << position
}

/// A value with the lowest `bits` bits set, e.g. the host part of a prefix.
pub fn low_mask(bits: usize) -> BigUnsigned {
    if bits == 0 {
        BigUnsigned::ZERO
    } else {
        BigUnsigned::MAX.right_shift(BigUnsigned::BITS - bits.min(BigUnsigned::BITS))
    }
}

#[cfg(test)]
mod test {
    use crate::big_unsigned::BigUnsigned;
    use crate::util::{align_to, low_mask};

    #[test]
    fn test_align_to() {
        assert_eq!(align_to(0b1101011101011101110111011u32, 3), 0b1101011101011101110111000);
        assert_eq!(align_to(0b1101011101011101110111011u32, 9), 0b1101011101011101000000000);
        assert_eq!(align_to(BigUnsigned::from(0x0a00_00ffu32), 8), BigUnsigned::from(0x0a00_0000u32));
        assert_eq!(align_to(BigUnsigned::MAX, 0), BigUnsigned::MAX);
        assert_eq!(align_to(BigUnsigned::MAX, 128), BigUnsigned::ZERO);
    }

    #[test]
    fn test_low_mask() {
        assert_eq!(low_mask(0), BigUnsigned::ZERO);
        assert_eq!(low_mask(8), BigUnsigned::from(0xffu32));
        assert_eq!(low_mask(64), BigUnsigned::new(u64::MAX, 0));
        assert_eq!(low_mask(65), BigUnsigned::new(u64::MAX, 1));
        assert_eq!(low_mask(128), BigUnsigned::MAX);
    }
}
