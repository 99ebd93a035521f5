use core::cmp::Ordering;
use core::ops::{Shl, Shr};

/// A 128-bit unsigned integer built from two 64-bit words with explicit carry/borrow propagation.
///
/// The `low` word holds bits 0-63 and the `high` word holds bits 64-127.
/// Addition wraps at 2^128 but always reports the carry-out through [BigUnsigned::overflowing_add],
/// subtraction saturates at zero instead of wrapping.
///
/// ```
/// # use scale_core::big_unsigned::BigUnsigned;
/// let x = BigUnsigned::new(u64::MAX, 0);
/// let y = x.add(BigUnsigned::ONE);
/// assert_eq!(y.low(), 0);
/// assert_eq!(y.high(), 1);
/// // Underflow clamps to zero
/// assert_eq!(BigUnsigned::ONE.saturating_sub(y), BigUnsigned::ZERO);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BigUnsigned {
    low: u64,
    high: u64,
}
impl BigUnsigned {
    pub const BITS: usize = 128;
    pub const ZERO: Self = Self::new(0, 0);
    pub const ONE: Self = Self::new(1, 0);
    pub const MAX: Self = Self::new(u64::MAX, u64::MAX);

    pub const fn new(low: u64, high: u64) -> Self {
        Self { low, high }
    }

    pub const fn from_u128(value: u128) -> Self {
        Self::new(value as u64, (value >> 64) as u64)
    }

    pub const fn to_u128(self) -> u128 {
        ((self.high as u128) << 64) | (self.low as u128)
    }

    pub const fn low(&self) -> u64 {
        self.low
    }
    pub const fn high(&self) -> u64 {
        self.high
    }
    pub const fn is_zero(&self) -> bool {
        self.low == 0 && self.high == 0
    }

    /// Add two values, returning the 128-bit wrapped sum and whether a carry left bit 127.
    ///
    /// ```
    /// # use scale_core::big_unsigned::BigUnsigned;
    /// assert_eq!(BigUnsigned::MAX.overflowing_add(BigUnsigned::ONE), (BigUnsigned::ZERO, true));
    /// assert_eq!(BigUnsigned::ONE.overflowing_add(BigUnsigned::ONE), (BigUnsigned::new(2, 0), false));
    /// ```
    pub const fn overflowing_add(self, rhs: Self) -> (Self, bool) {
        let (low, carry) = self.low.overflowing_add(rhs.low);
        let (high, carry_a) = self.high.overflowing_add(rhs.high);
        let (high, carry_b) = high.overflowing_add(carry as u64);
        (Self::new(low, high), carry_a | carry_b)
    }

    /// Wrapping 128-bit addition. Callers near 2^128 must bound-check first or use [BigUnsigned::checked_add].
    pub const fn add(self, rhs: Self) -> Self {
        self.overflowing_add(rhs).0
    }

    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.overflowing_add(rhs) {
            (sum, false) => Some(sum),
            (_, true) => None,
        }
    }

    /// Subtract `rhs`, returning zero and `true` if the subtraction underflowed.
    ///
    /// ```
    /// # use scale_core::big_unsigned::BigUnsigned;
    /// let x = BigUnsigned::new(0, 1);
    /// assert_eq!(x.overflowing_sub(BigUnsigned::ONE), (BigUnsigned::new(u64::MAX, 0), false));
    /// assert_eq!(BigUnsigned::ONE.overflowing_sub(x), (BigUnsigned::ZERO, true));
    /// ```
    pub const fn overflowing_sub(self, rhs: Self) -> (Self, bool) {
        let (low, borrow) = self.low.overflowing_sub(rhs.low);
        let (high, borrow_a) = self.high.overflowing_sub(rhs.high);
        let (high, borrow_b) = high.overflowing_sub(borrow as u64);
        if borrow_a | borrow_b {
            (Self::ZERO, true)
        } else {
            (Self::new(low, high), false)
        }
    }

    /// Subtraction that clamps to zero on underflow.
    /// A zero result is ambiguous, compare the operands first if the difference matters.
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        self.overflowing_sub(rhs).0
    }

    /// Shift left by `n` bits. Bits shifted past bit 127 are lost, `n >= 128` yields zero.
    ///
    /// ```
    /// # use scale_core::big_unsigned::BigUnsigned;
    /// assert_eq!(BigUnsigned::new(0x80, 0).left_shift(60), BigUnsigned::new(0, 0x8));
    /// assert_eq!(BigUnsigned::new(0xff, 0).left_shift(64), BigUnsigned::new(0, 0xff));
    /// ```
    pub const fn left_shift(self, n: usize) -> Self {
        if n >= Self::BITS {
            Self::ZERO
        } else if n >= 64 {
            Self::new(0, self.low << (n - 64))
        } else if n == 0 {
            self
        } else {
            Self::new(self.low << n, (self.high << n) | (self.low >> (64 - n)))
        }
    }

    /// Shift right by `n` bits, `n >= 128` yields zero.
    ///
    /// ```
    /// # use scale_core::big_unsigned::BigUnsigned;
    /// assert_eq!(BigUnsigned::new(0, 0x8).right_shift(60), BigUnsigned::new(0x80, 0));
    /// assert_eq!(BigUnsigned::new(0, 0xff).right_shift(72), BigUnsigned::new(0, 0));
    /// ```
    pub const fn right_shift(self, n: usize) -> Self {
        if n >= Self::BITS {
            Self::ZERO
        } else if n >= 64 {
            Self::new(self.high >> (n - 64), 0)
        } else if n == 0 {
            self
        } else {
            Self::new((self.low >> n) | (self.high << (64 - n)), self.high >> n)
        }
    }

    /// The lowest 8 bits, used when packing a value back into address bytes.
    pub const fn low_byte(&self) -> u8 {
        (self.low & 0xFF) as u8
    }
}
impl Ord for BigUnsigned {
    fn cmp(&self, other: &Self) -> Ordering {
        self.high
            .cmp(&other.high)
            .then_with(|| self.low.cmp(&other.low))
    }
}
impl PartialOrd for BigUnsigned {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Shl<usize> for BigUnsigned {
    type Output = Self;

    fn shl(self, rhs: usize) -> Self {
        self.left_shift(rhs)
    }
}
impl Shr<usize> for BigUnsigned {
    type Output = Self;

    fn shr(self, rhs: usize) -> Self {
        self.right_shift(rhs)
    }
}
impl From<u128> for BigUnsigned {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}
impl From<u64> for BigUnsigned {
    fn from(value: u64) -> Self {
        Self::new(value, 0)
    }
}
impl From<u32> for BigUnsigned {
    fn from(value: u32) -> Self {
        Self::new(value as u64, 0)
    }
}
impl From<u8> for BigUnsigned {
    fn from(value: u8) -> Self {
        Self::new(value as u64, 0)
    }
}
impl From<BigUnsigned> for u128 {
    fn from(value: BigUnsigned) -> Self {
        value.to_u128()
    }
}
impl core::fmt::LowerHex for BigUnsigned {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::LowerHex::fmt(&self.to_u128(), f)
    }
}
impl core::fmt::Display for BigUnsigned {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.to_u128(), f)
    }
}
