use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

/// Signed 128-bit accumulator: `hi · 2^64 + lo` with `lo` unsigned.
///
/// Holds exact sums of up to 2^63 `i64` addends (|sum| ≤ 2^126), so overflow
/// is impossible for the accumulation patterns in this crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Int128 {
    hi: i64,
    lo: u64,
}

impl From<i64> for Int128 {
    fn from(x: i64) -> Self {
        Self {
            hi: x >> 63,
            lo: x as u64,
        }
    }
}

impl Int128 {
    /// Zero.
    pub const fn new() -> Self {
        Self { hi: 0, lo: 0 }
    }

    /// Adds a signed 64-bit value, sign-extending into the high limb.
    pub fn add(&mut self, x: i64) {
        let (lo, carry) = self.lo.overflowing_add(x as u64);
        self.lo = lo;
        // `x >> 63` is the sign extension (0 or -1) of the addend
        self.hi = self.hi.wrapping_add(x >> 63).wrapping_add(i64::from(carry));
    }

    /// Adds another accumulator.
    pub fn add_wide(&mut self, other: &Self) {
        let (lo, carry) = self.lo.overflowing_add(other.lo);
        self.lo = lo;
        self.hi = self.hi.wrapping_add(other.hi).wrapping_add(i64::from(carry));
    }

    /// Exact value.
    pub fn to_i128(&self) -> i128 {
        (i128::from(self.hi) << 64) | i128::from(self.lo)
    }

    /// Correctly rounded conversion to the nearest `f64`.
    pub fn to_f64(&self) -> f64 {
        // Rust's native i128 -> f64 cast is IEEE round-half-even
        self.to_i128() as f64
    }

    /// Exact narrowing to `i64`.
    ///
    /// # Errors
    /// `ConvertError::Overflow` if the value does not fit.
    pub fn try_to_i64(&self) -> Result<i64, ConvertError> {
        i64::try_from(self.to_i128()).map_err(|_| ConvertError::Overflow)
    }

    /// Exact narrowing to `i32`.
    ///
    /// # Errors
    /// `ConvertError::Overflow` if the value does not fit.
    pub fn try_to_i32(&self) -> Result<i32, ConvertError> {
        i32::try_from(self.to_i128()).map_err(|_| ConvertError::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn add_matches_i128_reference() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let mut acc = Int128::new();
        let mut reference: i128 = 0;
        for _ in 0..10_000 {
            let x = rng.gen_range(i64::MIN..=i64::MAX);
            acc.add(x);
            reference += i128::from(x);
            assert_eq!(acc.to_i128(), reference);
        }
    }

    #[test]
    fn extremes_accumulate_exactly() {
        let mut acc = Int128::new();
        for _ in 0..4 {
            acc.add(i64::MAX);
        }
        assert_eq!(acc.to_i128(), 4 * i128::from(i64::MAX));
        for _ in 0..8 {
            acc.add(i64::MIN);
        }
        assert_eq!(
            acc.to_i128(),
            4 * i128::from(i64::MAX) + 8 * i128::from(i64::MIN)
        );
    }

    #[test]
    fn add_wide_merges_partials() {
        let mut a = Int128::new();
        let mut b = Int128::new();
        a.add(i64::MAX);
        a.add(i64::MAX);
        b.add(i64::MIN);
        b.add(-1);
        a.add_wide(&b);
        assert_eq!(
            a.to_i128(),
            2 * i128::from(i64::MAX) + i128::from(i64::MIN) - 1
        );
    }

    #[test]
    fn from_i64_sign_extends() {
        assert_eq!(Int128::from(-1).to_i128(), -1);
        assert_eq!(Int128::from(i64::MIN).to_i128(), i128::from(i64::MIN));
        assert_eq!(Int128::from(42).to_i128(), 42);
    }

    #[test]
    fn narrowing_signals_overflow() {
        let mut acc = Int128::new();
        acc.add(i64::MAX);
        assert_eq!(acc.try_to_i64(), Ok(i64::MAX));
        acc.add(1);
        assert_eq!(acc.try_to_i64(), Err(ConvertError::Overflow));
        assert_eq!(acc.try_to_i32(), Err(ConvertError::Overflow));

        let mut small = Int128::new();
        small.add(-40);
        assert_eq!(small.try_to_i32(), Ok(-40));
    }

    #[test]
    fn to_f64_is_correctly_rounded() {
        let mut acc = Int128::new();
        acc.add(i64::MAX);
        acc.add(i64::MAX);
        acc.add(3);
        let exact = 2 * i128::from(i64::MAX) + 3;
        assert_eq!(acc.to_f64(), exact as f64);
    }
}
