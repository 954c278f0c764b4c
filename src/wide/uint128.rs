use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

/// Unsigned 128-bit accumulator: `hi · 2^64 + lo`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UInt128 {
    hi: u64,
    lo: u64,
}

impl UInt128 {
    /// Zero.
    pub const fn new() -> Self {
        Self { hi: 0, lo: 0 }
    }

    /// Builds from an exact `u128` value.
    pub const fn from_u128(x: u128) -> Self {
        Self {
            hi: (x >> 64) as u64,
            lo: x as u64,
        }
    }

    /// Adds an unsigned 64-bit value.
    pub fn add(&mut self, x: u64) {
        let (lo, carry) = self.lo.overflowing_add(x);
        self.lo = lo;
        self.hi = self.hi.wrapping_add(u64::from(carry));
    }

    /// Adds another accumulator.
    pub fn add_wide(&mut self, other: &Self) {
        let (lo, carry) = self.lo.overflowing_add(other.lo);
        self.lo = lo;
        self.hi = self.hi.wrapping_add(other.hi).wrapping_add(u64::from(carry));
    }

    /// Low 128 bits of `self · m`.
    ///
    /// Exact only when the true product fits 128 bits; bits above the width
    /// are lost. Callers must prove boundedness (e.g. a sum of `n` squared
    /// `i32` values times `n` stays below 2^126 for `n < 2^32`).
    #[must_use]
    pub fn unsigned_multiply(&self, m: u32) -> Self {
        let m = u64::from(m);
        let lo = u128::from(self.lo) * u128::from(m);
        let hi = self.hi.wrapping_mul(m).wrapping_add((lo >> 64) as u64);
        Self { hi, lo: lo as u64 }
    }

    /// Wrapping subtraction.
    ///
    /// Used only where the caller has proven `self >= other` (a difference of
    /// the form `n·Σx² − (Σx)²` is non-negative by Cauchy-Schwarz).
    #[must_use]
    pub fn subtract(&self, other: &Self) -> Self {
        let (lo, borrow) = self.lo.overflowing_sub(other.lo);
        let hi = self.hi.wrapping_sub(other.hi).wrapping_sub(u64::from(borrow));
        Self { hi, lo }
    }

    /// Exact value.
    pub fn to_u128(&self) -> u128 {
        (u128::from(self.hi) << 64) | u128::from(self.lo)
    }

    /// Correctly rounded conversion to the nearest `f64`.
    pub fn to_f64(&self) -> f64 {
        self.to_u128() as f64
    }

    /// Exact narrowing to `i64`.
    ///
    /// # Errors
    /// `ConvertError::Overflow` if the value does not fit.
    pub fn try_to_i64(&self) -> Result<i64, ConvertError> {
        i64::try_from(self.to_u128()).map_err(|_| ConvertError::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn add_matches_u128_reference() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
        let mut acc = UInt128::new();
        let mut reference: u128 = 0;
        for _ in 0..10_000 {
            let x = rng.gen_range(0..=u64::MAX);
            acc.add(x);
            reference = reference.wrapping_add(u128::from(x));
            assert_eq!(acc.to_u128(), reference);
        }
    }

    #[test]
    fn multiply_subtract_roundtrip() {
        // n·Σx² − (Σx)² for x = [3, 5, 7], n = 3
        let mut sum_sq = UInt128::new();
        for x in [3u64, 5, 7] {
            sum_sq.add(x * x);
        }
        let n_ss = sum_sq.unsigned_multiply(3);
        let s: u128 = 15 * 15;
        let diff = n_ss.subtract(&UInt128::from_u128(s));
        // 3·83 − 225 = 24
        assert_eq!(diff.to_u128(), 24);
    }

    #[test]
    fn multiply_carries_into_high_limb() {
        let mut acc = UInt128::new();
        acc.add(u64::MAX);
        let r = acc.unsigned_multiply(u32::MAX);
        assert_eq!(r.to_u128(), u128::from(u64::MAX) * u128::from(u32::MAX));
    }

    #[test]
    fn narrowing_signals_overflow() {
        let big = UInt128::from_u128(1u128 << 64);
        assert_eq!(big.try_to_i64(), Err(ConvertError::Overflow));
        let ok = UInt128::from_u128(1u128 << 40);
        assert_eq!(ok.try_to_i64(), Ok(1 << 40));
    }
}
