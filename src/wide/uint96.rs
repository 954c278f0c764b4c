use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

/// Unsigned 96-bit accumulator: `hi · 2^32 + lo`.
///
/// Sized for sums of squared `i32` values: each square is at most 2^62, so at
/// least 2^33 of them accumulate without reaching the 96-bit limit. Callers
/// exceeding that bound must use a wider accumulator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UInt96 {
    hi: u64,
    lo: u32,
}

impl UInt96 {
    /// Zero.
    pub const fn new() -> Self {
        Self { hi: 0, lo: 0 }
    }

    /// Adds an unsigned 64-bit value.
    pub fn add(&mut self, x: u64) {
        let (t, carry) = x.overflowing_add(u64::from(self.lo));
        self.lo = t as u32;
        // the bits of `t` above the low limb carry into `hi`, in units of 2^32
        self.hi = self
            .hi
            .wrapping_add(t >> 32)
            .wrapping_add(u64::from(carry) << 32);
    }

    /// Adds another accumulator.
    pub fn add_wide(&mut self, other: &Self) {
        // two 32-bit limbs cannot overflow a u64 sum
        let t = u64::from(self.lo) + u64::from(other.lo);
        self.lo = t as u32;
        self.hi = self.hi.wrapping_add(other.hi).wrapping_add(t >> 32);
    }

    /// Exact value (96 bits always fit in `u128`).
    pub fn to_u128(&self) -> u128 {
        (u128::from(self.hi) << 32) | u128::from(self.lo)
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
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let mut acc = UInt96::new();
        let mut reference: u128 = 0;
        for _ in 0..10_000 {
            // squares of random i32 values, the intended workload
            let v = i64::from(rng.gen_range(i32::MIN..=i32::MAX));
            let sq = (v * v) as u64;
            acc.add(sq);
            reference += u128::from(sq);
            assert_eq!(acc.to_u128(), reference);
        }
    }

    #[test]
    fn carries_past_64_bits() {
        let mut acc = UInt96::new();
        let sq_min = (i64::from(i32::MIN) * i64::from(i32::MIN)) as u64; // 2^62
        for _ in 0..8 {
            acc.add(sq_min);
        }
        // 8 · 2^62 = 2^65, past the u64 range
        assert_eq!(acc.to_u128(), 1u128 << 65);
        assert_eq!(acc.to_f64(), 2f64.powi(65));
    }

    #[test]
    fn merge_and_narrow() {
        let mut a = UInt96::new();
        let mut b = UInt96::new();
        a.add(u64::MAX);
        b.add(1);
        a.add_wide(&b);
        assert_eq!(a.to_u128(), u128::from(u64::MAX) + 1);
        assert_eq!(a.try_to_i64(), Err(ConvertError::Overflow));

        let mut c = UInt96::new();
        c.add(123);
        assert_eq!(c.try_to_i64(), Ok(123));
    }
}
