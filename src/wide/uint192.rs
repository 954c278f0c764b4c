use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

use super::f64_from_limbs;

/// Unsigned 192-bit accumulator: `hi · 2^128 + mid · 2^64 + lo`.
///
/// Sized for sums of squared `i64` values: each square is at most 2^126, so
/// 2^63 of them stay below 2^189. Addition never drops a carry within the
/// width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UInt192 {
    hi: u64,
    mid: u64,
    lo: u64,
}

impl UInt192 {
    /// Zero.
    pub const fn new() -> Self {
        Self { hi: 0, mid: 0, lo: 0 }
    }

    /// Builds from an exact `u128` value.
    pub const fn from_u128(x: u128) -> Self {
        Self {
            hi: 0,
            mid: (x >> 64) as u64,
            lo: x as u64,
        }
    }

    /// Accumulates `x²` exactly.
    ///
    /// The square of any `i64` fits in 127 bits; the native widening multiply
    /// produces it exactly and the carry chain promotes it into the 192-bit
    /// total.
    pub fn add_square(&mut self, x: i64) {
        let a = x.unsigned_abs();
        let sq = u128::from(a) * u128::from(a);
        self.add_u128(sq);
    }

    /// Adds an exact `u128` value.
    pub fn add_u128(&mut self, x: u128) {
        let (lo, c1) = self.lo.overflowing_add(x as u64);
        let (mid, c2) = self.mid.overflowing_add((x >> 64) as u64);
        let (mid, c3) = mid.overflowing_add(u64::from(c1));
        self.lo = lo;
        self.mid = mid;
        self.hi = self
            .hi
            .wrapping_add(u64::from(c2))
            .wrapping_add(u64::from(c3));
    }

    /// Adds another accumulator.
    pub fn add_wide(&mut self, other: &Self) {
        let (lo, c1) = self.lo.overflowing_add(other.lo);
        let (mid, c2) = self.mid.overflowing_add(other.mid);
        let (mid, c3) = mid.overflowing_add(u64::from(c1));
        self.lo = lo;
        self.mid = mid;
        self.hi = self
            .hi
            .wrapping_add(other.hi)
            .wrapping_add(u64::from(c2))
            .wrapping_add(u64::from(c3));
    }

    /// Low 192 bits of `self · m`.
    ///
    /// Exact only when the true product fits; callers prove boundedness
    /// (`n · Σx²` stays below 2^190 for `n < 2^32` and `i64` inputs).
    #[must_use]
    pub fn unsigned_multiply(&self, m: u32) -> Self {
        let m = u128::from(m);
        let lo = u128::from(self.lo) * m;
        let mid = u128::from(self.mid) * m + (lo >> 64);
        let hi = u128::from(self.hi) * m + (mid >> 64);
        Self {
            hi: hi as u64,
            mid: mid as u64,
            lo: lo as u64,
        }
    }

    /// Wrapping subtraction; callers prove `self >= other`.
    #[must_use]
    pub fn subtract(&self, other: &Self) -> Self {
        let (lo, b1) = self.lo.overflowing_sub(other.lo);
        let (mid, b2) = self.mid.overflowing_sub(other.mid);
        let (mid, b3) = mid.overflowing_sub(u64::from(b1));
        let hi = self
            .hi
            .wrapping_sub(other.hi)
            .wrapping_sub(u64::from(b2))
            .wrapping_sub(u64::from(b3));
        Self { hi, mid, lo }
    }

    /// `x²` as a 192-bit value, exact for `x < 2^96`.
    #[must_use]
    pub fn square_of(x: u128) -> Self {
        debug_assert!(x < 1u128 << 96);
        let xh = (x >> 64) as u64; // < 2^32
        let xl = x as u64;
        let ll = u128::from(xl) * u128::from(xl);
        let lh = u128::from(xl) * u128::from(xh); // < 2^96, so 2·lh fits u128
        let hh = u128::from(xh) * u128::from(xh); // < 2^64

        // x² = hh·2^128 + 2·lh·2^64 + ll
        let mut r = Self::from_u128(ll);
        r.add_shift64(lh << 1);
        r.hi = r.hi.wrapping_add(hh as u64);
        r
    }

    /// Adds `x · 2^64`.
    fn add_shift64(&mut self, x: u128) {
        let (mid, carry) = self.mid.overflowing_add(x as u64);
        self.mid = mid;
        self.hi = self
            .hi
            .wrapping_add((x >> 64) as u64)
            .wrapping_add(u64::from(carry));
    }

    /// Correctly rounded (round-half-even) conversion to the nearest `f64`.
    pub fn to_f64(&self) -> f64 {
        f64_from_limbs(self.hi, self.mid, self.lo)
    }

    /// Exact narrowing to `u128`.
    ///
    /// # Errors
    /// `ConvertError::Overflow` if the value does not fit.
    pub fn try_to_u128(&self) -> Result<u128, ConvertError> {
        if self.hi != 0 {
            return Err(ConvertError::Overflow);
        }
        Ok((u128::from(self.mid) << 64) | u128::from(self.lo))
    }

    /// Exact narrowing to `i64`.
    ///
    /// # Errors
    /// `ConvertError::Overflow` if the value does not fit.
    pub fn try_to_i64(&self) -> Result<i64, ConvertError> {
        self.try_to_u128()
            .and_then(|v| i64::try_from(v).map_err(|_| ConvertError::Overflow))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn squares_match_u128_reference_while_they_fit() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let mut acc = UInt192::new();
        let mut reference: u128 = 0;
        for _ in 0..1000 {
            let x = i64::from(rng.gen_range(i32::MIN..=i32::MAX));
            acc.add_square(x);
            let a = u128::from(x.unsigned_abs());
            reference += a * a;
            assert_eq!(acc.try_to_u128(), Ok(reference));
        }
    }

    #[test]
    fn sum_of_max_squares_exceeds_128_bits() {
        let mut acc = UInt192::new();
        for _ in 0..4 {
            acc.add_square(i64::MIN); // each square is exactly 2^126
        }
        // 4 · 2^126 = 2^128: one bit into the high limb
        assert_eq!(acc.try_to_u128(), Err(ConvertError::Overflow));
        assert_eq!(acc.to_f64(), 2f64.powi(128));
    }

    #[test]
    fn doubling_stays_exact_past_128_bits() {
        let mut acc = UInt192::new();
        acc.add_square(i64::MAX);
        acc.add_square(i64::MAX);
        // keep doubling by self-addition: 2^k · 2·(2^63−1)²
        let mut expect_sq_count: u32 = 2;
        for _ in 0..6 {
            let snapshot = acc;
            acc.add_wide(&snapshot);
            expect_sq_count *= 2;
        }
        // 128 squares of i64::MAX: (2^63−1)² = 2^126 − 2^64 + 1
        // total = 128·(2^126 − 2^64 + 1); verify via the f64 image
        let sq = 2f64.powi(126) - 2f64.powi(64) + 1.0;
        let expect = sq * f64::from(expect_sq_count);
        assert_eq!(acc.to_f64(), expect);
    }

    #[test]
    fn square_of_matches_reference() {
        for x in [0u128, 1, u128::from(u64::MAX), 1 << 95, (1 << 96) - 1] {
            let sq = UInt192::square_of(x);
            if x < 1 << 64 {
                // reference fits u128 exactly
                assert_eq!(sq.try_to_u128(), Ok(x * x));
            } else {
                let exact_f = (x as f64) * (x as f64);
                let ratio = sq.to_f64() / exact_f;
                assert!((ratio - 1.0).abs() < 1e-15, "x = {x:#x}");
            }
        }
    }

    #[test]
    fn multiply_and_subtract_are_exact_in_bounds() {
        // n·Σx² − (Σx)² for x = [1, 2, 3, 4], n = 4
        let mut ss = UInt192::new();
        for x in [1i64, 2, 3, 4] {
            ss.add_square(x);
        }
        let n_ss = ss.unsigned_multiply(4);
        let sum: u128 = 10;
        let diff = n_ss.subtract(&UInt192::square_of(sum));
        // 4·30 − 100 = 20
        assert_eq!(diff.try_to_u128(), Ok(20));
    }
}
