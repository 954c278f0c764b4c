use serde::{Deserialize, Serialize};

use crate::error::ConvertError;
use crate::statistics::Accumulator;
use crate::wide::{Int128, UInt128, UInt96};

use super::mean_of_sum;

/// Below this length the packed batch loop is not worth its setup.
const SMALL: usize = 16;

/// Exact streaming sum of `i32` observations.
///
/// A 128-bit accumulator cannot overflow on any realistic count, so every
/// read is bit-exact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntSum {
    sum: Int128,
    n: u64,
}

impl IntSum {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an accumulator from a slice.
    pub fn of(values: &[i32]) -> Self {
        let mut s = Self::new();
        for &x in values {
            s.accept(x);
        }
        s
    }

    /// Batch construction over the half-open range `[from, to)`.
    pub fn of_range(values: &[i32], from: usize, to: usize) -> Self {
        Self::of(&values[from..to])
    }

    /// Number of observations.
    pub fn count(&self) -> u64 {
        self.n
    }

    /// Exact sum.
    pub fn to_i128(&self) -> i128 {
        self.sum.to_i128()
    }
}

impl Accumulator<i32> for IntSum {
    fn accept(&mut self, value: i32) {
        self.sum.add(i64::from(value));
        self.n += 1;
    }

    fn combine(&mut self, other: &Self) -> &mut Self {
        self.sum.add_wide(&other.sum);
        self.n += other.n;
        self
    }

    fn as_f64(&self) -> f64 {
        self.sum.to_f64()
    }

    fn try_as_i64(&self) -> Result<i64, ConvertError> {
        self.sum.try_to_i64()
    }

    fn try_as_i32(&self) -> Result<i32, ConvertError> {
        self.sum.try_to_i32()
    }
}

/// Exact streaming sum of squared `i32` observations.
///
/// 96 bits hold at least 2^33 squares, far past any addressable input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntSumOfSquares {
    sum: UInt96,
    n: u64,
}

impl IntSumOfSquares {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an accumulator from a slice.
    ///
    /// Long inputs take a packed path that folds two squares into one 64-bit
    /// addend before touching the wide accumulator; integer addition is
    /// associative, so the result is bit-identical to the scalar loop.
    pub fn of(values: &[i32]) -> Self {
        let mut s = Self::new();
        if values.len() < SMALL {
            for &x in values {
                s.accept(x);
            }
            return s;
        }

        let mut pairs = values.chunks_exact(2);
        for pair in &mut pairs {
            // two squares of at most 2^62 sum to at most 2^63, which fits
            // unsigned but not signed 64-bit
            let a = i64::from(pair[0]);
            let b = i64::from(pair[1]);
            s.sum.add((a * a) as u64 + (b * b) as u64);
        }
        for &x in pairs.remainder() {
            let x = i64::from(x);
            s.sum.add((x * x) as u64);
        }
        s.n = values.len() as u64;
        s
    }

    /// Batch construction over the half-open range `[from, to)`.
    pub fn of_range(values: &[i32], from: usize, to: usize) -> Self {
        Self::of(&values[from..to])
    }

    /// Number of observations.
    pub fn count(&self) -> u64 {
        self.n
    }

    /// Exact sum of squares.
    pub fn to_u128(&self) -> u128 {
        self.sum.to_u128()
    }
}

impl Accumulator<i32> for IntSumOfSquares {
    fn accept(&mut self, value: i32) {
        let x = i64::from(value);
        self.sum.add((x * x) as u64);
        self.n += 1;
    }

    fn combine(&mut self, other: &Self) -> &mut Self {
        self.sum.add_wide(&other.sum);
        self.n += other.n;
        self
    }

    fn as_f64(&self) -> f64 {
        self.sum.to_f64()
    }

    fn try_as_i64(&self) -> Result<i64, ConvertError> {
        self.sum.try_to_i64()
    }
}

/// Exact streaming mean of `i32` observations.
///
/// The sum stays exact; the read divides once, as quotient plus fractional
/// remainder. NaN when empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntMean {
    sum: IntSum,
}

impl IntMean {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an accumulator from a slice.
    pub fn of(values: &[i32]) -> Self {
        Self {
            sum: IntSum::of(values),
        }
    }

    /// Batch construction over the half-open range `[from, to)`.
    pub fn of_range(values: &[i32], from: usize, to: usize) -> Self {
        Self {
            sum: IntSum::of_range(values, from, to),
        }
    }

    /// Number of observations.
    pub fn count(&self) -> u64 {
        self.sum.count()
    }
}

impl Accumulator<i32> for IntMean {
    fn accept(&mut self, value: i32) {
        self.sum.accept(value);
    }

    fn combine(&mut self, other: &Self) -> &mut Self {
        self.sum.combine(&other.sum);
        self
    }

    fn as_f64(&self) -> f64 {
        mean_of_sum(self.sum.to_i128(), self.sum.count())
    }

    fn try_as_i64(&self) -> Result<i64, ConvertError> {
        if self.count() == 0 {
            return Err(ConvertError::NonFinite);
        }
        // exact truncating division, no float round trip
        let q = self.sum.to_i128() / i128::from(self.count());
        i64::try_from(q).map_err(|_| ConvertError::Overflow)
    }
}

/// Exact-core streaming variance of `i32` observations.
///
/// Keeps `Σx` and `Σx²` in integer accumulators and evaluates
/// `(n·Σx² − (Σx)²) / (n·dof)`. The numerator stays below 2^126 for any
/// `n < 2^32`, so it is computed exactly and rounded once; larger counts fall
/// back to double arithmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntVariance {
    sum: Int128,
    sum_sq: UInt128,
    n: u64,
    biased: bool,
}

impl IntVariance {
    /// Creates an empty accumulator; `biased` selects the population form.
    pub fn new(biased: bool) -> Self {
        Self {
            sum: Int128::new(),
            sum_sq: UInt128::new(),
            n: 0,
            biased,
        }
    }

    /// Builds an unbiased accumulator from a slice.
    pub fn of(values: &[i32]) -> Self {
        let mut v = Self::new(false);
        for &x in values {
            v.accept(x);
        }
        v
    }

    /// Batch construction over the half-open range `[from, to)`.
    pub fn of_range(values: &[i32], from: usize, to: usize) -> Self {
        Self::of(&values[from..to])
    }

    /// Switches to the biased population estimator.
    #[must_use]
    pub fn biased(mut self) -> Self {
        self.biased = true;
        self
    }

    /// Number of observations.
    pub fn count(&self) -> u64 {
        self.n
    }

    fn dof(&self) -> u64 {
        if self.biased { self.n } else { self.n - 1 }
    }
}

impl Default for IntVariance {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Accumulator<i32> for IntVariance {
    fn accept(&mut self, value: i32) {
        let x = i64::from(value);
        self.sum.add(x);
        self.sum_sq.add((x * x) as u64);
        self.n += 1;
    }

    fn combine(&mut self, other: &Self) -> &mut Self {
        self.sum.add_wide(&other.sum);
        self.sum_sq.add_wide(&other.sum_sq);
        self.n += other.n;
        self
    }

    fn as_f64(&self) -> f64 {
        match self.n {
            0 => f64::NAN,
            1 => 0.0,
            n if n < 1 << 32 => {
                // n·Σx² < 2^126 and |Σx| < 2^63, so both operands and their
                // difference are exact in 128 bits
                let n_ss = self.sum_sq.unsigned_multiply(n as u32);
                let s = self.sum.to_i128();
                let sq = UInt128::from_u128((s * s) as u128);
                let numerator = n_ss.subtract(&sq);
                numerator.to_f64() / (n * self.dof()) as f64
            }
            n => {
                let nf = n as f64;
                let s = self.sum.to_f64();
                (self.sum_sq.to_f64() - s * s / nf) / self.dof() as f64
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn sum_is_exact_at_the_extremes() {
        let data = [i32::MAX, i32::MAX, i32::MIN, 7];
        let s = IntSum::of(&data);
        let expected: i128 = data.iter().map(|&x| i128::from(x)).sum();
        assert_eq!(s.to_i128(), expected);
        assert_eq!(s.try_as_i64(), Ok(expected as i64));
        assert_eq!(s.try_as_i32(), Err(ConvertError::Overflow));
    }

    #[test]
    fn packed_batch_matches_the_scalar_loop_bit_for_bit() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(21);
        for len in [0usize, 1, 15, 16, 17, 100, 1001] {
            let data: Vec<i32> = (0..len).map(|_| rng.gen_range(i32::MIN..=i32::MAX)).collect();
            let batch = IntSumOfSquares::of(&data);
            let mut scalar = IntSumOfSquares::new();
            for &x in &data {
                scalar.accept(x);
            }
            assert_eq!(batch.to_u128(), scalar.to_u128(), "len {len}");
            assert_eq!(batch.count(), scalar.count());
        }
    }

    #[test]
    fn packed_pairs_carry_the_extreme_square_sum() {
        // a pair of i32::MIN squares sums to exactly 2^63, the packed
        // addend's upper limit
        let mut data = vec![i32::MIN; 30];
        data.push(i32::MAX);
        let batch = IntSumOfSquares::of(&data);
        let expected = 30 * (1u128 << 62) + u128::from(i32::MAX.unsigned_abs()).pow(2);
        assert_eq!(batch.to_u128(), expected);
    }

    #[test]
    fn sum_of_squares_handles_the_full_range() {
        let data = vec![i32::MIN; 1000];
        let s = IntSumOfSquares::of(&data);
        // 1000 · 2^62
        assert_eq!(s.to_u128(), 1000u128 << 62);
        assert_eq!(s.try_as_i64(), Err(ConvertError::Overflow));
    }

    #[test]
    fn mean_divides_exactly() {
        let m = IntMean::of(&[1, 2, 3, 4]);
        assert_eq!(m.as_f64(), 2.5);
        assert_eq!(m.try_as_i64(), Ok(2));
        assert_eq!(m.try_as_i32(), Ok(2));
        assert!(IntMean::new().as_f64().is_nan());
        assert_eq!(IntMean::new().try_as_i64(), Err(ConvertError::NonFinite));
    }

    #[test]
    fn variance_matches_the_definition() {
        let data = [1, 1, 2, 3, 5, 8, 13];
        // Σx = 33, Σx² = 273: (7·273 − 33²) / 49 = 822/49 biased
        assert_relative_eq!(
            IntVariance::of(&data).biased().as_f64(),
            822.0 / 49.0,
            max_relative = 1e-15
        );
        assert_relative_eq!(
            IntVariance::of(&data).as_f64(),
            822.0 / 42.0,
            max_relative = 1e-15
        );
    }

    #[test]
    fn variance_boundaries() {
        assert!(IntVariance::of(&[]).as_f64().is_nan());
        assert_eq!(IntVariance::of(&[i32::MAX]).as_f64(), 0.0);
        assert_eq!(IntVariance::of(&[5, 5, 5, 5]).as_f64(), 0.0);
    }

    #[test]
    fn variance_survives_extreme_magnitudes() {
        // all mass at the ends of the range: exact numerator, one rounding
        let data = [i32::MAX, i32::MIN, i32::MAX, i32::MIN];
        let got = IntVariance::of(&data).biased().as_f64();
        let mean = (i64::from(i32::MAX) + i64::from(i32::MIN)) as f64 / 2.0;
        let expected: f64 = data
            .iter()
            .map(|&x| (f64::from(x) - mean).powi(2))
            .sum::<f64>()
            / 4.0;
        assert_relative_eq!(got, expected, max_relative = 1e-15);
    }

    #[test]
    fn combine_is_exact() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let data: Vec<i32> = (0..500).map(|_| rng.gen_range(i32::MIN..=i32::MAX)).collect();
        let whole = IntVariance::of(&data);
        let mut left = IntVariance::of(&data[..250]);
        left.combine(&IntVariance::of(&data[250..]));
        // limb addition is exact, so the merged state is identical
        assert_eq!(left.as_f64().to_bits(), whole.as_f64().to_bits());

        let mut s = IntSum::of(&data[..123]);
        s.combine(&IntSum::of(&data[123..]));
        assert_eq!(s.to_i128(), IntSum::of(&data).to_i128());
    }
}
