use serde::{Deserialize, Serialize};

use crate::error::ConvertError;
use crate::statistics::Accumulator;
use crate::wide::{Int128, UInt192};

use super::mean_of_sum;

/// Exact streaming sum of `i64` observations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LongSum {
    sum: Int128,
    n: u64,
}

impl LongSum {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an accumulator from a slice.
    pub fn of(values: &[i64]) -> Self {
        let mut s = Self::new();
        for &x in values {
            s.accept(x);
        }
        s
    }

    /// Batch construction over the half-open range `[from, to)`.
    pub fn of_range(values: &[i64], from: usize, to: usize) -> Self {
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

impl Accumulator<i64> for LongSum {
    fn accept(&mut self, value: i64) {
        self.sum.add(value);
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

/// Exact streaming sum of squared `i64` observations.
///
/// Each square needs up to 127 bits; the 192-bit accumulator holds 2^63 of
/// them without overflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LongSumOfSquares {
    sum: UInt192,
    n: u64,
}

impl LongSumOfSquares {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an accumulator from a slice.
    pub fn of(values: &[i64]) -> Self {
        let mut s = Self::new();
        for &x in values {
            s.accept(x);
        }
        s
    }

    /// Batch construction over the half-open range `[from, to)`.
    pub fn of_range(values: &[i64], from: usize, to: usize) -> Self {
        Self::of(&values[from..to])
    }

    /// Number of observations.
    pub fn count(&self) -> u64 {
        self.n
    }

    /// Exact sum of squares while it fits 128 bits.
    ///
    /// # Errors
    /// `ConvertError::Overflow` once the total has outgrown `u128`; the
    /// accumulator itself is still exact and readable through
    /// [`as_f64`](Accumulator::as_f64).
    pub fn try_to_u128(&self) -> Result<u128, ConvertError> {
        self.sum.try_to_u128()
    }
}

impl Accumulator<i64> for LongSumOfSquares {
    fn accept(&mut self, value: i64) {
        self.sum.add_square(value);
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

/// Exact streaming mean of `i64` observations. NaN when empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LongMean {
    sum: LongSum,
}

impl LongMean {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an accumulator from a slice.
    pub fn of(values: &[i64]) -> Self {
        Self {
            sum: LongSum::of(values),
        }
    }

    /// Batch construction over the half-open range `[from, to)`.
    pub fn of_range(values: &[i64], from: usize, to: usize) -> Self {
        Self {
            sum: LongSum::of_range(values, from, to),
        }
    }

    /// Number of observations.
    pub fn count(&self) -> u64 {
        self.sum.count()
    }
}

impl Accumulator<i64> for LongMean {
    fn accept(&mut self, value: i64) {
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
        let q = self.sum.to_i128() / i128::from(self.count());
        i64::try_from(q).map_err(|_| ConvertError::Overflow)
    }
}

/// Exact-core streaming variance of `i64` observations.
///
/// `n·Σx² − (Σx)²` is evaluated in 192-bit arithmetic: for `n < 2^32` the
/// product stays below 2^190 and `|Σx| < 2^95` keeps the squared sum inside
/// [`UInt192::square_of`]'s exact range, so the numerator is exact and the
/// result rounds once. Larger counts fall back to double arithmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LongVariance {
    sum: Int128,
    sum_sq: UInt192,
    n: u64,
    biased: bool,
}

impl LongVariance {
    /// Creates an empty accumulator; `biased` selects the population form.
    pub fn new(biased: bool) -> Self {
        Self {
            sum: Int128::new(),
            sum_sq: UInt192::new(),
            n: 0,
            biased,
        }
    }

    /// Builds an unbiased accumulator from a slice.
    pub fn of(values: &[i64]) -> Self {
        let mut v = Self::new(false);
        for &x in values {
            v.accept(x);
        }
        v
    }

    /// Batch construction over the half-open range `[from, to)`.
    pub fn of_range(values: &[i64], from: usize, to: usize) -> Self {
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

impl Default for LongVariance {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Accumulator<i64> for LongVariance {
    fn accept(&mut self, value: i64) {
        self.sum.add(value);
        self.sum_sq.add_square(value);
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
                let n_ss = self.sum_sq.unsigned_multiply(n as u32);
                let s = self.sum.to_i128().unsigned_abs();
                let numerator = n_ss.subtract(&UInt192::square_of(s));
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
