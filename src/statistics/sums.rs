use num_traits::Float;
use serde::{Deserialize, Serialize};

use super::Accumulator;

/// Streaming Kahan-compensated sum, generic over the float width.
///
/// Empty reads 0. Non-finite terms switch to plain accumulation so an
/// infinity keeps its direction instead of being scrambled by compensation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sum<F> {
    sum: F,
    compensation: F,
    n: u64,
}

impl<F: Float> Sum<F> {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self {
            sum: F::zero(),
            compensation: F::zero(),
            n: 0,
        }
    }

    /// Builds an accumulator from a slice.
    pub fn of(values: &[F]) -> Self {
        let mut s = Self::new();
        for &x in values {
            s.accept(x);
        }
        s
    }

    /// Batch construction over the half-open range `[from, to)`.
    pub fn of_range(values: &[F], from: usize, to: usize) -> Self {
        Self::of(&values[from..to])
    }

    /// Number of observations.
    pub fn count(&self) -> u64 {
        self.n
    }

    /// Current sum at the accumulator's own precision.
    pub fn value(&self) -> F {
        self.sum
    }

    fn add(&mut self, term: F) {
        if !term.is_finite() || !self.sum.is_finite() {
            self.sum = self.sum + term;
            self.compensation = F::zero();
            return;
        }
        let y = term - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }
}

impl<F: Float> Default for Sum<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> Accumulator<F> for Sum<F> {
    fn accept(&mut self, value: F) {
        self.n += 1;
        self.add(value);
    }

    fn combine(&mut self, other: &Self) -> &mut Self {
        self.add(other.sum);
        self.add(-other.compensation);
        self.n += other.n;
        self
    }

    fn as_f64(&self) -> f64 {
        self.sum.to_f64().unwrap_or(f64::NAN)
    }
}

/// Streaming product, generic over the float width. Empty reads 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product<F> {
    product: F,
    n: u64,
}

impl<F: Float> Product<F> {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self {
            product: F::one(),
            n: 0,
        }
    }

    /// Builds an accumulator from a slice.
    pub fn of(values: &[F]) -> Self {
        let mut p = Self::new();
        for &x in values {
            p.accept(x);
        }
        p
    }

    /// Batch construction over the half-open range `[from, to)`.
    pub fn of_range(values: &[F], from: usize, to: usize) -> Self {
        Self::of(&values[from..to])
    }

    /// Number of observations.
    pub fn count(&self) -> u64 {
        self.n
    }

    /// Current product at the accumulator's own precision.
    pub fn value(&self) -> F {
        self.product
    }
}

impl<F: Float> Default for Product<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> Accumulator<F> for Product<F> {
    fn accept(&mut self, value: F) {
        self.n += 1;
        self.product = self.product * value;
    }

    fn combine(&mut self, other: &Self) -> &mut Self {
        self.product = self.product * other.product;
        self.n += other.n;
        self
    }

    fn as_f64(&self) -> f64 {
        self.product.to_f64().unwrap_or(f64::NAN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn empty_identities() {
        assert_eq!(Sum::<f64>::new().as_f64(), 0.0);
        assert_eq!(Product::<f64>::new().as_f64(), 1.0);
    }

    #[test]
    fn compensation_recovers_tiny_terms() {
        // naive f64 addition loses 1e-8 against 1e9 after a few terms;
        // the compensated sum keeps them all
        let mut s = Sum::<f64>::new();
        s.accept(1e9);
        for _ in 0..100_000 {
            s.accept(1e-8);
        }
        let expected = 1e9 + 1e-8 * 100_000.0;
        assert_relative_eq!(s.as_f64(), expected, max_relative = 1e-15);
    }

    #[test]
    fn single_precision_sum_reports_double() {
        let s = Sum::<f32>::of(&[0.5f32, 0.25, 0.125]);
        assert_abs_diff_eq!(s.as_f64(), 0.875, epsilon = 1e-7);
        assert_eq!(s.count(), 3);
        assert_eq!(s.value(), 0.875f32);
    }

    #[test]
    fn infinity_keeps_its_direction() {
        let mut s = Sum::<f64>::new();
        s.accept(f64::NEG_INFINITY);
        s.accept(1e300);
        assert_eq!(s.as_f64(), f64::NEG_INFINITY);
    }

    #[test]
    fn sum_combine_matches_whole() {
        let data: Vec<f64> = (0..500).map(|i| f64::from(i) * 1e-3 + 1e7).collect();
        let whole = Sum::of(&data);
        let mut left = Sum::of(&data[..201]);
        left.combine(&Sum::of(&data[201..]));
        assert_eq!(left.count(), 500);
        assert_relative_eq!(left.as_f64(), whole.as_f64(), max_relative = 1e-15);
    }

    #[test]
    fn product_multiplies_and_combines() {
        let mut p = Product::<f64>::of(&[2.0, 3.0]);
        p.combine(&Product::of(&[4.0]));
        assert_eq!(p.as_f64(), 24.0);
        assert_eq!(p.count(), 3);

        let zero = Product::<f64>::of(&[5.0, 0.0, 7.0]);
        assert_eq!(zero.as_f64(), 0.0);
    }
}
