use serde::{Deserialize, Serialize};

use super::Accumulator;

/// Streaming Kahan-compensated sum of natural logarithms.
///
/// The building block for [`GeometricMean`], exposed on its own because the
/// log-sum is also what likelihood computations want. A zero observation
/// drives the sum to negative infinity and a negative one to NaN, both of
/// which simply flow out of `ln`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SumOfLogs {
    sum: f64,
    compensation: f64,
    n: u64,
}

impl SumOfLogs {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an accumulator from a slice.
    pub fn of(values: &[f64]) -> Self {
        let mut s = Self::new();
        for &x in values {
            s.accept(x);
        }
        s
    }

    /// Batch construction over the half-open range `[from, to)`.
    pub fn of_range(values: &[f64], from: usize, to: usize) -> Self {
        Self::of(&values[from..to])
    }

    /// Number of observations.
    pub fn count(&self) -> u64 {
        self.n
    }

    fn add(&mut self, term: f64) {
        // compensation is meaningless once the sum leaves the finite range
        if !term.is_finite() || !self.sum.is_finite() {
            self.sum += term;
            self.compensation = 0.0;
            return;
        }
        let y = term - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }
}

impl Accumulator<f64> for SumOfLogs {
    fn accept(&mut self, value: f64) {
        self.n += 1;
        self.add(value.ln());
    }

    fn combine(&mut self, other: &Self) -> &mut Self {
        self.add(other.sum);
        self.add(-other.compensation);
        self.n += other.n;
        self
    }

    fn as_f64(&self) -> f64 {
        self.sum
    }
}

/// Streaming geometric mean, `exp(Σ ln xᵢ / n)`.
///
/// NaN when empty or when any observation was negative; zero when any
/// observation was zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeometricMean {
    logs: SumOfLogs,
}

impl GeometricMean {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an accumulator from a slice.
    pub fn of(values: &[f64]) -> Self {
        Self {
            logs: SumOfLogs::of(values),
        }
    }

    /// Batch construction over the half-open range `[from, to)`.
    pub fn of_range(values: &[f64], from: usize, to: usize) -> Self {
        Self {
            logs: SumOfLogs::of_range(values, from, to),
        }
    }

    /// Number of observations.
    pub fn count(&self) -> u64 {
        self.logs.count()
    }
}

impl Accumulator<f64> for GeometricMean {
    fn accept(&mut self, value: f64) {
        self.logs.accept(value);
    }

    fn combine(&mut self, other: &Self) -> &mut Self {
        self.logs.combine(&other.logs);
        self
    }

    fn as_f64(&self) -> f64 {
        if self.logs.count() == 0 {
            return f64::NAN;
        }
        (self.logs.as_f64() / self.logs.count() as f64).exp()
    }
}
