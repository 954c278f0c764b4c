use serde::{Deserialize, Serialize};

use crate::moments::{Moments, Order};

use super::Accumulator;

/// Finishing formula shared by [`Variance`], [`StandardDeviation`] and the
/// summary display: `Σ(xᵢ − x̄)² / (n − 1)` (unbiased, Bessel's correction)
/// or `/ n` (biased population form).
pub(crate) fn variance_of(moments: &Moments, biased: bool) -> f64 {
    let n = moments.count();
    match n {
        0 => f64::NAN,
        // a single observation deviates from its own mean by exactly zero
        1 => 0.0,
        _ => {
            let m2 = moments.sum_squared_deviations();
            let dof = if biased { n } else { n - 1 };
            m2 / dof as f64
        }
    }
}

/// Streaming variance.
///
/// Unbiased (`ddof = 1`) by default, matching the usual sample estimator;
/// the biased population form divides by `n` instead. `n = 0` reads NaN,
/// `n = 1` reads exactly 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variance {
    moments: Moments,
    biased: bool,
}

impl Variance {
    /// Creates an empty accumulator; `biased` selects the population form.
    pub fn new(biased: bool) -> Self {
        Self {
            moments: Moments::new(Order::Second),
            biased,
        }
    }

    /// Two-pass batch construction (unbiased).
    pub fn of(values: &[f64]) -> Self {
        Self {
            moments: Moments::of(Order::Second, values),
            biased: false,
        }
    }

    /// Batch construction over the half-open range `[from, to)`.
    pub fn of_range(values: &[f64], from: usize, to: usize) -> Self {
        Self {
            moments: Moments::of_range(Order::Second, values, from, to),
            biased: false,
        }
    }

    /// Switches to the biased population estimator.
    #[must_use]
    pub fn biased(mut self) -> Self {
        self.biased = true;
        self
    }

    /// Number of observations.
    pub fn count(&self) -> u64 {
        self.moments.count()
    }
}

impl Default for Variance {
    /// Unbiased sample variance.
    fn default() -> Self {
        Self::new(false)
    }
}

impl Accumulator<f64> for Variance {
    fn accept(&mut self, value: f64) {
        self.moments.accept(value);
    }

    fn combine(&mut self, other: &Self) -> &mut Self {
        self.moments.combine(&other.moments);
        self
    }

    fn as_f64(&self) -> f64 {
        variance_of(&self.moments, self.biased)
    }
}

/// Streaming standard deviation: the square root of [`Variance`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardDeviation {
    variance: Variance,
}

impl StandardDeviation {
    /// Creates an empty accumulator; `biased` selects the population form.
    pub fn new(biased: bool) -> Self {
        Self {
            variance: Variance::new(biased),
        }
    }

    /// Two-pass batch construction (unbiased).
    pub fn of(values: &[f64]) -> Self {
        Self {
            variance: Variance::of(values),
        }
    }

    /// Batch construction over the half-open range `[from, to)`.
    pub fn of_range(values: &[f64], from: usize, to: usize) -> Self {
        Self {
            variance: Variance::of_range(values, from, to),
        }
    }

    /// Number of observations.
    pub fn count(&self) -> u64 {
        self.variance.count()
    }
}

impl Default for StandardDeviation {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Accumulator<f64> for StandardDeviation {
    fn accept(&mut self, value: f64) {
        self.variance.accept(value);
    }

    fn combine(&mut self, other: &Self) -> &mut Self {
        self.variance.combine(&other.variance);
        self
    }

    fn as_f64(&self) -> f64 {
        self.variance.as_f64().sqrt()
    }
}
