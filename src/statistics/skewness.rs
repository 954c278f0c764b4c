use serde::{Deserialize, Serialize};

use crate::moments::{Moments, Order};

use super::Accumulator;

/// Finishing formula for skewness.
///
/// Unbiased (default) is the adjusted Fisher-Pearson coefficient
/// `n·m₃ / [(n−1)(n−2)·s³]` with `s² = m₂/(n−1)`, defined for `n ≥ 3`;
/// biased is the moment coefficient `√n·m₃ / m₂^(3/2)`, defined for `n ≥ 2`.
/// A zero second moment (constant data) reads 0, not NaN: constant data has
/// no asymmetry. A poisoned moment chain still propagates NaN, since a NaN
/// `m₂` fails the zero comparison.
pub(crate) fn skewness_of(moments: &Moments, biased: bool) -> f64 {
    let n = moments.count();
    let needed = if biased { 2 } else { 3 };
    if n < needed {
        return f64::NAN;
    }
    let m2 = moments.sum_squared_deviations();
    let m3 = moments.sum_cubed_deviations();
    if m2 == 0.0 {
        return 0.0;
    }
    let nf = n as f64;
    if biased {
        nf.sqrt() * m3 / m2.powf(1.5)
    } else {
        let variance = m2 / (nf - 1.0);
        nf * m3 / ((nf - 1.0) * (nf - 2.0) * variance.powf(1.5))
    }
}

/// Streaming skewness, maintaining moments up to the third.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skewness {
    moments: Moments,
    biased: bool,
}

impl Skewness {
    /// Creates an empty accumulator; `biased` selects the plain moment
    /// coefficient over the sample-adjusted one.
    pub fn new(biased: bool) -> Self {
        Self {
            moments: Moments::new(Order::Third),
            biased,
        }
    }

    /// Two-pass batch construction (unbiased).
    pub fn of(values: &[f64]) -> Self {
        Self {
            moments: Moments::of(Order::Third, values),
            biased: false,
        }
    }

    /// Batch construction over the half-open range `[from, to)`.
    pub fn of_range(values: &[f64], from: usize, to: usize) -> Self {
        Self {
            moments: Moments::of_range(Order::Third, values, from, to),
            biased: false,
        }
    }

    /// Switches to the biased moment coefficient.
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

impl Default for Skewness {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Accumulator<f64> for Skewness {
    fn accept(&mut self, value: f64) {
        self.moments.accept(value);
    }

    fn combine(&mut self, other: &Self) -> &mut Self {
        self.moments.combine(&other.moments);
        self
    }

    fn as_f64(&self) -> f64 {
        skewness_of(&self.moments, self.biased)
    }
}
