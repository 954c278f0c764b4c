use serde::{Deserialize, Serialize};

use crate::moments::{Moments, Order};

use super::Accumulator;

/// Finishing formula for excess kurtosis (normal data reads near 0).
///
/// Unbiased (default) is the sample-adjusted estimator
/// `[n(n+1) / ((n−1)(n−2)(n−3))] · m₄/s⁴ − 3(n−1)² / ((n−2)(n−3))`
/// with `s² = m₂/(n−1)`, defined for `n ≥ 4`; biased is the plain moment
/// ratio `n·m₄/m₂² − 3`. Constant data divides zero by zero and reads NaN:
/// kurtosis measures tail weight relative to spread, and with no spread
/// there is no meaningful value.
pub(crate) fn kurtosis_of(moments: &Moments, biased: bool) -> f64 {
    let n = moments.count();
    if n == 0 {
        return f64::NAN;
    }
    let m2 = moments.sum_squared_deviations();
    let m4 = moments.sum_fourth_deviations();
    let nf = n as f64;
    if biased {
        return nf * m4 / (m2 * m2) - 3.0;
    }
    if n < 4 {
        return f64::NAN;
    }
    let variance = m2 / (nf - 1.0);
    nf * (nf + 1.0) / ((nf - 1.0) * (nf - 2.0) * (nf - 3.0)) * m4 / (variance * variance)
        - 3.0 * (nf - 1.0) * (nf - 1.0) / ((nf - 2.0) * (nf - 3.0))
}

/// Streaming excess kurtosis, maintaining moments up to the fourth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kurtosis {
    moments: Moments,
    biased: bool,
}

impl Kurtosis {
    /// Creates an empty accumulator; `biased` selects the plain moment ratio
    /// over the sample-adjusted estimator.
    pub fn new(biased: bool) -> Self {
        Self {
            moments: Moments::new(Order::Fourth),
            biased,
        }
    }

    /// Two-pass batch construction (unbiased).
    pub fn of(values: &[f64]) -> Self {
        Self {
            moments: Moments::of(Order::Fourth, values),
            biased: false,
        }
    }

    /// Batch construction over the half-open range `[from, to)`.
    pub fn of_range(values: &[f64], from: usize, to: usize) -> Self {
        Self {
            moments: Moments::of_range(Order::Fourth, values, from, to),
            biased: false,
        }
    }

    /// Switches to the biased moment ratio.
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

impl Default for Kurtosis {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Accumulator<f64> for Kurtosis {
    fn accept(&mut self, value: f64) {
        self.moments.accept(value);
    }

    fn combine(&mut self, other: &Self) -> &mut Self {
        self.moments.combine(&other.moments);
        self
    }

    fn as_f64(&self) -> f64 {
        kurtosis_of(&self.moments, self.biased)
    }
}
