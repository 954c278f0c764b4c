use serde::{Deserialize, Serialize};

use crate::moments::{Moments, Order};

use super::Accumulator;

/// Streaming arithmetic mean.
///
/// The running mean is kept in a half-scaled representation so the recursive
/// update cannot overflow for any finite input; batch construction uses the
/// corrected two-pass algorithm. NaN when empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mean {
    moments: Moments,
}

impl Mean {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self {
            moments: Moments::new(Order::First),
        }
    }

    /// Two-pass batch construction.
    pub fn of(values: &[f64]) -> Self {
        Self {
            moments: Moments::of(Order::First, values),
        }
    }

    /// Batch construction over the half-open range `[from, to)`; bounds are
    /// the caller's contract.
    pub fn of_range(values: &[f64], from: usize, to: usize) -> Self {
        Self {
            moments: Moments::of_range(Order::First, values, from, to),
        }
    }

    /// Number of observations.
    pub fn count(&self) -> u64 {
        self.moments.count()
    }
}

impl Default for Mean {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator<f64> for Mean {
    fn accept(&mut self, value: f64) {
        self.moments.accept(value);
    }

    fn combine(&mut self, other: &Self) -> &mut Self {
        self.moments.combine(&other.moments);
        self
    }

    fn as_f64(&self) -> f64 {
        self.moments.mean()
    }
}
