//! Central moment accumulation.
//!
//! One struct carries the count, the running mean and up to three central
//! moment sums; an [`Order`] tag records the highest moment maintained. The
//! mean is stored **halved** (`true mean = 2·m1`) so the recursive update
//! cannot overflow for any finite input: doubles have a spare exponent bit
//! of headroom, so the halving is lossless. The moment sums are accordingly
//! kept over half-scaled deviations; readers rescale by 4, 8 and 16.

mod batch;
mod merge;

use serde::{Deserialize, Serialize};

/// Highest central moment an accumulator maintains.
///
/// Higher orders pay for extra arithmetic per update, so callers pick the
/// smallest order their statistic needs: `Second` for variance, `Third` for
/// skewness, `Fourth` for kurtosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Order {
    /// Mean only.
    First,
    /// Mean and sum of squared deviations.
    Second,
    /// Up to the sum of cubed deviations.
    Third,
    /// Up to the sum of fourth deviations.
    Fourth,
}

/// Streaming central moment accumulator.
///
/// Single-owner and not safe for concurrent mutation; parallel reduction
/// builds one accumulator per partition and folds them with
/// [`combine`](Moments::combine).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Moments {
    order: Order,
    n: u64,
    /// Half-scaled running mean.
    m1: f64,
    /// Plain running sum of half-values; authoritative when the scaled mean
    /// loses finiteness (preserves the direction of an infinity).
    non_finite: f64,
    /// Σ dev² over half-scaled deviations.
    s2: f64,
    /// Σ dev³ over half-scaled deviations.
    s3: f64,
    /// Σ dev⁴ over half-scaled deviations.
    s4: f64,
}

impl Moments {
    /// Creates an empty accumulator maintaining moments up to `order`.
    pub fn new(order: Order) -> Self {
        Self {
            order,
            n: 0,
            m1: 0.0,
            non_finite: 0.0,
            s2: 0.0,
            s3: 0.0,
            s4: 0.0,
        }
    }

    /// Number of observations.
    pub fn count(&self) -> u64 {
        self.n
    }

    /// Highest maintained moment.
    pub fn order(&self) -> Order {
        self.order
    }

    /// Adds one observation.
    ///
    /// The fused Welford-style recursion updates the fourth, third and second
    /// sums in that order, so each reads the lower sums' pre-update state,
    /// then advances the mean.
    pub fn accept(&mut self, value: f64) {
        let half = 0.5 * value;
        self.non_finite += half;

        let n0 = self.n as f64;
        self.n += 1;
        let n = self.n as f64;

        let dev = half - self.m1;
        let n_dev = dev / n;
        let term = dev * n_dev * n0;

        if self.order >= Order::Fourth {
            self.s4 += term * n_dev * n_dev * (n * n - 3.0 * n + 3.0)
                + 6.0 * n_dev * n_dev * self.s2
                - 4.0 * n_dev * self.s3;
        }
        if self.order >= Order::Third {
            self.s3 += term * n_dev * (n - 2.0) - 3.0 * n_dev * self.s2;
        }
        if self.order >= Order::Second {
            self.s2 += term;
        }
        self.m1 += n_dev;
    }

    /// Arithmetic mean.
    ///
    /// NaN when empty. When the scaled representation has lost finiteness
    /// (inputs included infinities), the plain running sum is substituted so
    /// the direction of the infinity survives.
    pub fn mean(&self) -> f64 {
        if self.n == 0 {
            return f64::NAN;
        }
        let m = 2.0 * self.m1;
        if m.is_finite() { m } else { self.non_finite }
    }

    /// Sum of squared deviations from the mean, `Σ(xᵢ − x̄)²`.
    ///
    /// NaN whenever the mean or the sum itself is non-finite: a failed lower
    /// moment poisons everything derived from it.
    pub fn sum_squared_deviations(&self) -> f64 {
        debug_assert!(self.order >= Order::Second);
        if self.mean().is_finite() && self.s2.is_finite() {
            4.0 * self.s2
        } else {
            f64::NAN
        }
    }

    /// Sum of cubed deviations, `Σ(xᵢ − x̄)³`; NaN on any non-finite ancestor.
    ///
    /// For two or fewer observations the sum is exactly zero: a pair of
    /// deviations is symmetric and cancels even when their squares overflow
    /// the running sums.
    pub fn sum_cubed_deviations(&self) -> f64 {
        debug_assert!(self.order >= Order::Third);
        if !self.mean().is_finite() {
            return f64::NAN;
        }
        if self.n <= 2 {
            return 0.0;
        }
        if self.s2.is_finite() && self.s3.is_finite() {
            8.0 * self.s3
        } else {
            f64::NAN
        }
    }

    /// Sum of fourth deviations, `Σ(xᵢ − x̄)⁴`; NaN on any non-finite ancestor.
    pub fn sum_fourth_deviations(&self) -> f64 {
        debug_assert!(self.order >= Order::Fourth);
        if self.mean().is_finite()
            && self.s2.is_finite()
            && self.s3.is_finite()
            && self.s4.is_finite()
        {
            16.0 * self.s4
        } else {
            f64::NAN
        }
    }
}
