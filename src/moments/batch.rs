//! Two-pass batch construction.
//!
//! The batch path is strictly more accurate than the streaming recursion: a
//! first pass produces a provisional mean, a second pass measures the residual
//! `Σ(xᵢ − x̄)` and folds the correction back in, and the moment sums are then
//! taken directly around the corrected mean with Kahan compensation.

use super::{Moments, Order};

impl Moments {
    /// Builds an accumulator from a slice using the corrected two-pass
    /// algorithm.
    pub fn of(order: Order, values: &[f64]) -> Self {
        let mut m = Self::new(order);
        let n = values.len();
        if n == 0 {
            return m;
        }

        // Pass 1: online half-scaled mean plus the plain-sum fallback.
        let mut m1 = 0.0;
        let mut non_finite = 0.0;
        for (i, &x) in values.iter().enumerate() {
            let half = 0.5 * x;
            non_finite += half;
            m1 += (half - m1) / (i + 1) as f64;
        }

        // Pass 2: residual correction, Kahan-compensated.
        let mut corr = 0.0;
        let mut c = 0.0;
        for &x in values {
            let y = (0.5 * x - m1) - c;
            let t = corr + y;
            c = (t - corr) - y;
            corr = t;
        }
        m1 += corr / n as f64;

        m.n = n as u64;
        m.m1 = m1;
        m.non_finite = non_finite;

        if order >= Order::Second {
            let (s2, s3, s4) = central_sums(values, m1, order);
            m.s2 = s2;
            // two symmetric deviations cancel exactly; the computed sum would
            // only carry floating point noise
            m.s3 = if n <= 2 { 0.0 } else { s3 };
            m.s4 = s4;
        }
        m
    }

    /// Batch construction over the half-open index range `[from, to)`.
    ///
    /// Bounds are the caller's contract; invalid ranges panic.
    pub fn of_range(order: Order, values: &[f64], from: usize, to: usize) -> Self {
        Self::of(order, &values[from..to])
    }

    /// Parallel batch construction: chunked fork-join reduction folded with
    /// [`combine`](Moments::combine). Agrees with [`of`](Moments::of) within
    /// the merge tolerance.
    #[cfg(feature = "rayon")]
    pub fn par_of(order: Order, values: &[f64]) -> Self {
        use rayon::prelude::*;

        const CHUNK: usize = 4096;
        if values.len() <= CHUNK {
            return Self::of(order, values);
        }
        values
            .par_chunks(CHUNK)
            .map(|chunk| Self::of(order, chunk))
            .reduce(
                || Self::new(order),
                |mut a, b| {
                    a.combine(&b);
                    a
                },
            )
    }
}

/// Kahan-compensated central moment sums around the corrected half-mean.
fn central_sums(values: &[f64], m1: f64, order: Order) -> (f64, f64, f64) {
    let mut s2 = 0.0;
    let mut s3 = 0.0;
    let mut s4 = 0.0;
    let mut c2 = 0.0;
    let mut c3 = 0.0;
    let mut c4 = 0.0;

    for &x in values {
        let d = 0.5 * x - m1;
        let d2 = d * d;

        let y2 = d2 - c2;
        let t2 = s2 + y2;
        c2 = (t2 - s2) - y2;
        s2 = t2;

        if order >= Order::Third {
            let y3 = d2 * d - c3;
            let t3 = s3 + y3;
            c3 = (t3 - s3) - y3;
            s3 = t3;
        }
        if order >= Order::Fourth {
            let y4 = d2 * d2 - c4;
            let t4 = s4 + y4;
            c4 = (t4 - s4) - y4;
            s4 = t4;
        }
    }
    (s2, s3, s4)
}
