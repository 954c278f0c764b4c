//! Bit-exact integer statistics.
//!
//! Floating point accumulation of integer data throws away information the
//! inputs never had to lose. The accumulators here keep sums and sums of
//! squares in fixed-width multi-limb integers sized so overflow is impossible
//! for their documented input range, and only round once, at the final read.
//! Merging partial results is plain limb addition and therefore exact, so any
//! reduction tree over any partitioning produces identical bits.

mod int_stats;
mod long_stats;

pub use int_stats::{IntMean, IntSum, IntSumOfSquares, IntVariance};
pub use long_stats::{LongMean, LongSum, LongSumOfSquares, LongVariance};

/// Exact mean of an integer sum as quotient plus fractional remainder.
///
/// More accurate than `sum as f64 / n as f64` when the sum is large: the
/// quotient is exact up to 2^53 and the remainder term is below 1.
pub(crate) fn mean_of_sum(sum: i128, n: u64) -> f64 {
    if n == 0 {
        return f64::NAN;
    }
    let n = i128::from(n);
    let q = sum.div_euclid(n);
    let r = sum.rem_euclid(n);
    q as f64 + r as f64 / n as f64
}
