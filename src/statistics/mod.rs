//! Streaming statistic accumulators.
//!
//! Every statistic here is an independently owned accumulator: feed it one
//! value at a time with [`Accumulator::accept`], build it from a slice with
//! the two-pass `of` constructors, or merge independently built partials with
//! [`Accumulator::combine`]. Undefined statistics (insufficient observations,
//! poisoned non-finite state) read as NaN rather than erroring; narrowing
//! reads report [`ConvertError`](crate::ConvertError).

mod geometric_mean;
mod kurtosis;
mod mean;
mod skewness;
mod sums;
mod variance;

pub use geometric_mean::{GeometricMean, SumOfLogs};
pub use kurtosis::Kurtosis;
pub use mean::Mean;
pub use skewness::Skewness;
pub use sums::{Product, Sum};
pub use variance::{StandardDeviation, Variance};

pub(crate) use kurtosis::kurtosis_of;
pub(crate) use skewness::skewness_of;
pub(crate) use variance::variance_of;

use crate::error::ConvertError;

/// A mergeable single-pass statistic over observations of type `T`.
pub trait Accumulator<T> {
    /// Adds one observation.
    fn accept(&mut self, value: T);

    /// Merges `other` into `self` and returns the receiver. The argument is
    /// read-only; both operands must carry compatible configuration.
    fn combine(&mut self, other: &Self) -> &mut Self;

    /// Current value of the statistic.
    fn as_f64(&self) -> f64;

    /// Current value narrowed to `i64`, truncating any fractional part.
    ///
    /// # Errors
    /// [`ConvertError::NonFinite`] for NaN or infinite results,
    /// [`ConvertError::Overflow`] when out of range. Integer-exact statistics
    /// override this with a bit-exact conversion.
    fn try_as_i64(&self) -> Result<i64, ConvertError> {
        let v = self.as_f64();
        if !v.is_finite() {
            return Err(ConvertError::NonFinite);
        }
        // i64::MAX rounds up to 2^63 in f64, so >= catches the boundary
        if v < i64::MIN as f64 || v >= i64::MAX as f64 {
            return Err(ConvertError::Overflow);
        }
        Ok(v as i64)
    }

    /// Current value narrowed to `i32`; same contract as
    /// [`try_as_i64`](Accumulator::try_as_i64).
    fn try_as_i32(&self) -> Result<i32, ConvertError> {
        let v = self.try_as_i64()?;
        i32::try_from(v).map_err(|_| ConvertError::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrowing_defaults_check_range_and_finiteness() {
        let mut s = Sum::<f64>::new();
        s.accept(1.5e19);
        assert_eq!(s.try_as_i64(), Err(ConvertError::Overflow));

        let mut m = Mean::new();
        assert_eq!(m.try_as_i64(), Err(ConvertError::NonFinite));
        m.accept(4.7);
        assert_eq!(m.try_as_i64(), Ok(4));
        assert_eq!(m.try_as_i32(), Ok(4));
    }
}
