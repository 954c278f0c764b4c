//! Streaming descriptive statistics with exact integer accumulation.
//!
//! Two families of accumulators share one surface:
//!
//! - **Floating point moments** ([`Moments`] and the statistics built on it:
//!   [`Mean`], [`Variance`], [`StandardDeviation`], [`Skewness`],
//!   [`Kurtosis`], [`GeometricMean`]). One pass, constant memory, a
//!   half-scaled mean representation that cannot overflow, and closed-form
//!   pairwise [`Moments::combine`] so partial results from disjoint chunks
//!   merge into the whole.
//! - **Exact integer statistics** ([`IntSum`], [`LongVariance`] and friends)
//!   that accumulate sums and sums of squares in fixed-width multi-limb
//!   integers and round once at the final read.
//!
//! Every accumulator implements [`Accumulator`]: feed values with `accept`,
//! merge partials with `combine`, read with `as_f64` or the narrowing
//! `try_as_*` readers. Undefined statistics read NaN; narrowing failures
//! report [`ConvertError`].
//!
//! ```
//! use momenta::{Accumulator, Variance};
//!
//! let mut acc = Variance::new(false);
//! for x in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
//!     acc.accept(x);
//! }
//! let mut rest = Variance::new(false);
//! rest.accept(6.0);
//! acc.combine(&rest);
//! assert!(acc.as_f64() > 0.0);
//! ```

mod display;
mod error;
mod exact;
mod moments;
mod statistics;
mod wide;

pub use crate::display::Summary;
pub use crate::error::ConvertError;
pub use crate::exact::{
    IntMean, IntSum, IntSumOfSquares, IntVariance, LongMean, LongSum, LongSumOfSquares,
    LongVariance,
};
pub use crate::moments::{Moments, Order};
pub use crate::statistics::{
    Accumulator, GeometricMean, Kurtosis, Mean, Product, Skewness, StandardDeviation, Sum,
    SumOfLogs, Variance,
};
pub use crate::wide::{Int128, UInt128, UInt192, UInt96};
