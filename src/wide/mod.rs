//! Fixed-width multi-limb integer accumulators.
//!
//! These types compute exact sums and sums of squares for integral inputs
//! without arbitrary-precision allocation. Each value is a tuple of native
//! limbs representing `Σ limbᵢ · 2^(32·i)` (or `2^(64·i)`); addition carries
//! explicitly and never drops bits within the declared width.
//!
//! Widths are chosen so that overflow is impossible for the accumulation
//! patterns in this crate: a squared `i64` fits in 128 bits, and a sum of up
//! to 2^63 such squares fits in 192 bits. The narrower helper operations
//! (`unsigned_multiply`, `subtract`) are exact only under documented bounds
//! that their callers prove.

mod int128;
mod uint128;
mod uint192;
mod uint96;

pub use int128::Int128;
pub use uint128::UInt128;
pub use uint192::UInt192;
pub use uint96::UInt96;

/// Round-half-even conversion of `hi·2^128 + mid·2^64 + lo` to the nearest
/// `f64`.
///
/// Locates the most significant 54 bits (53-bit significand plus a guard
/// bit), folds every discarded low-order bit into a sticky flag, and applies
/// IEEE-754 round-half-to-even by assembling the result from raw bits. For
/// values of 128 bits or fewer this matches Rust's native `u128 as f64` cast
/// bit for bit.
pub(crate) fn f64_from_limbs(hi: u64, mid: u64, lo: u64) -> f64 {
    let bits = if hi != 0 {
        192 - hi.leading_zeros()
    } else if mid != 0 {
        128 - mid.leading_zeros()
    } else {
        64 - lo.leading_zeros()
    };
    if bits <= 53 {
        // bits <= 53 implies hi == mid == 0; the value is exact in f64
        return lo as f64;
    }

    let shift = bits - 54;
    let (top54, sticky) = if shift == 0 {
        // exactly 54 bits: the whole value sits in `lo`, nothing discarded
        (lo, false)
    } else {
        shift_right_sticky(hi, mid, lo, shift)
    };

    let guard = top54 & 1;
    let truncated = top54 >> 1;
    let round_up = guard == 1 && (sticky || truncated & 1 == 1);
    let mut sig = truncated + u64::from(round_up);
    let mut exp = shift + 1;
    if sig == 1 << 53 {
        // rounding carried into a new bit
        sig >>= 1;
        exp += 1;
    }

    // value = sig · 2^exp with sig in [2^52, 2^53)
    let biased = u64::from(1023 + 52 + exp);
    f64::from_bits((biased << 52) | (sig & ((1u64 << 52) - 1)))
}

/// `value >> s` (guaranteed by the caller to fit in 54 bits) plus a sticky
/// flag that is set if any shifted-out bit was non-zero. Requires `s >= 1`.
fn shift_right_sticky(hi: u64, mid: u64, lo: u64, s: u32) -> (u64, bool) {
    debug_assert!(s >= 1);
    if s >= 128 {
        let t = s - 128;
        let kept = hi >> t;
        let sticky = mid != 0 || lo != 0 || hi & ((1u64 << t) - 1) != 0;
        (kept, sticky)
    } else if s >= 64 {
        // `lo` is entirely discarded; the kept window lives in (hi, mid)
        let t = s - 64;
        let upper = ((hi as u128) << 64) | u128::from(mid);
        let kept = (upper >> t) as u64;
        let sticky = lo != 0 || upper & ((1u128 << t) - 1) != 0;
        (kept, sticky)
    } else {
        // s < 64 implies the value has at most 117 bits, so hi == 0
        debug_assert_eq!(hi, 0);
        let lower = ((mid as u128) << 64) | u128::from(lo);
        let kept = (lower >> s) as u64;
        let sticky = lower & ((1u128 << s) - 1) != 0;
        (kept, sticky)
    }
}
