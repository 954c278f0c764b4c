//! Pairwise merging of independently built accumulators.
//!
//! The joint central moments of two disjoint partitions have closed-form
//! decompositions in terms of each partition's count, mean and lower moment
//! sums (Chan, Golub & LeVeque for the second moment; the same telescoping
//! applied to the third and fourth). Merging reads only moments and counts,
//! never per-update scratch state, so any tree of combines over partitions of
//! a dataset reproduces the single-pass result to within a few ulp.

use super::{Moments, Order};

impl Moments {
    /// Merges `other` into `self` and returns the receiver.
    ///
    /// Both operands must maintain the same [`Order`]; callers reconcile
    /// mismatched accumulators before merging.
    pub fn combine(&mut self, other: &Self) -> &mut Self {
        debug_assert!(
            self.order == other.order,
            "combine requires accumulators of the same order"
        );
        if other.n == 0 {
            return self;
        }
        if self.n == 0 {
            *self = other.clone();
            return self;
        }

        let n1 = self.n as f64;
        let n2 = other.n as f64;
        let n = n1 + n2;
        let delta = other.m1 - self.m1;

        // Higher sums first: each decomposition reads the pre-merge lower
        // sums of both operands.
        if self.order >= Order::Fourth {
            let d2 = delta * delta;
            self.s4 += other.s4
                + d2 * d2 * n1 * n2 * (n1 * n1 - n1 * n2 + n2 * n2) / (n * n * n)
                + 6.0 * d2 * (n1 * n1 * other.s2 + n2 * n2 * self.s2) / (n * n)
                + 4.0 * delta * (n1 * other.s3 - n2 * self.s3) / n;
        }
        if self.order >= Order::Third {
            self.s3 += other.s3
                + delta * delta * delta * n1 * n2 * (n1 - n2) / (n * n)
                + 3.0 * delta * (n1 * other.s2 - n2 * self.s2) / n;
        }
        if self.order >= Order::Second {
            self.s2 += other.s2 + delta * delta * n1 * n2 / n;
        }

        // Fork-join reduction repeatedly splits in half, so the equal-size
        // fast path carries real accuracy weight.
        self.m1 = if self.n == other.n {
            (self.m1 + other.m1) * 0.5
        } else {
            self.m1 + delta * n2 / n
        };
        self.non_finite += other.non_finite;
        self.n += other.n;
        self
    }
}
