//! Local midpoint-rule accumulation of `1 / (1 + x^2)`.

use crate::algs::partition::IterationRange;

/// Integrand at the midpoint of interval `i` (1-based) out of `n`.
#[inline]
pub fn kernel(i: u64, n: u64) -> f64 {
    let x = (i as f64 - 0.5) / n as f64;
    1.0 / (1.0 + x * x)
}

/// Sum [`kernel`] over `range` in increasing index order.
///
/// The fixed order keeps the result bit-for-bit reproducible for a given
/// range. An empty range contributes `0.0`.
pub fn partial_sum(range: &IterationRange, iterations: u64) -> f64 {
    if range.is_empty() {
        return 0.0;
    }
    debug_assert!(iterations > 0, "non-empty range over zero iterations");
    range.iter().fold(0.0, |acc, i| acc + kernel(i, iterations))
}
