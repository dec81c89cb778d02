//! Floating-point comparison with tolerance.
//!
//! All feasibility checks, basis-value tests and answer comparisons in this
//! crate go through these helpers instead of `==` on `f64`.

/// Tolerance below which two floating-point values are considered equal.
///
/// Also exposed as [`Simplex::EPSILON`](crate::Simplex::EPSILON).
pub const EPSILON: f64 = 1e-9;

/// Tolerance for reduced-cost sign tests during pivoting.
///
/// Looser than [`EPSILON`]: reduced costs carry cancellation residue from
/// the big-M penalty terms, so a column only counts as improving when its
/// reduced cost clears this margin.
pub(crate) const REDUCED_COST_TOLERANCE: f64 = 1e-7;

/// Returns true when `a` and `b` differ by at most `eps`.
#[must_use]
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

/// Returns true when `value` is within `eps` of zero.
#[must_use]
pub fn approx_zero(value: f64, eps: f64) -> bool {
    value.abs() <= eps
}

/// Pointwise [`approx_eq`] over two slices of equal length.
#[must_use]
pub fn slice_approx_eq(a: &[f64], b: &[f64], eps: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| approx_eq(x, y, eps))
}
