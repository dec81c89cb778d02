//! Solver result record.

use crate::numeric::{self, EPSILON};
use serde::{Deserialize, Serialize};

/// An optimal assignment of the decision vector together with the objective
/// value at that point.
///
/// `x` has the length of the original variable vector; free variables are
/// already recomposed from their non-negative parts. `fx` is re-evaluated
/// from the original objective coefficients, so it carries no internal sign
/// convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    x: Vec<f64>,
    fx: f64,
}

impl Answer {
    pub(crate) fn new(x: Vec<f64>, fx: f64) -> Self {
        Self { x, fx }
    }

    /// The optimal decision vector.
    #[must_use]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// The objective value at [`x`](Answer::x).
    #[must_use]
    pub fn fx(&self) -> f64 {
        self.fx
    }

    /// Pointwise comparison of two answers within
    /// [`EPSILON`](crate::Simplex::EPSILON).
    #[must_use]
    pub fn approx_eq(&self, other: &Answer) -> bool {
        numeric::slice_approx_eq(&self.x, &other.x, EPSILON)
            && numeric::approx_eq(self.fx, other.fx, EPSILON)
    }
}
