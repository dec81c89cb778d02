//! Problem description and validation.

use crate::error::{SimplexError, SimplexResult};
use crate::inequality::Inequality;
use crate::simplex::Simplex;
use serde::{Deserialize, Serialize};

/// Direction of the objective function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FunctionType {
    /// Minimise the objective (the default).
    #[default]
    #[serde(rename = "MIN")]
    Min,
    /// Maximise the objective.
    #[serde(rename = "MAX")]
    Max,
}

/// Fluent builder for a linear program.
///
/// Accumulates the coefficient matrix `A`, right-hand sides `B`, objective
/// coefficients `C`, per-row [`Inequality`] tags, the objective direction
/// and the per-variable sign flags, then validates the lot in
/// [`build`](SimplexBuilder::build).
///
/// Defaults when a field is left unset: all rows `<=`, objective `MIN`,
/// all variables non-negative. `A`, `B` and `C` are mandatory.
///
/// The builder is also the serialised problem payload of recorded test
/// fixtures, hence the serde derives.
///
/// # Examples
///
/// ```
/// use lp_simplex::{FunctionType, SimplexBuilder};
///
/// let answer = SimplexBuilder::new()
///     .with_a(vec![vec![1.0, 2.0], vec![2.0, 1.0]])
///     .with_b(vec![6.0, 8.0])
///     .with_c(vec![3.0, 2.0])
///     .with_function_type(FunctionType::Max)
///     .build()
///     .unwrap()
///     .solve()
///     .unwrap();
/// assert!((answer.fx() - 38.0 / 3.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimplexBuilder {
    #[serde(skip_serializing_if = "Option::is_none")]
    a: Option<Vec<Vec<f64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    b: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    c: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inequalities: Option<Vec<Inequality>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_type: Option<FunctionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    normalized_x: Option<Vec<bool>>,
}

impl SimplexBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the m×n constraint coefficient matrix.
    #[must_use]
    pub fn with_a(mut self, a: Vec<Vec<f64>>) -> Self {
        self.a = Some(a);
        self
    }

    /// Sets the right-hand-side vector of length m.
    #[must_use]
    pub fn with_b(mut self, b: Vec<f64>) -> Self {
        self.b = Some(b);
        self
    }

    /// Sets the objective coefficient vector of length n.
    #[must_use]
    pub fn with_c(mut self, c: Vec<f64>) -> Self {
        self.c = Some(c);
        self
    }

    /// Sets the per-row constraint relations.
    #[must_use]
    pub fn with_inequalities(mut self, inequalities: Vec<Inequality>) -> Self {
        self.inequalities = Some(inequalities);
        self
    }

    /// Sets the objective direction.
    #[must_use]
    pub fn with_function_type(mut self, function_type: FunctionType) -> Self {
        self.function_type = Some(function_type);
        self
    }

    /// Sets the per-variable sign flags: `true` asserts `x_i >= 0`, `false`
    /// marks the variable as free (it is split into a difference of two
    /// non-negative parts during canonicalisation).
    #[must_use]
    pub fn with_normalized_x(mut self, normalized_x: Vec<bool>) -> Self {
        self.normalized_x = Some(normalized_x);
        self
    }

    /// The constraint matrix, if set.
    #[must_use]
    pub fn a(&self) -> Option<&[Vec<f64>]> {
        self.a.as_deref()
    }

    /// The right-hand-side vector, if set.
    #[must_use]
    pub fn b(&self) -> Option<&[f64]> {
        self.b.as_deref()
    }

    /// The objective coefficients, if set.
    #[must_use]
    pub fn c(&self) -> Option<&[f64]> {
        self.c.as_deref()
    }

    /// The constraint relations, if set.
    #[must_use]
    pub fn inequalities(&self) -> Option<&[Inequality]> {
        self.inequalities.as_deref()
    }

    /// The objective direction, if set.
    #[must_use]
    pub fn function_type(&self) -> Option<FunctionType> {
        self.function_type
    }

    /// The per-variable sign flags, if set.
    #[must_use]
    pub fn normalized_x(&self) -> Option<&[bool]> {
        self.normalized_x.as_deref()
    }

    /// Validates the accumulated data and canonicalises it into a
    /// [`Simplex`] tableau.
    ///
    /// # Errors
    ///
    /// [`SimplexError::Data`] naming the offending array when a mandatory
    /// field is missing, a length disagrees, or an entry is not finite.
    pub fn build(self) -> SimplexResult<Simplex> {
        let a = self
            .a
            .ok_or_else(|| SimplexError::Data("A matrix is missing".into()))?;
        let b = self
            .b
            .ok_or_else(|| SimplexError::Data("B vector is missing".into()))?;
        let c = self
            .c
            .ok_or_else(|| SimplexError::Data("C vector is missing".into()))?;

        let m = b.len();
        let n = c.len();
        if m == 0 {
            return Err(SimplexError::Data("B vector is empty".into()));
        }
        if n == 0 {
            return Err(SimplexError::Data("C vector is empty".into()));
        }
        if a.len() != m {
            return Err(SimplexError::Data(format!(
                "A matrix has {} rows, B vector has {m} entries",
                a.len()
            )));
        }
        for (i, row) in a.iter().enumerate() {
            if row.len() != n {
                return Err(SimplexError::Data(format!(
                    "A matrix row {i} has length {}, C vector has length {n}",
                    row.len()
                )));
            }
        }
        check_finite("A matrix", a.iter().flatten())?;
        check_finite("B vector", b.iter())?;
        check_finite("C vector", c.iter())?;

        let inequalities = self.inequalities.unwrap_or_else(|| vec![Inequality::Lq; m]);
        if inequalities.len() != m {
            return Err(SimplexError::Data(format!(
                "inequalities has {} entries, B vector has {m}",
                inequalities.len()
            )));
        }

        let normalized_x = self.normalized_x.unwrap_or_else(|| vec![true; n]);
        if normalized_x.len() != n {
            return Err(SimplexError::Data(format!(
                "normalizedX has {} entries, C vector has {n}",
                normalized_x.len()
            )));
        }

        let function_type = self.function_type.unwrap_or_default();

        Ok(Simplex::canonicalize(
            &a,
            &b,
            &c,
            &inequalities,
            function_type,
            &normalized_x,
        ))
    }
}

fn check_finite<'a>(name: &str, values: impl Iterator<Item = &'a f64>) -> SimplexResult<()> {
    for &v in values {
        if !v.is_finite() {
            return Err(SimplexError::Data(format!("{name} contains {v}")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> SimplexBuilder {
        SimplexBuilder::new()
            .with_a(vec![vec![1.0, 1.0]])
            .with_b(vec![4.0])
            .with_c(vec![1.0, 2.0])
    }

    #[test]
    fn test_defaults_fill_in() {
        let builder = base();
        assert!(builder.inequalities().is_none());
        assert!(builder.function_type().is_none());
        assert!(builder.clone().build().is_ok());
    }

    #[test]
    fn test_missing_arrays_rejected() {
        let err = SimplexBuilder::new().build().unwrap_err();
        assert!(matches!(err, SimplexError::Data(_)));
        assert!(err.to_string().contains("A matrix"));

        let err = SimplexBuilder::new()
            .with_a(vec![vec![1.0]])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("B vector"));
    }

    #[test]
    fn test_shape_mismatches_rejected() {
        let err = base().with_b(vec![1.0, 2.0]).build().unwrap_err();
        assert!(matches!(err, SimplexError::Data(_)));

        let err = base()
            .with_inequalities(vec![Inequality::Lq, Inequality::Ge])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("inequalities"));

        let err = base().with_normalized_x(vec![true]).build().unwrap_err();
        assert!(err.to_string().contains("normalizedX"));
    }

    #[test]
    fn test_non_finite_entries_rejected() {
        let err = base().with_b(vec![f64::NAN]).build().unwrap_err();
        assert!(err.to_string().contains("B vector"));

        let err = base().with_c(vec![1.0, f64::INFINITY]).build().unwrap_err();
        assert!(err.to_string().contains("C vector"));
    }

    #[test]
    fn test_serde_round_trip() {
        let builder = base()
            .with_function_type(FunctionType::Max)
            .with_inequalities(vec![Inequality::Ge]);
        let json = serde_json::to_string(&builder).unwrap();
        assert!(json.contains("\"functionType\":\"MAX\""));
        assert!(json.contains("\">=\""));
        let back: SimplexBuilder = serde_json::from_str(&json).unwrap();
        assert_eq!(back.b(), builder.b());
        assert_eq!(back.function_type(), Some(FunctionType::Max));
    }
}
