//! JSON schema for recorded solver test cases.
//!
//! A fixture file is an array of cases, each carrying a problem payload,
//! its expected answer, and optionally one sensitivity analysis with its
//! expected outcome (an answer or a failure kind):
//!
//! ```json
//! [{
//!   "simpleData": {
//!     "a": [[1.0, 2.0], [2.0, 1.0]],
//!     "b": [6.0, 8.0],
//!     "c": [3.0, 2.0],
//!     "functionType": "MAX",
//!     "inequalities": ["<=", "<="]
//!   },
//!   "simplexAnswer": { "x": [3.3333333333333335, 1.3333333333333333],
//!                      "fx": 12.666666666666666 },
//!   "analysisType": "add_constraint",
//!   "addConstraint": { "ai": [1.0, 0.0], "inequality": "<=", "bi": 3.0 },
//!   "analysisAnswer": { "x": [3.0, 1.5], "fx": 12.0 }
//! }]
//! ```

use crate::answer::Answer;
use crate::builder::SimplexBuilder;
use crate::inequality::Inequality;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Error type for fixture loading.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error when reading the fixture file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid fixture JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which sensitivity analysis a case exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    /// Append a constraint to the solved tableau.
    AddConstraint,
    /// Replace right-hand-side entries of the solved tableau.
    ChangeB,
}

/// Serialised form of one appended constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintFixture {
    /// Coefficients over the original variables.
    pub ai: Vec<f64>,
    /// Relation symbol.
    pub inequality: Inequality,
    /// Right-hand side.
    pub bi: f64,
}

/// One recorded test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureCase {
    /// The problem, as a builder payload.
    pub simple_data: SimplexBuilder,
    /// Expected answer of the plain solve, absent when the solve itself is
    /// expected to fail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simplex_answer: Option<Answer>,
    /// The analysis this case exercises, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_type: Option<AnalysisKind>,
    /// Full replacement B vector for a `change_b` analysis, applied entry
    /// by entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_b: Option<Vec<f64>>,
    /// Constraint for an `add_constraint` analysis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_constraint: Option<ConstraintFixture>,
    /// Expected answer of the analysis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_answer: Option<Answer>,
    /// Expected failure kind (see [`SimplexError::kind`]) when the case is
    /// expected to fail instead of producing an answer.
    ///
    /// [`SimplexError::kind`]: crate::SimplexError::kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception_class: Option<String>,
    /// Expected substring of the failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception_message: Option<String>,
}

/// Loads an array of fixture cases from a JSON file.
///
/// # Errors
///
/// [`FixtureError`] when the file cannot be read or parsed.
pub fn load_cases(path: impl AsRef<Path>) -> Result<Vec<FixtureCase>, FixtureError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
