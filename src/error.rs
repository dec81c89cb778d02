//! Solver failure taxonomy.

/// Errors raised while building or solving a linear program.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SimplexError {
    /// Malformed input: missing array, mismatched lengths, non-finite
    /// entries. Raised before any numerical work.
    #[error("Invalid problem data: {0}")]
    Data(String),

    /// The program has no feasible point, or a warm restart rendered the
    /// system infeasible.
    #[error("Problem is infeasible: {0}")]
    Infeasible(String),

    /// The objective is unbounded in the feasible direction.
    #[error("Objective is unbounded: {0}")]
    Unbounded(String),

    /// The iteration budget was exhausted, or dual recovery stalled;
    /// suggests degeneracy or numerical trouble.
    #[error("Solve did not converge: {0}")]
    Difficult(String),
}

impl SimplexError {
    /// Stable lower-case name of the failure kind, used by recorded test
    /// fixtures to identify expected errors.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Data(_) => "data",
            Self::Infeasible(_) => "infeasible",
            Self::Unbounded(_) => "unbounded",
            Self::Difficult(_) => "difficult",
        }
    }
}

/// Result type for solver operations.
pub type SimplexResult<T> = Result<T, SimplexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_detail() {
        let err = SimplexError::Data("B vector is missing".into());
        assert!(err.to_string().contains("B vector is missing"));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(SimplexError::Infeasible(String::new()).kind(), "infeasible");
        assert_eq!(SimplexError::Unbounded(String::new()).kind(), "unbounded");
        assert_eq!(SimplexError::Difficult(String::new()).kind(), "difficult");
        assert_eq!(SimplexError::Data(String::new()).kind(), "data");
    }
}
