//! Property-based tests for the solver.
//!
//! This module tests:
//! - Feasibility and objective invariants of solved programs
//! - Warm-restart equivalence against freshly built tableaus
//! - Inequality tag algebra

use lp_simplex::{FunctionType, Inequality, SimplexBuilder, SimplexError};
use proptest::collection::vec;
use proptest::prelude::*;

const TOLERANCE: f64 = 1e-6;

/// Strategy for small constraint coefficients.
fn coeff_strategy() -> impl Strategy<Value = f64> {
    (-10i64..=10).prop_map(|v| v as f64)
}

/// Strategy for positive right-hand sides.
fn rhs_strategy() -> impl Strategy<Value = f64> {
    (1i64..=100).prop_map(|v| v as f64)
}

/// Strategy for non-zero objective coefficients.
fn objective_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![(-5i64..=-1).prop_map(|v| v as f64), (1i64..=5).prop_map(|v| v as f64)]
}

fn tag_strategy() -> impl Strategy<Value = Inequality> {
    prop_oneof![
        Just(Inequality::Eq),
        Just(Inequality::Lq),
        Just(Inequality::Le),
        Just(Inequality::Ge),
        Just(Inequality::Gr),
    ]
}

/// A random `<=` system with positive right-hand sides: the origin is
/// always feasible, so only optimal and unbounded outcomes occur.
fn problem_strategy() -> impl Strategy<Value = (Vec<Vec<f64>>, Vec<f64>, Vec<f64>, FunctionType)> {
    (1usize..=4, 1usize..=4).prop_flat_map(|(m, n)| {
        (
            vec(vec(coeff_strategy(), n), m),
            vec(rhs_strategy(), m),
            vec(objective_strategy(), n),
            prop_oneof![Just(FunctionType::Min), Just(FunctionType::Max)],
        )
    })
}

fn satisfies(a: &[Vec<f64>], b: &[f64], x: &[f64]) -> bool {
    a.iter().zip(b).all(|(row, &bi)| {
        let lhs: f64 = row.iter().zip(x).map(|(&c, &v)| c * v).sum();
        lhs <= bi + TOLERANCE
    })
}

proptest! {
    /// A reported optimum satisfies every constraint, keeps the variables
    /// non-negative, and its fx matches the objective at X.
    #[test]
    fn prop_solved_lp_is_feasible((a, b, c, function_type) in problem_strategy()) {
        let result = SimplexBuilder::new()
            .with_a(a.clone())
            .with_b(b.clone())
            .with_c(c.clone())
            .with_function_type(function_type)
            .build()
            .unwrap()
            .solve();

        match result {
            Ok(answer) => {
                prop_assert!(satisfies(&a, &b, answer.x()));
                for &xi in answer.x() {
                    prop_assert!(xi >= -TOLERANCE);
                }
                let fx: f64 = c.iter().zip(answer.x()).map(|(&ci, &xi)| ci * xi).sum();
                prop_assert!((fx - answer.fx()).abs() < TOLERANCE);
            }
            Err(SimplexError::Unbounded(_)) => {}
            Err(err) => prop_assert!(false, "unexpected failure: {err}"),
        }
    }

    /// Appending a constraint to a solved tableau gives the same optimum
    /// as building the extended program from scratch. (The vertices may
    /// differ between equally-optimal bases, so objective values are
    /// compared.)
    #[test]
    fn prop_add_constraint_matches_fresh(
        (a, b, c, function_type) in problem_strategy(),
        ai in vec(coeff_strategy(), 4),
        bi in rhs_strategy(),
    ) {
        let n = c.len();
        let ai = &ai[..n];

        let mut warm = SimplexBuilder::new()
            .with_a(a.clone())
            .with_b(b.clone())
            .with_c(c.clone())
            .with_function_type(function_type)
            .build()
            .unwrap();
        prop_assume!(warm.solve().is_ok());
        let warm_answer = warm.add_constraint(ai, Inequality::Lq, bi);

        let mut extended_a = a.clone();
        extended_a.push(ai.to_vec());
        let mut extended_b = b.clone();
        extended_b.push(bi);
        let fresh_answer = SimplexBuilder::new()
            .with_a(extended_a)
            .with_b(extended_b)
            .with_c(c.clone())
            .with_function_type(function_type)
            .build()
            .unwrap()
            .solve();

        match (warm_answer, fresh_answer) {
            (Ok(warm), Ok(fresh)) => {
                prop_assert!(
                    (warm.fx() - fresh.fx()).abs() < TOLERANCE,
                    "warm {} vs fresh {}", warm.fx(), fresh.fx()
                );
            }
            (Err(SimplexError::Difficult(_)), _) | (_, Err(SimplexError::Difficult(_))) => {}
            (warm, fresh) => prop_assert!(
                false,
                "outcomes diverge: warm {warm:?} vs fresh {fresh:?}"
            ),
        }
    }

    /// Replacing one right-hand side of a solved tableau gives the same
    /// optimum as building the edited program from scratch.
    #[test]
    fn prop_change_b_matches_fresh(
        (a, b, c, function_type) in problem_strategy(),
        row_seed in 0usize..4,
        value in rhs_strategy(),
    ) {
        let row = row_seed % b.len();

        let mut warm = SimplexBuilder::new()
            .with_a(a.clone())
            .with_b(b.clone())
            .with_c(c.clone())
            .with_function_type(function_type)
            .build()
            .unwrap();
        prop_assume!(warm.solve().is_ok());
        let warm_answer = warm.change_b(row, value);

        let mut edited_b = b.clone();
        edited_b[row] = value;
        let fresh_answer = SimplexBuilder::new()
            .with_a(a.clone())
            .with_b(edited_b)
            .with_c(c.clone())
            .with_function_type(function_type)
            .build()
            .unwrap()
            .solve();

        match (warm_answer, fresh_answer) {
            (Ok(warm), Ok(fresh)) => {
                prop_assert!(
                    (warm.fx() - fresh.fx()).abs() < TOLERANCE,
                    "warm {} vs fresh {}", warm.fx(), fresh.fx()
                );
            }
            (Err(SimplexError::Difficult(_)), _) | (_, Err(SimplexError::Difficult(_))) => {}
            (warm, fresh) => prop_assert!(
                false,
                "outcomes diverge: warm {warm:?} vs fresh {fresh:?}"
            ),
        }
    }

    /// Tag inversion is an involution.
    #[test]
    fn prop_inversion_involution(tag in tag_strategy()) {
        prop_assert_eq!(tag.inversion().inversion(), tag);
    }
}
