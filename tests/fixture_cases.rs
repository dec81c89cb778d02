//! Runs the recorded JSON fixture cases end to end.

use lp_simplex::fixtures::{self, AnalysisKind, FixtureCase};
use lp_simplex::{Answer, SimplexResult};
use std::path::PathBuf;

fn data_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

fn run_analysis(case: &FixtureCase) -> Option<SimplexResult<Answer>> {
    let mut simplex = case.simple_data.clone().build().unwrap();
    let root = simplex.solve().unwrap();
    if let Some(expected) = &case.simplex_answer {
        assert!(
            root.approx_eq(expected),
            "root answer {root:?} differs from recorded {expected:?}"
        );
    }

    match case.analysis_type? {
        AnalysisKind::AddConstraint => {
            let constraint = case.add_constraint.as_ref().expect("constraint payload");
            Some(simplex.add_constraint(&constraint.ai, constraint.inequality, constraint.bi))
        }
        AnalysisKind::ChangeB => {
            let b = case.change_b.as_ref().expect("changeB payload");
            let mut last = None;
            for (row, &value) in b.iter().enumerate() {
                match simplex.change_b(row, value) {
                    Ok(answer) => last = Some(Ok(answer)),
                    Err(err) => return Some(Err(err)),
                }
            }
            last
        }
    }
}

#[test]
fn test_recorded_add_constraint_cases() {
    let cases = fixtures::load_cases(data_file("add_constraint.json")).unwrap();
    assert!(!cases.is_empty());

    for (index, case) in cases.iter().enumerate() {
        let Some(outcome) = run_analysis(case) else {
            continue;
        };
        match (&case.exception_class, outcome) {
            (Some(kind), Err(err)) => {
                assert_eq!(
                    err.kind(),
                    kind,
                    "case {index}: expected {kind} failure, got {err}"
                );
                if let Some(message) = &case.exception_message {
                    assert!(
                        err.to_string().contains(message),
                        "case {index}: message {err} does not contain {message}"
                    );
                }
            }
            (Some(kind), Ok(answer)) => {
                panic!("case {index}: expected {kind} failure, got answer {answer:?}");
            }
            (None, Ok(answer)) => {
                let expected = case
                    .analysis_answer
                    .as_ref()
                    .expect("analysis answer payload");
                assert!(
                    answer.approx_eq(expected),
                    "case {index}: answer {answer:?} differs from recorded {expected:?}"
                );
            }
            (None, Err(err)) => panic!("case {index}: unexpected failure {err}"),
        }
    }
}
