//! Discrete optimisation over the simplex engine.
//!
//! Branch and bound in the manner of Land and Doig: each node solves an LP
//! relaxation through the warm-restart operators of [`Simplex`], branches
//! on the first variable whose value falls outside its discrete set, and
//! prunes against a shared incumbent. The lower branch of every node runs
//! as a parallel task; the upper branch reuses the parent tableau in place.

use crate::answer::Answer;
use crate::builder::{FunctionType, SimplexBuilder};
use crate::error::{SimplexError, SimplexResult};
use crate::inequality::Inequality;
use crate::numeric::{self, EPSILON};
use crate::simplex::Simplex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, trace};

/// Membership, round-down and round-up of one variable's discrete set.
///
/// The three operations must agree: for any `v`, `round_down(v) <= v <=
/// round_up(v)` and both bounds satisfy [`is_valid`](DiscreteDomain::is_valid).
pub trait DiscreteDomain: Send + Sync {
    /// Whether `value` belongs to the discrete set.
    fn is_valid(&self, value: f64) -> bool;
    /// The largest member of the set not above `value`.
    fn round_down(&self, value: f64) -> f64;
    /// The smallest member of the set not below `value`.
    fn round_up(&self, value: f64) -> f64;
}

/// The integers, with [`EPSILON`](Simplex::EPSILON)-tolerant membership.
/// This is the default domain of [`DiscreteSimplex::solve`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerDomain;

impl DiscreteDomain for IntegerDomain {
    fn is_valid(&self, value: f64) -> bool {
        numeric::approx_eq(value, value.round(), EPSILON)
    }

    fn round_down(&self, value: f64) -> f64 {
        value.floor()
    }

    fn round_up(&self, value: f64) -> f64 {
        value.ceil()
    }
}

/// Multiples of a fixed positive step, e.g. `StepDomain::new(0.25)` for
/// quarter-unit lots.
#[derive(Debug, Clone, Copy)]
pub struct StepDomain {
    step: f64,
}

impl StepDomain {
    /// Creates a domain of all integer multiples of `step`.
    ///
    /// # Panics
    ///
    /// Panics when `step` is not strictly positive and finite.
    #[must_use]
    pub fn new(step: f64) -> Self {
        assert!(
            step > 0.0 && step.is_finite(),
            "step must be strictly positive and finite"
        );
        Self { step }
    }
}

impl DiscreteDomain for StepDomain {
    fn is_valid(&self, value: f64) -> bool {
        let multiple = (value / self.step).round() * self.step;
        numeric::approx_eq(value, multiple, EPSILON)
    }

    fn round_down(&self, value: f64) -> f64 {
        (value / self.step).floor() * self.step
    }

    fn round_up(&self, value: f64) -> f64 {
        (value / self.step).ceil() * self.step
    }
}

type ErrorHandler = Arc<dyn Fn(&SimplexError) + Send + Sync>;

/// Parallel branch-and-bound driver for discrete linear programs.
///
/// Failures inside branch subtrees (an infeasible subproblem is the normal
/// way a branch dies) are routed to the exception handler and the subtree
/// is pruned; only failures of the root relaxation surface directly.
///
/// # Examples
///
/// ```
/// use lp_simplex::{DiscreteSimplex, FunctionType, SimplexBuilder};
///
/// let builder = SimplexBuilder::new()
///     .with_a(vec![vec![1.0, 2.0], vec![2.0, 1.0]])
///     .with_b(vec![6.0, 8.0])
///     .with_c(vec![3.0, 2.0])
///     .with_function_type(FunctionType::Max);
///
/// let answer = DiscreteSimplex::new().solve(&builder).unwrap();
/// assert!((answer.fx() - 12.0).abs() < 1e-6);
/// ```
pub struct DiscreteSimplex {
    handler: ErrorHandler,
}

impl Default for DiscreteSimplex {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscreteSimplex {
    /// Creates a driver whose exception handler writes failure messages to
    /// standard error.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handler: Arc::new(|err| eprintln!("{err}")),
        }
    }

    /// Installs a callback receiving every failure raised inside a branch
    /// subtree.
    pub fn set_exception_handler(
        &mut self,
        handler: impl Fn(&SimplexError) + Send + Sync + 'static,
    ) {
        self.handler = Arc::new(handler);
    }

    /// Solves with every variable constrained to the integers.
    ///
    /// # Errors
    ///
    /// The failure set of [`Simplex::solve`] for the root relaxation, and
    /// [`SimplexError::Infeasible`] when no branch reaches a point whose
    /// entries are all integral.
    pub fn solve(&self, builder: &SimplexBuilder) -> SimplexResult<Answer> {
        let n = builder
            .c()
            .ok_or_else(|| SimplexError::Data("C vector is missing".into()))?
            .len();
        let domains: Vec<Arc<dyn DiscreteDomain>> = (0..n)
            .map(|_| Arc::new(IntegerDomain) as Arc<dyn DiscreteDomain>)
            .collect();
        self.solve_with(builder, domains)
    }

    /// Solves with one [`DiscreteDomain`] per variable.
    ///
    /// # Errors
    ///
    /// [`SimplexError::Data`] when `domains` does not have one entry per
    /// objective coefficient, plus the failure set of
    /// [`solve`](DiscreteSimplex::solve).
    pub fn solve_with(
        &self,
        builder: &SimplexBuilder,
        domains: Vec<Arc<dyn DiscreteDomain>>,
    ) -> SimplexResult<Answer> {
        let simplex = builder.clone().build()?;
        let num_x = simplex.variable_count();
        if domains.len() != num_x {
            return Err(SimplexError::Data(format!(
                "expected {num_x} discrete domains, got {}",
                domains.len()
            )));
        }

        let search = Search {
            domains,
            function_type: simplex.function_type(),
            num_x,
            original_constraints: simplex.original_constraint_count(),
            incumbent: Mutex::new(Incumbent::default()),
            handler: Arc::clone(&self.handler),
        };

        let bi_order = vec![None; 2 * num_x];
        search.branch(simplex, NodeOp::Solve, bi_order, 0)?;

        let incumbent = search
            .incumbent
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        incumbent.answer.ok_or_else(|| {
            SimplexError::Infeasible("no feasible point in the discrete sets".into())
        })
    }
}

/// Best discrete point found so far across all branch tasks.
#[derive(Default)]
struct Incumbent {
    record: Option<f64>,
    answer: Option<Answer>,
}

/// How a node obtains its LP optimum: the root solves outright, a branch
/// either appends its bound row or retargets one added earlier on the path.
enum NodeOp {
    Solve,
    Add {
        var: usize,
        inequality: Inequality,
        bound: f64,
    },
    Change {
        row: usize,
        bound: f64,
    },
}

impl NodeOp {
    fn apply(&self, simplex: &mut Simplex, num_x: usize) -> SimplexResult<Answer> {
        match *self {
            Self::Solve => simplex.solve(),
            Self::Add {
                var,
                inequality,
                bound,
            } => {
                let mut ai = vec![0.0; num_x];
                ai[var] = 1.0;
                simplex.add_constraint(&ai, inequality, bound)
            }
            Self::Change { row, bound } => simplex.change_b(row, bound),
        }
    }
}

/// Per-call search state shared by all branch tasks of one solve.
struct Search {
    domains: Vec<Arc<dyn DiscreteDomain>>,
    function_type: FunctionType,
    num_x: usize,
    original_constraints: usize,
    incumbent: Mutex<Incumbent>,
    handler: ErrorHandler,
}

impl Search {
    /// One node: solve the relaxation, prune by bound, accept or branch.
    ///
    /// `bi_order` maps each variable to the ordinal of its active lower
    /// bound row (slots `[0, n)`) or upper bound row (slots `[n, 2n)`)
    /// among the rows appended along this path; `added_rows` counts those
    /// rows. Re-branching on a variable retargets its existing row through
    /// `change_b`, which bounds tableau growth to 2n extra rows per path.
    fn branch(
        &self,
        mut simplex: Simplex,
        op: NodeOp,
        bi_order: Vec<Option<usize>>,
        added_rows: usize,
    ) -> SimplexResult<()> {
        let answer = op.apply(&mut simplex, self.num_x)?;
        let fx = answer.fx();

        if !self.is_better(fx) {
            trace!(fx, "subtree pruned by bound");
            return Ok(());
        }

        let invalid = answer
            .x()
            .iter()
            .zip(&self.domains)
            .position(|(&v, domain)| !domain.is_valid(v));
        let Some(index) = invalid else {
            self.update_incumbent(answer);
            return Ok(());
        };

        let x = answer.x()[index];
        self.resolve(simplex, bi_order, added_rows, x, index);
        Ok(())
    }

    /// Splits a node on variable `index`: the lower branch runs on a deep
    /// copy as a parallel task, the upper branch reuses the parent tableau
    /// on this task.
    fn resolve(
        &self,
        simplex: Simplex,
        bi_order: Vec<Option<usize>>,
        added_rows: usize,
        x: f64,
        index: usize,
    ) {
        let lower = self.domains[index].round_down(x);
        let upper = self.domains[index].round_up(x);
        trace!(index, x, lower, upper, "branching");

        let lower_simplex = simplex.clone();
        let mut lower_order = bi_order.clone();
        let mut upper_order = bi_order;

        let (lower_op, lower_added) =
            self.bound_op(&mut lower_order, index, Inequality::Lq, lower, added_rows);
        let (upper_op, upper_added) = self.bound_op(
            &mut upper_order,
            index + self.num_x,
            Inequality::Ge,
            upper,
            added_rows,
        );

        rayon::join(
            || self.child(simplex, upper_op, upper_order, upper_added),
            || self.child(lower_simplex, lower_op, lower_order, lower_added),
        );
    }

    /// Chooses between appending a new bound row and retargeting the row
    /// already added for this variable and side.
    fn bound_op(
        &self,
        order: &mut [Option<usize>],
        slot: usize,
        inequality: Inequality,
        bound: f64,
        added_rows: usize,
    ) -> (NodeOp, usize) {
        match order[slot] {
            Some(ordinal) => (
                NodeOp::Change {
                    row: self.original_constraints + ordinal,
                    bound,
                },
                added_rows,
            ),
            None => {
                order[slot] = Some(added_rows);
                (
                    NodeOp::Add {
                        var: slot % self.num_x,
                        inequality,
                        bound,
                    },
                    added_rows + 1,
                )
            }
        }
    }

    /// Runs one branch; every failure is routed to the exception handler
    /// and the subtree is treated as pruned. A panicking branch is isolated
    /// so sibling tasks keep running.
    fn child(
        &self,
        simplex: Simplex,
        op: NodeOp,
        bi_order: Vec<Option<usize>>,
        added_rows: usize,
    ) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.branch(simplex, op, bi_order, added_rows)
        }));
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => (self.handler)(&err),
            Err(_) => error!("branch task panicked; subtree abandoned"),
        }
    }

    fn is_better(&self, fx: f64) -> bool {
        let guard = self
            .incumbent
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.improves(fx, guard.record)
    }

    /// Monotone incumbent update: the improvement test is repeated under
    /// the lock, so a stale first read can never overwrite a better record.
    fn update_incumbent(&self, answer: Answer) {
        let mut guard = self
            .incumbent
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.improves(answer.fx(), guard.record) {
            debug!(fx = answer.fx(), "new incumbent");
            guard.record = Some(answer.fx());
            guard.answer = Some(answer);
        }
    }

    fn improves(&self, fx: f64, record: Option<f64>) -> bool {
        match record {
            None => true,
            Some(record) => match self.function_type {
                FunctionType::Max => fx > record,
                FunctionType::Min => fx < record,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::slice_approx_eq;

    fn scenario_max() -> SimplexBuilder {
        SimplexBuilder::new()
            .with_a(vec![
                vec![1.0, 2.0],
                vec![2.0, 1.0],
                vec![-1.0, 1.0],
                vec![0.0, 1.0],
            ])
            .with_b(vec![6.0, 8.0, 1.0, 2.0])
            .with_c(vec![3.0, 2.0])
            .with_function_type(FunctionType::Max)
    }

    #[test]
    fn test_integer_domain() {
        let domain = IntegerDomain;
        assert!(domain.is_valid(3.0));
        assert!(domain.is_valid(3.0 - 1e-12));
        assert!(!domain.is_valid(2.5));
        assert_eq!(domain.round_down(2.5), 2.0);
        assert_eq!(domain.round_up(2.5), 3.0);
    }

    #[test]
    fn test_step_domain() {
        let domain = StepDomain::new(0.25);
        assert!(domain.is_valid(1.75));
        assert!(!domain.is_valid(1.8));
        assert_eq!(domain.round_down(1.8), 1.75);
        assert_eq!(domain.round_up(1.8), 2.0);
    }

    #[test]
    #[should_panic(expected = "strictly positive")]
    fn test_step_domain_rejects_zero_step() {
        let _ = StepDomain::new(0.0);
    }

    #[test]
    fn test_integer_optimum_found() {
        // The relaxation peaks at (10/3, 4/3); the best lattice point is
        // (4, 0), checked by enumerating the 5x3 grid by hand.
        let answer = DiscreteSimplex::new().solve(&scenario_max()).unwrap();
        assert!(slice_approx_eq(answer.x(), &[4.0, 0.0], 1e-6));
        assert!((answer.fx() - 12.0).abs() < 1e-6);
    }

    #[test]
    fn test_already_integral_root() {
        let builder = SimplexBuilder::new()
            .with_a(vec![
                vec![50.0, 75.0],
                vec![60.0, 30.0],
                vec![10.0, 25.0],
            ])
            .with_b(vec![15000.0, 12000.0, 5000.0])
            .with_c(vec![100.0, 120.0])
            .with_inequalities(vec![Inequality::Ge, Inequality::Ge, Inequality::Lq]);

        let answer = DiscreteSimplex::new().solve(&builder).unwrap();
        assert!(slice_approx_eq(answer.x(), &[150.0, 100.0], 1e-6));
        assert!((answer.fx() - 27000.0).abs() < 1e-6);
    }

    #[test]
    fn test_domain_count_mismatch() {
        let err = DiscreteSimplex::new()
            .solve_with(
                &scenario_max(),
                vec![Arc::new(IntegerDomain) as Arc<dyn DiscreteDomain>],
            )
            .unwrap_err();
        assert!(matches!(err, SimplexError::Data(_)));
    }

    #[test]
    fn test_root_failure_surfaces() {
        let builder = SimplexBuilder::new()
            .with_a(vec![vec![1.0, -1.0]])
            .with_b(vec![1.0])
            .with_c(vec![1.0, 1.0])
            .with_function_type(FunctionType::Max);
        let err = DiscreteSimplex::new().solve(&builder).unwrap_err();
        assert!(matches!(err, SimplexError::Unbounded(_)));
    }
}
