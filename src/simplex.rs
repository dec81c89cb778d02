//! Simplex tableau engine.
//!
//! Canonicalises a linear program into big-M minimisation form, solves it
//! with the primal simplex method, and supports sensitivity analysis on the
//! solved tableau: replacing a right-hand side ([`change_b`]) and appending
//! a constraint ([`add_constraint`]), both recovering through the dual
//! simplex method instead of re-solving from scratch.
//!
//! [`change_b`]: Simplex::change_b
//! [`add_constraint`]: Simplex::add_constraint

use crate::answer::Answer;
use crate::builder::FunctionType;
use crate::error::{SimplexError, SimplexResult};
use crate::inequality::Inequality;
use crate::numeric::{EPSILON, REDUCED_COST_TOLERANCE};
use tracing::{debug, trace};

/// Scale factor applied to the largest objective coefficient to obtain the
/// artificial-variable penalty. Reduced costs scale with the objective
/// coefficients, so this bound dominates any dual multiplier while keeping
/// objective-row magnitudes small enough that cancellation residue stays
/// below the reduced-cost tolerance.
const BIG_M_FACTOR: f64 = 1e3;

/// Iteration budget multiplier; the budget is this factor times the current
/// tableau extent (rows plus columns).
const ITERATION_FACTOR: usize = 50;

/// A mutable simplex tableau over one linear program.
///
/// Built by [`SimplexBuilder::build`](crate::SimplexBuilder::build). The
/// tableau always minimises internally; a maximisation problem is negated
/// on the way in and its answer re-evaluated from the original
/// coefficients on the way out.
///
/// Between public calls the tableau keeps every right-hand side
/// non-negative and every basic column equal to a standard basis vector
/// with reduced cost zero. `clone()` is a deep copy: mutations of a clone
/// never affect the source.
#[derive(Debug, Clone)]
pub struct Simplex {
    /// Constraint rows; the last entry of each row is its right-hand side.
    tableau: Vec<Vec<f64>>,
    /// Reduced-cost row, same width as the constraint rows.
    objective: Vec<f64>,
    /// Column currently basic in each row.
    basis: Vec<usize>,
    /// Per column (excluding the RHS), whether it is an artificial.
    artificial: Vec<bool>,
    /// Per row, the column that entered the tableau as that row's unit
    /// column. Those columns carry the implicit basis inverse: every
    /// elementary operation ever applied has been applied to them, so the
    /// edited B vector of [`change_b`](Simplex::change_b) is pushed through
    /// the same operation sequence by taking their linear combination.
    unit_cols: Vec<usize>,
    /// Per row, the sign applied during B-normalisation.
    row_signs: Vec<f64>,
    /// Post-normalisation right-hand sides, indexed like the rows.
    b_canonical: Vec<f64>,
    /// Negation-part column for each free original variable.
    negative_parts: Vec<Option<usize>>,
    /// Original variable count n.
    num_x: usize,
    /// Constraint count of the original problem, before any
    /// [`add_constraint`](Simplex::add_constraint).
    original_constraints: usize,
    /// Artificial-variable penalty.
    big_m: f64,
    /// Objective direction of the original problem.
    function_type: FunctionType,
    /// Original objective coefficients, for answer re-evaluation.
    c_original: Vec<f64>,
    /// Whether the current basis is known optimal.
    optimal: bool,
}

impl Simplex {
    /// Tolerance below which two floating-point values are considered
    /// equal: feasibility checks, basis values, answer comparison.
    pub const EPSILON: f64 = crate::numeric::EPSILON;

    pub(crate) fn canonicalize(
        a: &[Vec<f64>],
        b: &[f64],
        c: &[f64],
        inequalities: &[Inequality],
        function_type: FunctionType,
        normalized_x: &[bool],
    ) -> Self {
        let m = b.len();
        let n = c.len();
        let sign = match function_type {
            FunctionType::Min => 1.0,
            FunctionType::Max => -1.0,
        };

        // Free variables get a negation column appended after the originals.
        let mut negative_parts = vec![None; n];
        let mut num_structural = n;
        for (i, &non_negative) in normalized_x.iter().enumerate() {
            if !non_negative {
                negative_parts[i] = Some(num_structural);
                num_structural += 1;
            }
        }

        // Normalise each row to a non-negative right-hand side, inverting
        // its relation, and collapse strict relations.
        let mut row_signs = vec![1.0; m];
        let mut tags = vec![Inequality::Lq; m];
        for i in 0..m {
            let mut tag = inequalities[i].relaxed();
            if b[i] < 0.0 {
                row_signs[i] = -1.0;
                tag = tag.inversion();
            }
            tags[i] = tag;
        }

        let slack_count = tags
            .iter()
            .filter(|t| matches!(t, Inequality::Lq | Inequality::Ge))
            .count();
        let artificial_count = tags
            .iter()
            .filter(|t| matches!(t, Inequality::Ge | Inequality::Eq))
            .count();
        let width = num_structural + slack_count + artificial_count + 1;
        let rhs = width - 1;

        let c_inf = c.iter().fold(0.0_f64, |acc, &v| acc.max(v.abs()));
        let big_m = BIG_M_FACTOR * c_inf.max(1.0);

        let mut tableau = vec![vec![0.0; width]; m];
        let mut basis = vec![0; m];
        let mut unit_cols = vec![0; m];
        let mut b_canonical = vec![0.0; m];
        let mut artificial = vec![false; rhs];

        let mut next_slack = num_structural;
        let mut next_artificial = num_structural + slack_count;
        for i in 0..m {
            let row = &mut tableau[i];
            for j in 0..n {
                row[j] = row_signs[i] * a[i][j];
                if let Some(neg) = negative_parts[j] {
                    row[neg] = -row[j];
                }
            }
            row[rhs] = row_signs[i] * b[i];
            b_canonical[i] = row[rhs];

            match tags[i] {
                Inequality::Lq => {
                    row[next_slack] = 1.0;
                    basis[i] = next_slack;
                    unit_cols[i] = next_slack;
                    next_slack += 1;
                }
                Inequality::Ge => {
                    row[next_slack] = -1.0;
                    next_slack += 1;
                    row[next_artificial] = 1.0;
                    artificial[next_artificial] = true;
                    basis[i] = next_artificial;
                    unit_cols[i] = next_artificial;
                    next_artificial += 1;
                }
                Inequality::Eq => {
                    row[next_artificial] = 1.0;
                    artificial[next_artificial] = true;
                    basis[i] = next_artificial;
                    unit_cols[i] = next_artificial;
                    next_artificial += 1;
                }
                Inequality::Le | Inequality::Gr => unreachable!("relaxed above"),
            }
        }

        // Objective row in minimisation form, artificials penalised with
        // big-M, then normalised so every basic artificial starts with
        // reduced cost zero.
        let mut objective = vec![0.0; width];
        for j in 0..n {
            objective[j] = sign * c[j];
            if let Some(neg) = negative_parts[j] {
                objective[neg] = -objective[j];
            }
        }
        for (col, &is_art) in artificial.iter().enumerate() {
            if is_art {
                objective[col] = big_m;
            }
        }
        for i in 0..m {
            if artificial[basis[i]] {
                for j in 0..width {
                    objective[j] -= big_m * tableau[i][j];
                }
                objective[basis[i]] = 0.0;
            }
        }

        Self {
            tableau,
            objective,
            basis,
            artificial,
            unit_cols,
            row_signs,
            b_canonical,
            negative_parts,
            num_x: n,
            original_constraints: m,
            big_m,
            function_type,
            c_original: c.to_vec(),
            optimal: false,
        }
    }

    /// The objective direction the problem was built with.
    #[must_use]
    pub fn function_type(&self) -> FunctionType {
        self.function_type
    }

    /// The number of original decision variables.
    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.num_x
    }

    /// The number of constraints the problem was built with, excluding any
    /// appended through [`add_constraint`](Simplex::add_constraint).
    #[must_use]
    pub fn original_constraint_count(&self) -> usize {
        self.original_constraints
    }

    /// Solves the program and returns the optimal assignment.
    ///
    /// # Errors
    ///
    /// [`SimplexError::Infeasible`] when no feasible point exists,
    /// [`SimplexError::Unbounded`] when the objective is unbounded in the
    /// feasible direction, [`SimplexError::Difficult`] when the iteration
    /// budget runs out.
    pub fn solve(&mut self) -> SimplexResult<Answer> {
        self.ensure_optimal()?;
        Ok(self.answer())
    }

    /// Replaces `B[row]` with `value` and re-optimises from the current
    /// basis.
    ///
    /// The right-hand-side column is re-derived by pushing the edited B
    /// vector through the recorded elementary operations; if a basic value
    /// turns negative the dual simplex method restores feasibility.
    ///
    /// # Errors
    ///
    /// [`SimplexError::Data`] for an out-of-range row or non-finite value,
    /// plus the full failure set of [`solve`](Simplex::solve).
    pub fn change_b(&mut self, row: usize, value: f64) -> SimplexResult<Answer> {
        if row >= self.tableau.len() {
            return Err(SimplexError::Data(format!(
                "B index {row} out of range for {} constraints",
                self.tableau.len()
            )));
        }
        if !value.is_finite() {
            return Err(SimplexError::Data(format!("B value is {value}")));
        }
        self.ensure_optimal()?;

        let canonical = self.row_signs[row] * value;
        let delta = canonical - self.b_canonical[row];
        if delta != 0.0 {
            let unit = self.unit_cols[row];
            let rhs = self.rhs_col();
            for r in 0..self.tableau.len() {
                self.tableau[r][rhs] += self.tableau[r][unit] * delta;
            }
            self.objective[rhs] += self.objective[unit] * delta;
            self.b_canonical[row] = canonical;

            if self.has_negative_rhs() {
                self.optimal = false;
                self.run_dual()?;
            }
            self.optimal = true;
        }
        Ok(self.answer())
    }

    /// Appends the constraint `ai . x <relation> bi` and re-optimises from
    /// the current basis.
    ///
    /// `ai` ranges over the original variables. A `<=` row enters with a
    /// slack and recovers through the dual simplex method when violated; a
    /// `>=` or `=` row enters with an artificial and recovers through the
    /// primal method.
    ///
    /// # Errors
    ///
    /// [`SimplexError::Data`] for a malformed coefficient vector, plus the
    /// full failure set of [`solve`](Simplex::solve).
    pub fn add_constraint(
        &mut self,
        ai: &[f64],
        inequality: Inequality,
        bi: f64,
    ) -> SimplexResult<Answer> {
        if ai.len() != self.num_x {
            return Err(SimplexError::Data(format!(
                "ai has {} entries, expected {}",
                ai.len(),
                self.num_x
            )));
        }
        check_finite_row(ai, bi)?;
        self.ensure_optimal()?;

        // Normalise to a non-negative right-hand side.
        let (row_sign, tag) = if bi < 0.0 {
            (-1.0, inequality.inversion().relaxed())
        } else {
            (1.0, inequality.relaxed())
        };
        let b_new = row_sign * bi;

        // The row over the current columns, then reduced modulo the basis
        // so it is expressed in terms of the non-basic variables.
        let rhs = self.rhs_col();
        let mut row = vec![0.0; rhs + 1];
        for (j, &v) in ai.iter().enumerate() {
            row[j] = row_sign * v;
            if let Some(neg) = self.negative_parts[j] {
                row[neg] = -row[j];
            }
        }
        row[rhs] = b_new;
        for r in 0..self.tableau.len() {
            let factor = row[self.basis[r]];
            if factor != 0.0 {
                for j in 0..=rhs {
                    row[j] -= factor * self.tableau[r][j];
                }
                row[self.basis[r]] = 0.0;
            }
        }
        let b_reduced = row[rhs];
        let negative_rhs = b_reduced < -EPSILON;
        trace!(tag = %tag, b_reduced, "constraint appended");

        let mut b_canonical = b_new;
        let mut row_sign_stored = row_sign;
        let mut run_primal_after = false;
        let mut run_dual_after = false;

        row.pop();
        match tag {
            Inequality::Lq => {
                let slack = self.push_column(false);
                row.push(1.0);
                row.push(b_reduced);
                self.append_row(row, slack, slack);
                run_dual_after = negative_rhs;
            }
            Inequality::Ge => {
                let surplus = self.push_column(false);
                row.push(-1.0);
                let art = self.push_column(true);
                row.push(1.0);
                row.push(b_reduced);
                self.objective[art] = self.big_m;
                if negative_rhs {
                    // The bound already holds at the current vertex;
                    // negating the row makes the surplus basic at the slack
                    // distance and the tableau stays optimal as it is.
                    for v in &mut row {
                        *v = -*v;
                    }
                    self.append_row(row, surplus, art);
                } else {
                    // The current vertex violates the bound: the artificial
                    // carries the violation and big-M pricing drives it out.
                    self.append_row(row, art, art);
                    self.price_out_artificial(self.tableau.len() - 1);
                    run_primal_after = true;
                }
            }
            Inequality::Eq => {
                let art = self.push_column(true);
                if negative_rhs {
                    for v in &mut row {
                        *v = -*v;
                    }
                    b_canonical = -b_new;
                    row_sign_stored = -row_sign;
                }
                row.push(1.0);
                row.push(if negative_rhs { -b_reduced } else { b_reduced });
                self.objective[art] = self.big_m;
                self.append_row(row, art, art);
                self.price_out_artificial(self.tableau.len() - 1);
                run_primal_after = true;
            }
            Inequality::Le | Inequality::Gr => unreachable!("relaxed above"),
        }
        let row_index = self.tableau.len() - 1;
        self.row_signs.push(row_sign_stored);
        self.b_canonical.push(b_canonical);
        debug_assert_eq!(self.row_signs.len(), self.tableau.len());

        if run_dual_after {
            self.optimal = false;
            self.run_dual()?;
        } else if run_primal_after {
            self.optimal = false;
            self.run_primal()?;
        }
        self.optimal = true;
        debug!(row = row_index, "constraint added and tableau re-optimised");
        Ok(self.answer())
    }

    fn rhs_col(&self) -> usize {
        self.objective.len() - 1
    }

    fn iteration_budget(&self) -> usize {
        ITERATION_FACTOR * (self.tableau.len() + self.objective.len())
    }

    fn ensure_optimal(&mut self) -> SimplexResult<()> {
        if !self.optimal {
            self.run_primal()?;
            self.optimal = true;
        }
        Ok(())
    }

    /// Appends a fully-formed row whose `basic` column is its unit column.
    fn append_row(&mut self, row: Vec<f64>, basic: usize, unit: usize) {
        debug_assert_eq!(row.len(), self.objective.len());
        self.tableau.push(row);
        self.basis.push(basic);
        self.unit_cols.push(unit);
    }

    /// Adds a fresh column just before the RHS and returns its index.
    fn push_column(&mut self, is_artificial: bool) -> usize {
        let pos = self.rhs_col();
        for row in &mut self.tableau {
            row.insert(pos, 0.0);
        }
        self.objective.insert(pos, 0.0);
        self.artificial.push(is_artificial);
        pos
    }

    /// Cancels the reduced cost of the artificial basic in `row`.
    fn price_out_artificial(&mut self, row: usize) {
        let big_m = self.big_m;
        let basic = self.basis[row];
        for j in 0..self.objective.len() {
            self.objective[j] -= big_m * self.tableau[row][j];
        }
        self.objective[basic] = 0.0;
    }

    /// Primal simplex: most-negative-reduced-cost entering column, minimum
    /// ratio leaving row with Bland's rule on ties.
    fn run_primal(&mut self) -> SimplexResult<()> {
        let budget = self.iteration_budget();
        for iteration in 0..budget {
            let Some(col) = self.entering_column() else {
                debug!(iterations = iteration, "optimum reached");
                return self.check_artificials();
            };
            let Some(row) = self.leaving_row(col) else {
                return if self.artificial_above_epsilon() {
                    Err(SimplexError::Infeasible(
                        "an artificial variable remains positive on an unbounded ray".into(),
                    ))
                } else {
                    Err(SimplexError::Unbounded(format!(
                        "column {col} improves the objective without bound"
                    )))
                };
            };
            self.pivot(row, col);
        }
        Err(SimplexError::Difficult(format!(
            "no optimum within {budget} iterations"
        )))
    }

    /// Dual simplex: restores primal feasibility after a right-hand-side
    /// perturbation while reduced costs stay non-negative.
    fn run_dual(&mut self) -> SimplexResult<()> {
        let budget = self.iteration_budget();
        for iteration in 0..budget {
            let Some(row) = self.most_negative_rhs_row() else {
                debug!(iterations = iteration, "feasibility restored");
                return self.check_artificials();
            };
            let Some(col) = self.dual_entering_column(row) else {
                return Err(SimplexError::Infeasible(format!(
                    "constraint row {row} cannot be satisfied"
                )));
            };
            self.pivot(row, col);
        }
        Err(SimplexError::Difficult(format!(
            "feasibility not restored within {budget} iterations"
        )))
    }

    /// Most negative reduced cost below the tolerance, smallest index on
    /// ties. Artificial columns never re-enter: they are zero at every
    /// feasible point.
    fn entering_column(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for j in 0..self.rhs_col() {
            if self.artificial[j] {
                continue;
            }
            let rc = self.objective[j];
            if rc < -REDUCED_COST_TOLERANCE && best.is_none_or(|(_, b)| rc < b) {
                best = Some((j, rc));
            }
        }
        best.map(|(j, _)| j)
    }

    /// Minimum-ratio test over positive pivot-column entries; ties broken
    /// by the smallest basis column index to guarantee termination under
    /// degeneracy.
    fn leaving_row(&self, col: usize) -> Option<usize> {
        let rhs = self.rhs_col();
        let mut best: Option<(usize, f64)> = None;
        for (r, row) in self.tableau.iter().enumerate() {
            let entry = row[col];
            if entry > EPSILON {
                let ratio = row[rhs] / entry;
                match best {
                    None => best = Some((r, ratio)),
                    Some((best_row, best_ratio)) => {
                        if ratio < best_ratio - EPSILON {
                            best = Some((r, ratio));
                        } else if (ratio - best_ratio).abs() <= EPSILON
                            && self.basis[r] < self.basis[best_row]
                        {
                            best = Some((r, ratio));
                        }
                    }
                }
            }
        }
        best.map(|(r, _)| r)
    }

    fn most_negative_rhs_row(&self) -> Option<usize> {
        let rhs = self.rhs_col();
        let mut best: Option<(usize, f64)> = None;
        for (r, row) in self.tableau.iter().enumerate() {
            let value = row[rhs];
            if value < -EPSILON && best.is_none_or(|(_, b)| value < b) {
                best = Some((r, value));
            }
        }
        best.map(|(r, _)| r)
    }

    /// Dual ratio test: among non-basic columns with a negative entry in
    /// the leaving row, the one minimising reduced_cost / |entry|, smallest
    /// index on ties.
    fn dual_entering_column(&self, row: usize) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for j in 0..self.rhs_col() {
            if self.artificial[j] {
                continue;
            }
            let entry = self.tableau[row][j];
            if entry < -EPSILON {
                let ratio = self.objective[j] / -entry;
                if best.is_none_or(|(_, b)| ratio < b - EPSILON) {
                    best = Some((j, ratio));
                }
            }
        }
        best.map(|(j, _)| j)
    }

    /// Gauss-Jordan step on `tableau[row][col]`.
    fn pivot(&mut self, row: usize, col: usize) {
        let pivot = self.tableau[row][col];
        for v in &mut self.tableau[row] {
            *v /= pivot;
        }
        self.tableau[row][col] = 1.0;

        let pivot_row = self.tableau[row].clone();
        for (r, other) in self.tableau.iter_mut().enumerate() {
            if r == row {
                continue;
            }
            let factor = other[col];
            if factor != 0.0 {
                for (v, &p) in other.iter_mut().zip(&pivot_row) {
                    *v -= factor * p;
                }
                other[col] = 0.0;
            }
        }
        let factor = self.objective[col];
        if factor != 0.0 {
            for (v, &p) in self.objective.iter_mut().zip(&pivot_row) {
                *v -= factor * p;
            }
            self.objective[col] = 0.0;
        }

        trace!(row, col, "pivot");
        self.basis[row] = col;
    }

    fn has_negative_rhs(&self) -> bool {
        let rhs = self.rhs_col();
        self.tableau.iter().any(|row| row[rhs] < -EPSILON)
    }

    fn artificial_above_epsilon(&self) -> bool {
        let rhs = self.rhs_col();
        self.basis
            .iter()
            .zip(&self.tableau)
            .any(|(&b, row)| self.artificial[b] && row[rhs] > EPSILON)
    }

    fn check_artificials(&self) -> SimplexResult<()> {
        if self.artificial_above_epsilon() {
            Err(SimplexError::Infeasible(
                "an artificial variable remains basic at a positive value".into(),
            ))
        } else {
            Ok(())
        }
    }

    /// Value of a column in the current vertex: its row's right-hand side
    /// when basic, zero otherwise.
    fn column_value(&self, col: usize) -> f64 {
        let rhs = self.rhs_col();
        self.basis
            .iter()
            .position(|&b| b == col)
            .map_or(0.0, |r| self.tableau[r][rhs])
    }

    /// Reads the decision vector out of the tableau and re-evaluates the
    /// objective from the original coefficients.
    fn answer(&self) -> Answer {
        let mut x = vec![0.0; self.num_x];
        for (i, value) in x.iter_mut().enumerate() {
            *value = self.column_value(i);
            if let Some(neg) = self.negative_parts[i] {
                *value -= self.column_value(neg);
            }
        }
        let fx = self.c_original.iter().zip(&x).map(|(&c, &v)| c * v).sum();
        Answer::new(x, fx)
    }
}

fn check_finite_row(ai: &[f64], bi: f64) -> SimplexResult<()> {
    if let Some(v) = ai.iter().find(|v| !v.is_finite()) {
        return Err(SimplexError::Data(format!("ai contains {v}")));
    }
    if !bi.is_finite() {
        return Err(SimplexError::Data(format!("bi is {bi}")));
    }
    Ok(())
}
