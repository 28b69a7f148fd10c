//! Reverse-pivot analysis.
//!
//! A pair `(row, label)` is a reverse pivot when pivoting the non-basic
//! `label` into `row` yields a prior tableau from which the forward rule
//! would have chosen exactly the pivot back to the current basis.
//!
//! Forward primal rule: entering column has the most negative reduced cost,
//! leaving row has the minimum ratio `x_k / t_k` over `t_k > 0`. Forward
//! dual rule: leaving row has the most negative value, entering column has
//! the minimum ratio `r_k / -α_k` over `α_k < 0`. Every tie goes to the
//! smallest label.

use super::LpTableau;
use crate::basis::Label;
use crate::error::PivotResult;
use crate::matrix::unit_vector;
use crate::numeric::Scalar;
use tracing::trace;

impl<T: Scalar> LpTableau<T> {
    /// Every `(row, label)` from which a primal forward pivot leads here.
    ///
    /// Labels are visited in ascending order, rows within a label in
    /// ascending order. Blocked columns are skipped both as the entering
    /// label and as the prior entering label.
    pub fn reverse_pivots(&self) -> PivotResult<Vec<(usize, Label)>> {
        let mut pivots = Vec::new();
        for label in self.tableau.nonbasic() {
            let reduced = self.relative_cost_unchecked(label);
            if !reduced.gt_zero() {
                continue;
            }
            let column = self.tableau.solve_column(label)?;
            for row in 0..self.tableau.num_rows() {
                if self.reverse_pivot_holds(row, label, &column, &reduced)? {
                    pivots.push((row, label));
                }
            }
        }
        trace!(count = pivots.len(), "enumerated reverse pivots");
        Ok(pivots)
    }

    /// Whether `(row, label)` is a primal reverse pivot.
    pub fn is_reverse_pivot(&self, row: usize, label: Label) -> PivotResult<bool> {
        self.tableau.check_row(row)?;
        self.tableau.check_label(label)?;
        if self.tableau.member(label) || self.tableau.is_blocked(label) {
            return Ok(false);
        }
        let reduced = self.relative_cost_unchecked(label);
        let column = self.tableau.solve_column(label)?;
        self.reverse_pivot_holds(row, label, &column, &reduced)
    }

    /// Every `(row, label)` from which a dual forward pivot leads here.
    pub fn dual_reverse_pivots(&self) -> PivotResult<Vec<(usize, Label)>> {
        let mut pivots = Vec::new();
        for label in self.tableau.nonbasic() {
            let reduced = self.relative_cost_unchecked(label);
            if reduced.lt_zero() {
                continue;
            }
            let column = self.tableau.solve_column(label)?;
            for row in 0..self.tableau.num_rows() {
                if self.dual_reverse_pivot_holds(row, label, &column, &reduced)? {
                    pivots.push((row, label));
                }
            }
        }
        trace!(count = pivots.len(), "enumerated dual reverse pivots");
        Ok(pivots)
    }

    /// Whether `(row, label)` is a dual reverse pivot.
    pub fn is_dual_reverse_pivot(&self, row: usize, label: Label) -> PivotResult<bool> {
        self.tableau.check_row(row)?;
        self.tableau.check_label(label)?;
        if self.tableau.member(label) || self.tableau.is_blocked(label) {
            return Ok(false);
        }
        let reduced = self.relative_cost_unchecked(label);
        let column = self.tableau.solve_column(label)?;
        self.dual_reverse_pivot_holds(row, label, &column, &reduced)
    }

    /// `column` is `B⁻¹·a_label`, `reduced` the current reduced cost of `label`.
    fn reverse_pivot_holds(
        &self,
        row: usize,
        label: Label,
        column: &[T],
        reduced: &T,
    ) -> PivotResult<bool> {
        let x = self.tableau.solution();
        let pivot = &column[row];
        if !pivot.gt_zero() || !x[row].ge_zero() {
            return Ok(false);
        }

        // The prior tableau must be primal feasible, and its ratio test for
        // the prior entering column must settle on `row`.
        let prior_value = x[row].clone() / pivot.clone();
        for (k, t_k) in column.iter().enumerate() {
            if k == row {
                continue;
            }
            let prior = x[k].clone() - t_k.clone() * prior_value.clone();
            if prior.lt_zero() {
                return Ok(false);
            }
            if t_k.lt_zero()
                && (x[k].lt_zero()
                    || (x[k].eq_zero() && self.tableau.label_unchecked(k) < label))
            {
                return Ok(false);
            }
        }

        if !reduced.gt_zero() {
            return Ok(false);
        }
        let leaving = self.tableau.label_unchecked(row);
        if self.tableau.is_blocked(leaving) {
            return Ok(false);
        }

        // Prior reduced cost of `leaving` must be the smallest, ties to the
        // smallest label.
        let prior_leaving = -(reduced.clone() / pivot.clone());
        let pivot_row = self
            .tableau
            .solve_transpose(&unit_vector(self.tableau.num_rows(), row))?;
        for k in self.tableau.nonbasic() {
            if k == label {
                continue;
            }
            let alpha = self.tableau.column_dot_unchecked(&pivot_row, k);
            let prior =
                self.relative_cost_unchecked(k) - reduced.clone() * alpha / pivot.clone();
            let diff = prior - prior_leaving.clone();
            if diff.lt_zero() || (diff.eq_zero() && k < leaving) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn dual_reverse_pivot_holds(
        &self,
        row: usize,
        label: Label,
        column: &[T],
        reduced: &T,
    ) -> PivotResult<bool> {
        let x = self.tableau.solution();
        let pivot = &column[row];
        if !pivot.lt_zero() || !x[row].gt_zero() {
            return Ok(false);
        }
        let leaving = self.tableau.label_unchecked(row);
        if self.tableau.is_blocked(leaving) {
            return Ok(false);
        }

        // Prior value of `label`; it must be the most negative basic value.
        let prior_value = x[row].clone() / pivot.clone();
        for (k, t_k) in column.iter().enumerate() {
            if k == row {
                continue;
            }
            let prior = x[k].clone() - t_k.clone() * prior_value.clone();
            let diff = prior - prior_value.clone();
            if diff.lt_zero() || (diff.eq_zero() && self.tableau.label_unchecked(k) < label) {
                return Ok(false);
            }
        }

        if reduced.lt_zero() {
            return Ok(false);
        }

        // Prior tableau must be dual feasible and its ratio test must pick
        // `leaving`, whose ratio is exactly `reduced`.
        let pivot_row = self
            .tableau
            .solve_transpose(&unit_vector(self.tableau.num_rows(), row))?;
        for k in self.tableau.nonbasic() {
            if k == label {
                continue;
            }
            let alpha = self.tableau.column_dot_unchecked(&pivot_row, k);
            let prior = self.relative_cost_unchecked(k)
                - reduced.clone() * alpha.clone() / pivot.clone();
            if prior.lt_zero() {
                return Ok(false);
            }
            let prior_alpha = alpha / pivot.clone();
            if prior_alpha.lt_zero() {
                let ratio = prior / -prior_alpha;
                let diff = ratio - reduced.clone();
                if diff.lt_zero() || (diff.eq_zero() && k < leaving) {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}
