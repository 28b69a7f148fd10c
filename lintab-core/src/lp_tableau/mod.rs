//! Tableau with a linear objective and its dual solution.
//!
//! The objective is minimized: a non-basic column improves it when its
//! relative cost is negative, and a basis is optimal when every relative
//! cost is non-negative.
//!
//! For exact arithmetic all costs are stored multiplied by
//! [`LpTableau::cost_scale`], a common denominator that keeps them
//! integral. Relative costs, the dual vector and [`LpTableau::dual_bfs`]
//! are reported in that scaled unit; [`LpTableau::total_cost`] is unscaled.

mod reverse;

use crate::basis::Label;
use crate::bfs::Bfs;
use crate::error::{PivotError, PivotResult};
use crate::lu::LuConfig;
use crate::matrix::Matrix;
use crate::numeric::Scalar;
use crate::tableau::Tableau;
use tracing::debug;

/// Tableau plus cost vector, kept dual-consistent across every pivot.
#[derive(Debug)]
pub struct LpTableau<T> {
    tableau: Tableau<T>,
    /// Scaled cost of each structural column.
    cost: Vec<T>,
    /// Scaled cost of each slack column, by row.
    unit_cost: Vec<T>,
    cost_scale: T,
    /// `yᵀ = c_Bᵀ·B⁻¹`, by row.
    dual: Vec<T>,
}

impl<T: Scalar> LpTableau<T> {
    /// LP tableau for `A·x + s = b` with zero costs.
    pub fn new(a: Matrix<T>, b: Vec<T>) -> PivotResult<Self> {
        Tableau::new(a, b).map(Self::from_tableau)
    }

    /// LP tableau with an explicit factorization configuration.
    pub fn with_config(a: Matrix<T>, b: Vec<T>, config: LuConfig) -> PivotResult<Self> {
        Tableau::with_config(a, b, config).map(Self::from_tableau)
    }

    /// LP tableau with artificial unit columns.
    pub fn with_artificial(
        a: Matrix<T>,
        b: Vec<T>,
        artificial: Vec<usize>,
        config: LuConfig,
    ) -> PivotResult<Self> {
        Tableau::with_artificial(a, b, artificial, config).map(Self::from_tableau)
    }

    /// Attach zero costs to an existing tableau.
    pub fn from_tableau(tableau: Tableau<T>) -> Self {
        let rows = tableau.num_rows();
        Self {
            cost: vec![T::zero(); tableau.num_columns()],
            unit_cost: vec![T::zero(); rows],
            cost_scale: T::one(),
            dual: vec![T::zero(); rows],
            tableau,
        }
    }

    /// Underlying tableau.
    pub fn tableau(&self) -> &Tableau<T> {
        &self.tableau
    }

    /// Give up the objective and keep the tableau.
    pub fn into_tableau(self) -> Tableau<T> {
        self.tableau
    }

    /// Set structural costs; slack costs become zero.
    pub fn set_cost(&mut self, cost: &[T]) -> PivotResult<()> {
        let unit_cost = vec![T::zero(); self.tableau.num_rows()];
        self.set_cost_with_unit(cost, &unit_cost)
    }

    /// Set structural costs and per-row slack costs.
    ///
    /// Costs are rescaled by the tableau's common denominator times the
    /// common denominator of the costs themselves, then the basis is
    /// refactored and the dual recomputed.
    pub fn set_cost_with_unit(&mut self, cost: &[T], unit_cost: &[T]) -> PivotResult<()> {
        if cost.len() != self.tableau.num_columns() {
            return Err(PivotError::DimensionMismatch {
                expected: self.tableau.num_columns(),
                got: cost.len(),
            });
        }
        if unit_cost.len() != self.tableau.num_rows() {
            return Err(PivotError::DimensionMismatch {
                expected: self.tableau.num_rows(),
                got: unit_cost.len(),
            });
        }

        let scale = self.tableau.scale().clone() * T::common_scale(cost.iter().chain(unit_cost));
        self.cost = cost.iter().map(|c| c.clone() * scale.clone()).collect();
        self.unit_cost = unit_cost.iter().map(|c| c.clone() * scale.clone()).collect();
        debug!(cost_scale = %scale, columns = cost.len(), "cost vector set");
        self.cost_scale = scale;
        self.refactor()
    }

    /// Factor applied to every stored cost (one for `f64`).
    pub fn cost_scale(&self) -> &T {
        &self.cost_scale
    }

    /// Scaled cost of `label`.
    pub fn cost_of(&self, label: Label) -> PivotResult<T> {
        self.tableau.check_label(label)?;
        Ok(self.cost_unchecked(label))
    }

    /// Dual vector, by row, in scaled units.
    pub fn dual(&self) -> &[T] {
        &self.dual
    }

    /// Reduced cost of `label` in scaled units.
    ///
    /// Zero for every basic column.
    pub fn relative_cost(&self, label: Label) -> PivotResult<T> {
        self.tableau.check_label(label)?;
        Ok(self.relative_cost_unchecked(label))
    }

    /// Reduced costs of every column in ascending label order.
    pub fn relative_costs(&self) -> Vec<(Label, T)> {
        self.tableau
            .basis()
            .all_labels()
            .map(|label| (label, self.relative_cost_unchecked(label)))
            .collect()
    }

    /// Whether no unblocked non-basic column has a negative reduced cost.
    pub fn is_dual_feasible(&self) -> bool {
        self.tableau
            .nonbasic()
            .all(|label| self.relative_cost_unchecked(label).ge_zero())
    }

    /// Objective value of the current basic solution, unscaled.
    pub fn total_cost(&self) -> T {
        let scaled = self
            .tableau
            .basis()
            .labels()
            .iter()
            .zip(self.tableau.solution())
            .fold(T::zero(), |acc, (&label, value)| {
                acc + self.cost_unchecked(label) * value.clone()
            });
        scaled / self.cost_scale.clone()
    }

    /// Recompute the dual vector against the current factorization.
    pub fn solve_dual(&mut self) -> PivotResult<()> {
        let basic_costs: Vec<T> = self
            .tableau
            .basis()
            .labels()
            .iter()
            .map(|&label| self.cost_unchecked(label))
            .collect();
        self.dual = self.tableau.solve_transpose(&basic_costs)?;
        Ok(())
    }

    /// Refactor the basis and recompute the dual.
    pub fn refactor(&mut self) -> PivotResult<()> {
        self.tableau.refactor()?;
        self.solve_dual()
    }

    /// Pivot `label` into `row` and recompute the dual.
    pub fn pivot(&mut self, row: usize, label: Label) -> PivotResult<Label> {
        let leaving = self.tableau.pivot(row, label)?;
        self.solve_dual()?;
        Ok(leaving)
    }

    /// Install an explicit basis and recompute the dual.
    pub fn set_basis(&mut self, labels: Vec<Label>) -> PivotResult<()> {
        self.tableau.set_basis(labels)?;
        self.solve_dual()
    }

    /// Replace the right-hand side.
    ///
    /// The tableau's common denominator may change, so the costs are
    /// rescaled against it and the dual recomputed.
    pub fn set_rhs(&mut self, b: Vec<T>) -> PivotResult<()> {
        let cost: Vec<T> = self
            .cost
            .iter()
            .map(|c| c.clone() / self.cost_scale.clone())
            .collect();
        let unit_cost: Vec<T> = self
            .unit_cost
            .iter()
            .map(|c| c.clone() / self.cost_scale.clone())
            .collect();
        self.tableau.set_rhs(b)?;
        self.set_cost_with_unit(&cost, &unit_cost)
    }

    /// Refactor every `n` pivots, or adaptively when `n == 0`.
    pub fn set_refactor(&mut self, n: usize) {
        self.tableau.set_refactor(n);
    }

    /// Exclude a column from enumeration.
    pub fn block(&mut self, label: Label) {
        self.tableau.block(label);
    }

    /// Undo [`LpTableau::block`].
    pub fn unblock(&mut self, label: Label) {
        self.tableau.unblock(label);
    }

    /// Dual values of the rows whose slack is non-basic, in scaled units.
    pub fn dual_bfs(&self) -> Bfs<T> {
        (0..self.tableau.num_rows())
            .filter(|&row| !self.tableau.member(Label::Slack(row)))
            .map(|row| (Label::Slack(row), self.dual[row].clone()))
            .collect()
    }

    /// A child LP tableau sharing this one's factorization.
    pub fn fork(&self) -> Self {
        Self {
            tableau: self.tableau.fork(),
            cost: self.cost.clone(),
            unit_cost: self.unit_cost.clone(),
            cost_scale: self.cost_scale.clone(),
            dual: self.dual.clone(),
        }
    }

    fn cost_unchecked(&self, label: Label) -> T {
        match label {
            Label::Slack(row) => self.unit_cost[row].clone(),
            Label::Structural(j) => self.cost[j].clone(),
        }
    }

    fn relative_cost_unchecked(&self, label: Label) -> T {
        match label {
            Label::Slack(row) => self.unit_cost[row].clone() - self.dual[row].clone(),
            Label::Structural(j) => {
                self.cost[j].clone() - self.tableau.column_dot_unchecked(&self.dual, label)
            }
        }
    }
}
