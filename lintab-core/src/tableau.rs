//! Working tableau: constraint data, basis and its factorization.
//!
//! A [`Tableau`] describes the system `[A | I]·(x, s) = b`, optionally with
//! extra artificial unit columns, and keeps the basis factorization in
//! step with every pivot.

use crate::basis::{Basis, Label};
use crate::bfs::Bfs;
use crate::error::{PivotError, PivotResult};
use crate::lu::{LuConfig, LuDecomposition};
use crate::matrix::{Matrix, dot, unit_vector};
use crate::numeric::Scalar;
use std::rc::Rc;
use tracing::{trace, warn};

/// Constraint system with a current basis.
#[derive(Debug)]
pub struct Tableau<T> {
    /// Constraint matrix, shared between forks.
    matrix: Rc<Matrix<T>>,
    /// Row of the unit vector behind each artificial column.
    artificial: Rc<[usize]>,
    /// Right-hand side.
    rhs: Vec<T>,
    /// Common denominator of `matrix` and `rhs`.
    scale: T,
    basis: Basis,
    lu: LuDecomposition<T>,
    /// Values of the basic variables, by row.
    solution: Vec<T>,
    pivots: u64,
}

impl<T: Scalar> Tableau<T> {
    /// Tableau for `A·x + s = b` at the slack basis.
    pub fn new(a: Matrix<T>, b: Vec<T>) -> PivotResult<Self> {
        Self::with_config(a, b, LuConfig::default())
    }

    /// Tableau with an explicit factorization configuration.
    pub fn with_config(a: Matrix<T>, b: Vec<T>, config: LuConfig) -> PivotResult<Self> {
        Self::with_artificial(a, b, Vec::new(), config)
    }

    /// Tableau whose column space is extended by artificial unit columns.
    ///
    /// Artificial column `k` is `Structural(a.ncols() + k)` and equals the
    /// unit vector of row `artificial[k]`.
    pub fn with_artificial(
        a: Matrix<T>,
        b: Vec<T>,
        artificial: Vec<usize>,
        config: LuConfig,
    ) -> PivotResult<Self> {
        let rows = a.nrows();
        if b.len() != rows {
            return Err(PivotError::DimensionMismatch {
                expected: rows,
                got: b.len(),
            });
        }
        if let Some(&row) = artificial.iter().find(|&&row| row >= rows) {
            return Err(PivotError::RowOutOfRange { row, rows });
        }

        let scale = T::common_scale(a.iter().chain(b.iter()));
        let columns = a.ncols() + artificial.len();
        Ok(Self {
            matrix: Rc::new(a),
            artificial: artificial.into(),
            solution: b.clone(),
            rhs: b,
            scale,
            basis: Basis::identity(rows, columns),
            lu: LuDecomposition::identity(rows, &config),
            pivots: 0,
        })
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.rhs.len()
    }

    /// Number of structural columns, artificial columns included.
    pub fn num_columns(&self) -> usize {
        self.basis.num_columns()
    }

    /// Number of artificial columns.
    pub fn num_artificial(&self) -> usize {
        self.artificial.len()
    }

    /// Whether `label` is one of the artificial columns.
    pub fn is_artificial(&self, label: Label) -> bool {
        match label {
            Label::Structural(j) => j >= self.matrix.ncols() && j < self.num_columns(),
            Label::Slack(_) => false,
        }
    }

    /// Constraint matrix.
    pub fn matrix(&self) -> &Matrix<T> {
        &self.matrix
    }

    /// Right-hand side.
    pub fn rhs(&self) -> &[T] {
        &self.rhs
    }

    /// Common denominator of the constraint data (one for `f64`).
    pub fn scale(&self) -> &T {
        &self.scale
    }

    /// Current basis.
    pub fn basis(&self) -> &Basis {
        &self.basis
    }

    /// Current factorization.
    pub fn lu(&self) -> &LuDecomposition<T> {
        &self.lu
    }

    /// Basic label of `row`, `None` past the last row.
    pub fn label(&self, row: usize) -> Option<Label> {
        self.basis.label(row)
    }

    /// Row in which `label` is basic.
    pub fn find(&self, label: Label) -> Option<usize> {
        self.basis.find(label)
    }

    /// Whether `label` is basic.
    pub fn member(&self, label: Label) -> bool {
        self.basis.member(label)
    }

    /// Whether the basis is the slack identity.
    pub fn is_ident(&self) -> bool {
        self.basis.is_ident()
    }

    /// Successful pivots performed on this tableau.
    pub fn num_pivots(&self) -> u64 {
        self.pivots
    }

    /// Values of the basic variables, by row.
    pub fn solution(&self) -> &[T] {
        &self.solution
    }

    /// Value of `label` in the current basic solution.
    pub fn value_of(&self, label: Label) -> T {
        self.basis
            .find(label)
            .map_or_else(T::zero, |row| self.solution[row].clone())
    }

    /// Whether every basic variable is non-negative.
    pub fn is_feasible(&self) -> bool {
        self.solution.iter().all(Scalar::ge_zero)
    }

    /// Basic solution as a label-keyed map.
    pub fn primal_bfs(&self) -> Bfs<T> {
        self.basis
            .labels()
            .iter()
            .zip(&self.solution)
            .map(|(&label, value)| (label, value.clone()))
            .collect()
    }

    /// Column of `label`: a matrix column or a unit vector.
    pub fn column(&self, label: Label) -> PivotResult<Vec<T>> {
        self.check_label(label)?;
        Ok(self.column_unchecked(label))
    }

    /// `yᵀ·column(label)` without materializing the column.
    pub fn column_dot(&self, y: &[T], label: Label) -> PivotResult<T> {
        self.check_label(label)?;
        self.check_len(y.len())?;
        Ok(self.column_dot_unchecked(y, label))
    }

    /// Representation of `label`'s column in the current basis: `B⁻¹·a`.
    pub fn solve_column(&self, label: Label) -> PivotResult<Vec<T>> {
        let column = self.column(label)?;
        self.lu.solve(&column)
    }

    /// Solve `B·x = a`.
    pub fn solve(&self, a: &[T]) -> PivotResult<Vec<T>> {
        self.lu.solve(a)
    }

    /// Solve `yᵀ·B = cᵀ`.
    pub fn solve_transpose(&self, c: &[T]) -> PivotResult<Vec<T>> {
        self.lu.solve_transpose(c)
    }

    /// Replace the basic column of `row` with `label`.
    ///
    /// Returns the label that left the basis. Fails without changing
    /// anything when the factorization is shared with live forks
    /// ([`PivotError::BadCount`]) or when the pivot entry is zero
    /// ([`PivotError::BadPivot`]).
    pub fn pivot(&mut self, row: usize, label: Label) -> PivotResult<Label> {
        self.lu.ensure_unshared()?;
        self.check_row(row)?;
        self.check_label(label)?;
        match self.basis.find(label) {
            Some(current) if current == row => return Ok(label),
            Some(_) => return Err(PivotError::BadPivot { row, label }),
            None => {}
        }

        let column = self.column_unchecked(label);
        self.lu.update(row, label, &column)?;
        let leaving = self.basis.pivot(row, label);
        self.pivots += 1;

        if self.lu.refactor_due()
            && let Err(err) = self.refactor_factorization()
        {
            // The eta file still describes the new basis exactly.
            warn!(%err, "refactorization after pivot failed, keeping eta updates");
        }
        self.solution = self.lu.solve(&self.rhs)?;
        trace!(row, entering = %label, %leaving, pivots = self.pivots, "pivoted");
        Ok(leaving)
    }

    /// Factor the current basis from scratch.
    pub fn refactor(&mut self) -> PivotResult<()> {
        self.refactor_factorization()?;
        self.solution = self.lu.solve(&self.rhs)?;
        Ok(())
    }

    /// Refactor every `n` pivots, or adaptively when `n == 0`.
    pub fn set_refactor(&mut self, n: usize) {
        self.lu.set_refactor_number(n);
    }

    /// Install an explicit basis, one label per row, and refactor.
    pub fn set_basis(&mut self, labels: Vec<Label>) -> PivotResult<()> {
        self.check_len(labels.len())?;
        let mut basis = Basis::from_labels(labels, self.num_columns())?;
        basis.inherit_blocks(&self.basis);

        if basis.is_ident() {
            self.lu.refactor_identity();
        } else {
            let matrix = self.basis_matrix(&basis)?;
            self.lu.refactor(&matrix)?;
        }
        self.basis = basis;
        self.solution = self.lu.solve(&self.rhs)?;
        Ok(())
    }

    /// Replace the right-hand side and recompute the basic solution.
    pub fn set_rhs(&mut self, b: Vec<T>) -> PivotResult<()> {
        self.check_len(b.len())?;
        self.solution = self.lu.solve(&b)?;
        self.scale = T::common_scale(self.matrix.iter().chain(b.iter()));
        self.rhs = b;
        Ok(())
    }

    /// Exclude a column from enumeration.
    pub fn block(&mut self, label: Label) {
        self.basis.block(label);
    }

    /// Undo [`Tableau::block`].
    pub fn unblock(&mut self, label: Label) {
        self.basis.unblock(label);
    }

    /// Whether `label` is blocked.
    pub fn is_blocked(&self, label: Label) -> bool {
        self.basis.is_blocked(label)
    }

    /// Non-basic, unblocked labels in ascending order.
    pub fn nonbasic(&self) -> impl Iterator<Item = Label> + '_ {
        self.basis.nonbasic()
    }

    /// A child tableau for exploring pivots from the current state.
    ///
    /// The child shares the constraint data and the factorization. This
    /// tableau cannot pivot until the child is dropped or refactored.
    pub fn fork(&self) -> Self {
        Self {
            matrix: Rc::clone(&self.matrix),
            artificial: Rc::clone(&self.artificial),
            rhs: self.rhs.clone(),
            scale: self.scale.clone(),
            basis: self.basis.clone(),
            lu: self.lu.fork(),
            solution: self.solution.clone(),
            pivots: self.pivots,
        }
    }

    fn refactor_factorization(&mut self) -> PivotResult<()> {
        if self.basis.is_ident() {
            self.lu.refactor_identity();
            return Ok(());
        }
        let matrix = self.basis_matrix(&self.basis)?;
        self.lu.refactor(&matrix)
    }

    /// Columns of `basis` side by side.
    fn basis_matrix(&self, basis: &Basis) -> PivotResult<Matrix<T>> {
        let columns: Vec<_> = basis
            .labels()
            .iter()
            .map(|&label| self.column_unchecked(label))
            .collect();
        Matrix::from_columns(self.num_rows(), &columns)
    }

    pub(crate) fn label_unchecked(&self, row: usize) -> Label {
        self.basis.labels()[row]
    }

    pub(crate) fn column_unchecked(&self, label: Label) -> Vec<T> {
        let rows = self.num_rows();
        match label {
            Label::Slack(r) => unit_vector(rows, r),
            Label::Structural(j) if j < self.matrix.ncols() => self.matrix.column(j),
            Label::Structural(j) => unit_vector(rows, self.artificial[j - self.matrix.ncols()]),
        }
    }

    pub(crate) fn column_dot_unchecked(&self, y: &[T], label: Label) -> T {
        match label {
            Label::Slack(r) => y[r].clone(),
            Label::Structural(j) if j < self.matrix.ncols() => {
                dot(y, &self.matrix.column(j))
            }
            Label::Structural(j) => y[self.artificial[j - self.matrix.ncols()]].clone(),
        }
    }

    pub(crate) fn check_row(&self, row: usize) -> PivotResult<()> {
        if row < self.num_rows() {
            Ok(())
        } else {
            Err(PivotError::RowOutOfRange {
                row,
                rows: self.num_rows(),
            })
        }
    }

    pub(crate) fn check_label(&self, label: Label) -> PivotResult<()> {
        if self.basis.contains_label(label) {
            Ok(())
        } else {
            Err(PivotError::LabelOutOfRange { label })
        }
    }

    fn check_len(&self, len: usize) -> PivotResult<()> {
        if len == self.num_rows() {
            Ok(())
        } else {
            Err(PivotError::DimensionMismatch {
                expected: self.num_rows(),
                got: len,
            })
        }
    }
}
