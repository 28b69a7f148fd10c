//! Product-form LU factorization of the basis submatrix.
#![allow(clippy::needless_range_loop)] // Elimination uses explicit indexing
//!
//! The inverse of the current basis `B` is never formed. Instead
//!
//! ```text
//! B = B₀ · E₁ · E₂ ⋯ Eₖ        P/L · B₀ = U
//! ```
//!
//! where `B₀` is the basis at the last refactorization (stored as row
//! swaps, Gauss transforms and the columns of `U`) and every `Eᵢ` is an eta
//! matrix appended by one pivot. Solves apply the pieces in sequence, so a
//! pivot costs one solve plus an `O(m)` append instead of an `O(m³)`
//! inversion.
//!
//! ## Sharing
//!
//! The factorization lives in a reference-counted snapshot. [`LuDecomposition::fork`]
//! creates a child that reads the parent's snapshot and appends its own eta
//! matrices on top of it. While children are alive the parent is read-only:
//! [`LuDecomposition::update`] fails with [`PivotError::BadCount`]. A child
//! that refactors installs a snapshot of its own and stops referencing the
//! parent.

pub mod eta;
pub mod policy;

pub use eta::EtaMatrix;
pub use policy::{FixedInterval, OperationCount, RefactorPolicy, WorkCounters};

use crate::basis::Label;
use crate::error::{PivotError, PivotResult};
use crate::matrix::Matrix;
use crate::numeric::Scalar;
use std::mem;
use std::rc::Rc;
use tracing::{debug, trace};

/// Configuration for basis factorization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LuConfig {
    /// Pivots between refactorizations; 0 selects the adaptive
    /// [`OperationCount`] policy.
    pub refactor_number: usize,
}

impl LuConfig {
    /// Refactor every `pivots` pivots.
    pub fn fixed(pivots: usize) -> Self {
        Self {
            refactor_number: pivots,
        }
    }

    /// Policy selected by this configuration.
    pub fn policy(&self) -> Rc<dyn RefactorPolicy> {
        policy_for(self.refactor_number)
    }
}

fn policy_for(refactor_number: usize) -> Rc<dyn RefactorPolicy> {
    if refactor_number == 0 {
        Rc::new(OperationCount)
    } else {
        Rc::new(FixedInterval {
            pivots: refactor_number,
        })
    }
}

/// Statistics for basis factorization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LuStats {
    /// Eta updates applied.
    pub updates: u64,
    /// Full refactorizations.
    pub refactorizations: u64,
    /// Eta matrices created.
    pub eta_matrices: u64,
    /// Refactorizations abandoned because the basis looked singular.
    pub failed_refactors: u64,
}

/// `P/L` and `U` of a basis factored from scratch.
#[derive(Debug)]
struct Factor<T> {
    /// Row swap partner and Gauss transform of each elimination step.
    lower: Vec<(usize, EtaMatrix<T>)>,
    /// Columns of the upper triangular factor.
    upper: Vec<EtaMatrix<T>>,
}

impl<T> Factor<T> {
    /// Factorization of the identity.
    fn empty() -> Self {
        Self {
            lower: Vec::new(),
            upper: Vec::new(),
        }
    }
}

impl<T: Scalar> Factor<T> {
    /// Gaussian elimination with partial pivoting.
    fn factor(basis: &Matrix<T>) -> PivotResult<Self> {
        let n = basis.nrows();
        let mut a = basis.clone();
        let mut lower = Vec::with_capacity(n);

        for k in 0..n {
            let mut p = k;
            let mut best = a.get(k, k).abs();
            for i in k + 1..n {
                let magnitude = a.get(i, k).abs();
                if magnitude > best {
                    p = i;
                    best = magnitude;
                }
            }
            if best.eq_zero() {
                return Err(PivotError::SingularBasis { position: k });
            }
            a.swap_rows(k, p);

            let pivot = a.get(k, k).clone();
            let mut gauss = vec![T::zero(); n];
            gauss[k] = T::one();
            for i in k + 1..n {
                if a.get(i, k).is_zero() {
                    continue;
                }
                let multiplier = a.get(i, k).clone() / pivot.clone();
                for j in k..n {
                    let value = a.get(i, j).clone() - multiplier.clone() * a.get(k, j).clone();
                    a.set(i, j, value);
                }
                gauss[i] = -multiplier;
            }
            lower.push((p, EtaMatrix::new(k, gauss)));
        }

        let upper = (0..n)
            .map(|j| {
                let mut column = a.column(j);
                for entry in column.iter_mut().skip(j + 1) {
                    *entry = T::zero();
                }
                EtaMatrix::new(j, column)
            })
            .collect();

        Ok(Self { lower, upper })
    }

    /// `x ← B₀⁻¹·x`
    fn solve(&self, x: &mut [T]) {
        for (swap, gauss) in &self.lower {
            x.swap(gauss.col, *swap);
            gauss.apply(x);
        }
        for column in self.upper.iter().rev() {
            column.apply_inverse(x);
        }
    }

    /// `y ← B₀⁻ᵀ·y`
    fn solve_transpose(&self, y: &mut [T]) {
        for column in &self.upper {
            column.apply_inverse_transpose(y);
        }
        for (swap, gauss) in self.lower.iter().rev() {
            gauss.apply_transpose(y);
            y.swap(gauss.col, *swap);
        }
    }
}

#[derive(Debug)]
enum Origin<T> {
    /// Root snapshot holding a full factorization.
    Factored(Factor<T>),
    /// Child snapshot reading its parent's state.
    Forked(Rc<Snapshot<T>>),
}

#[derive(Debug)]
struct Snapshot<T> {
    origin: Origin<T>,
    /// Eta matrices appended since this snapshot was created.
    etas: Vec<EtaMatrix<T>>,
}

impl<T> Snapshot<T> {
    fn root(factor: Factor<T>) -> Self {
        Self {
            origin: Origin::Factored(factor),
            etas: Vec::new(),
        }
    }

    /// The root factorization and every eta segment, oldest first.
    fn chain(&self) -> (&Factor<T>, Vec<&[EtaMatrix<T>]>) {
        let mut segments = Vec::new();
        let mut node = self;
        loop {
            segments.push(node.etas.as_slice());
            match &node.origin {
                Origin::Factored(factor) => {
                    segments.reverse();
                    return (factor, segments);
                }
                Origin::Forked(parent) => node = parent.as_ref(),
            }
        }
    }
}

impl<T> Drop for Snapshot<T> {
    // Unlink parents one at a time so long fork chains do not recurse.
    fn drop(&mut self) {
        let mut next = detach(&mut self.origin);
        while let Some(parent) = next {
            next = match Rc::try_unwrap(parent) {
                Ok(mut snapshot) => detach(&mut snapshot.origin),
                Err(_) => None,
            };
        }
    }
}

fn detach<T>(origin: &mut Origin<T>) -> Option<Rc<Snapshot<T>>> {
    match mem::replace(origin, Origin::Factored(Factor::empty())) {
        Origin::Forked(parent) => Some(parent),
        Origin::Factored(_) => None,
    }
}

/// Incrementally updated factorization of a basis submatrix.
#[derive(Debug)]
pub struct LuDecomposition<T> {
    state: Rc<Snapshot<T>>,
    size: usize,
    iterations: usize,
    total_operations: u64,
    policy: Rc<dyn RefactorPolicy>,
    stats: LuStats,
}

impl<T: Scalar> LuDecomposition<T> {
    /// Factor `basis` from scratch.
    pub fn new(basis: &Matrix<T>, config: &LuConfig) -> PivotResult<Self> {
        Self::with_policy(basis, config.policy())
    }

    /// Factor `basis` from scratch using a custom refactor policy.
    pub fn with_policy(basis: &Matrix<T>, policy: Rc<dyn RefactorPolicy>) -> PivotResult<Self> {
        check_square(basis, basis.nrows())?;
        let factor = Factor::factor(basis)?;
        Ok(Self::from_factor(basis.nrows(), factor, policy))
    }

    /// Factorization of the `size × size` identity. No arithmetic needed.
    pub fn identity(size: usize, config: &LuConfig) -> Self {
        Self::from_factor(size, Factor::empty(), config.policy())
    }

    fn from_factor(size: usize, factor: Factor<T>, policy: Rc<dyn RefactorPolicy>) -> Self {
        Self {
            state: Rc::new(Snapshot::root(factor)),
            size,
            iterations: 0,
            total_operations: 0,
            policy,
            stats: LuStats::default(),
        }
    }

    /// Number of rows in the factored basis.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Eta updates since the last refactorization.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Estimated work since the last refactorization.
    pub fn total_operations(&self) -> u64 {
        self.total_operations
    }

    /// Counters as seen by the refactor policy.
    pub fn work(&self) -> WorkCounters {
        WorkCounters {
            basis_size: self.size,
            iterations: self.iterations,
            total_operations: self.total_operations,
        }
    }

    /// Get statistics.
    pub fn stats(&self) -> &LuStats {
        &self.stats
    }

    /// Reset statistics.
    pub fn reset_stats(&mut self) {
        self.stats = LuStats::default();
    }

    /// Replace the refactor policy.
    pub fn set_policy(&mut self, policy: Rc<dyn RefactorPolicy>) {
        debug!(?policy, "refactor policy changed");
        self.policy = policy;
    }

    /// Switch to a fixed interval (`n > 0`) or the adaptive policy (`n == 0`).
    pub fn set_refactor_number(&mut self, refactor_number: usize) {
        self.set_policy(policy_for(refactor_number));
    }

    /// Number of live forks reading this factorization directly.
    pub fn copy_count(&self) -> usize {
        Rc::strong_count(&self.state) - 1
    }

    /// Whether this factorization still reads a parent's snapshot.
    pub fn is_forked(&self) -> bool {
        matches!(self.state.origin, Origin::Forked(_))
    }

    /// Total eta matrices applied on top of the root factorization.
    pub fn eta_count(&self) -> usize {
        let (_, segments) = self.state.chain();
        segments.iter().map(|segment| segment.len()).sum()
    }

    /// Fail with [`PivotError::BadCount`] while forks are alive.
    pub fn ensure_unshared(&self) -> PivotResult<()> {
        match self.copy_count() {
            0 => Ok(()),
            children => Err(PivotError::BadCount { children }),
        }
    }

    /// Create a child that shares this factorization.
    ///
    /// The child copies only the work counters. Until it refactors it reads
    /// through to this snapshot, which therefore becomes read-only.
    pub fn fork(&self) -> Self {
        Self {
            state: Rc::new(Snapshot {
                origin: Origin::Forked(Rc::clone(&self.state)),
                etas: Vec::new(),
            }),
            size: self.size,
            iterations: self.iterations,
            total_operations: self.total_operations,
            policy: Rc::clone(&self.policy),
            stats: self.stats.clone(),
        }
    }

    /// Solve `B·x = a`.
    pub fn solve(&self, a: &[T]) -> PivotResult<Vec<T>> {
        self.check_len(a.len())?;
        let mut x = a.to_vec();
        let (factor, segments) = self.state.chain();
        factor.solve(&mut x);
        for segment in segments {
            for eta in segment {
                eta.apply_inverse(&mut x);
            }
        }
        Ok(x)
    }

    /// Solve `yᵀ·B = cᵀ`.
    pub fn solve_transpose(&self, c: &[T]) -> PivotResult<Vec<T>> {
        self.check_len(c.len())?;
        let mut y = c.to_vec();
        let (factor, segments) = self.state.chain();
        for segment in segments.iter().rev() {
            for eta in segment.iter().rev() {
                eta.apply_inverse_transpose(&mut y);
            }
        }
        factor.solve_transpose(&mut y);
        Ok(y)
    }

    /// Record that `column` (labelled `label`) replaced the basic column of
    /// `row`.
    ///
    /// Fails without side effects when forks are alive or the pivot entry
    /// of the solved column is zero. The caller should consult
    /// [`LuDecomposition::refactor_due`] afterwards.
    pub fn update(&mut self, row: usize, label: Label, column: &[T]) -> PivotResult<()> {
        self.ensure_unshared()?;
        if row >= self.size {
            return Err(PivotError::RowOutOfRange {
                row,
                rows: self.size,
            });
        }
        let eta = self.solve(column)?;
        if eta[row].eq_zero() {
            return Err(PivotError::BadPivot { row, label });
        }

        let children = self.copy_count();
        let state = Rc::get_mut(&mut self.state).ok_or(PivotError::BadCount { children })?;
        state.etas.push(EtaMatrix::new(row, eta));

        self.iterations += 1;
        self.total_operations = self.total_operations.saturating_add(self.work().step_cost());
        self.stats.updates += 1;
        self.stats.eta_matrices += 1;
        trace!(
            row,
            %label,
            iterations = self.iterations,
            total_operations = self.total_operations,
            "appended eta matrix"
        );
        Ok(())
    }

    /// Whether the policy asks for a refactorization now.
    pub fn refactor_due(&self) -> bool {
        self.iterations > 0 && self.policy.should_refactor(&self.work())
    }

    /// Factor `basis` from scratch, discarding every eta matrix.
    ///
    /// The new factorization is built aside; on failure the current one is
    /// kept unchanged.
    pub fn refactor(&mut self, basis: &Matrix<T>) -> PivotResult<()> {
        check_square(basis, self.size)?;
        match Factor::factor(basis) {
            Ok(factor) => {
                self.install(factor);
                Ok(())
            }
            Err(err) => {
                self.stats.failed_refactors += 1;
                Err(err)
            }
        }
    }

    /// Reset to the identity factorization.
    pub fn refactor_identity(&mut self) {
        self.install(Factor::empty());
    }

    fn install(&mut self, factor: Factor<T>) {
        let dropped = self.eta_count();
        let was_forked = self.is_forked();
        self.state = Rc::new(Snapshot::root(factor));
        self.iterations = 0;
        self.total_operations = 0;
        self.stats.refactorizations += 1;
        debug!(
            size = self.size,
            dropped_etas = dropped,
            was_forked,
            "refactored basis"
        );
    }

    fn check_len(&self, len: usize) -> PivotResult<()> {
        if len == self.size {
            Ok(())
        } else {
            Err(PivotError::DimensionMismatch {
                expected: self.size,
                got: len,
            })
        }
    }
}

fn check_square<T: Scalar>(basis: &Matrix<T>, size: usize) -> PivotResult<()> {
    for got in [basis.nrows(), basis.ncols()] {
        if got != size {
            return Err(PivotError::DimensionMismatch {
                expected: size,
                got,
            });
        }
    }
    Ok(())
}
