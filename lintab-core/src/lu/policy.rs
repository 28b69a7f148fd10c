//! When to throw away the eta file and factor the basis from scratch.

use std::fmt;

/// Work counters handed to a [`RefactorPolicy`] after each update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkCounters {
    /// Number of rows in the basis.
    pub basis_size: usize,
    /// Eta updates since the last refactorization.
    pub iterations: usize,
    /// Estimated arithmetic spent on solves since the last refactorization.
    pub total_operations: u64,
}

impl WorkCounters {
    /// Estimated cost of one solve through the current eta file.
    pub fn step_cost(&self) -> u64 {
        let m = self.basis_size as u64;
        self.iterations as u64 * m + 2 * m * m
    }

    /// Estimated cost of a full refactorization.
    pub fn refactor_cost(&self) -> u64 {
        let m = self.basis_size as u64;
        m * m * m
    }
}

/// Decides between another eta update and a full refactorization.
pub trait RefactorPolicy: fmt::Debug {
    /// Called after every successful update.
    fn should_refactor(&self, work: &WorkCounters) -> bool;
}

/// Refactor after a fixed number of pivots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedInterval {
    /// Pivots between refactorizations.
    pub pivots: usize,
}

impl RefactorPolicy for FixedInterval {
    fn should_refactor(&self, work: &WorkCounters) -> bool {
        work.iterations >= self.pivots
    }
}

/// Refactor once the next solve would cost more than the average pivot of
/// the current cycle, refactorization included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperationCount;

impl RefactorPolicy for OperationCount {
    fn should_refactor(&self, work: &WorkCounters) -> bool {
        if work.iterations == 0 {
            return false;
        }
        let amortized = work.refactor_cost().saturating_add(work.total_operations);
        (work.iterations as u64).saturating_mul(work.step_cost()) > amortized
    }
}
