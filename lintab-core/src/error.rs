//! Error taxonomy for tableau and factorization operations.
//!
//! Every failing operation returns before touching shared state, so an
//! error leaves the tableau (and its factorization) exactly as it was.

use crate::basis::Label;
use thiserror::Error;

/// Errors raised by pivoting, factorization and solve operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PivotError {
    /// The pivot element for the requested exchange is zero.
    ///
    /// The basis would become singular; the caller has to choose another
    /// pivot.
    #[error("bad pivot: column {label} has a zero entry in row {row}")]
    BadPivot {
        /// Row that was asked to leave the basis
        row: usize,
        /// Column that was asked to enter
        label: Label,
    },

    /// No nonzero pivot was found while factoring the basis from scratch.
    #[error("singular basis: no nonzero pivot at position {position} during refactorization")]
    SingularBasis {
        /// Elimination step that failed
        position: usize,
    },

    /// Attempted to mutate a factorization that live forks still read from.
    #[error("factorization is shared with {children} live fork(s) and cannot be updated")]
    BadCount {
        /// Number of direct children holding the snapshot
        children: usize,
    },

    /// A vector or matrix argument has the wrong length.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        got: usize,
    },

    /// Row index outside the tableau.
    #[error("row {row} out of range (tableau has {rows} rows)")]
    RowOutOfRange {
        /// Offending row
        row: usize,
        /// Number of rows
        rows: usize,
    },

    /// Column label outside the tableau's column space.
    #[error("column label {label} out of range")]
    LabelOutOfRange {
        /// Offending label
        label: Label,
    },

    /// A basis listed the same column twice.
    #[error("label {label} appears more than once in the basis")]
    DuplicateLabel {
        /// Repeated label
        label: Label,
    },
}

/// Result type for tableau operations.
pub type PivotResult<T> = Result<T, PivotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PivotError::BadPivot {
            row: 2,
            label: Label::Structural(0),
        };
        assert_eq!(
            err.to_string(),
            "bad pivot: column 1 has a zero entry in row 2"
        );

        let err = PivotError::BadCount { children: 3 };
        assert!(err.to_string().contains("3 live fork(s)"));

        let err = PivotError::DimensionMismatch {
            expected: 4,
            got: 2,
        };
        assert_eq!(err.to_string(), "dimension mismatch: expected 4, got 2");
    }
}
