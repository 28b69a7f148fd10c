//! LinTab Core - Basis factorization and pivoting for linear tableaux
//!
//! This crate provides the pivoting engine underneath simplex and
//! vertex-enumeration algorithms:
//! - [`LuDecomposition`]: product-form LU factorization with eta updates,
//!   adaptive refactorization and copy-on-write forking
//! - [`Tableau`]: constraint system `[A | I]·(x, s) = b` with a basis kept
//!   in step with every pivot
//! - [`LpTableau`]: cost vector, dual solution, reduced costs and
//!   reverse-pivot analysis
//!
//! Every type is generic over [`Scalar`], implemented for `f64` (tolerance
//! comparisons) and `BigRational` (exact arithmetic).
//!
//! # Examples
//!
//! ```
//! use lintab_core::{Label, LpTableau, Matrix, ratio};
//!
//! // min -x0 - x1  s.t.  x0 + 2x1 <= 4,  3x0 + x1 <= 6
//! let a = Matrix::from_rows(vec![
//!     vec![ratio(1, 1), ratio(2, 1)],
//!     vec![ratio(3, 1), ratio(1, 1)],
//! ])
//! .unwrap();
//! let mut lp = LpTableau::new(a, vec![ratio(4, 1), ratio(6, 1)]).unwrap();
//! lp.set_cost(&[ratio(-1, 1), ratio(-1, 1)]).unwrap();
//!
//! lp.pivot(1, Label::Structural(0)).unwrap();
//! lp.pivot(0, Label::Structural(1)).unwrap();
//! assert!(lp.is_dual_feasible());
//! assert_eq!(lp.total_cost(), ratio(-14, 5));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod basis;
pub mod bfs;
pub mod error;
pub mod lp_tableau;
pub mod lu;
pub mod matrix;
pub mod numeric;
pub mod tableau;

pub use basis::{Basis, Label};
pub use bfs::Bfs;
pub use error::{PivotError, PivotResult};
pub use lp_tableau::LpTableau;
pub use lu::{
    EtaMatrix, FixedInterval, LuConfig, LuDecomposition, LuStats, OperationCount,
    RefactorPolicy, WorkCounters,
};
pub use matrix::Matrix;
pub use numeric::{FLOAT_TOLERANCE, Scalar, ratio};
pub use tableau::Tableau;
