//! Property-based tests for the basis factorization
//!
//! This module tests:
//! - Solves against the factored matrix, plain and transposed
//! - Eta updates against a fresh factorization of the updated basis
//! - Fork ownership rules

use lintab_core::{Label, LuConfig, LuDecomposition, Matrix, PivotError};
use num_bigint::BigInt;
use num_rational::BigRational;
use proptest::prelude::*;

/// Helper to create rational
fn rat(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

/// Strategy for strictly diagonally dominant (hence nonsingular) matrices
fn basis_strategy() -> impl Strategy<Value = Vec<Vec<i64>>> {
    (1usize..=4).prop_flat_map(|n| {
        prop::collection::vec(prop::collection::vec(-5i64..=5, n), n).prop_map(|mut rows| {
            for (i, row) in rows.iter_mut().enumerate() {
                let off: i64 = row
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(_, v)| v.abs())
                    .sum();
                row[i] = if row[i] < 0 { -(off + 1) } else { off + 1 };
            }
            rows
        })
    })
}

fn to_matrix(rows: &[Vec<i64>]) -> Matrix<BigRational> {
    Matrix::from_rows(
        rows.iter()
            .map(|row| row.iter().map(|&v| rat(v)).collect())
            .collect(),
    )
    .unwrap()
}

/// Right-hand side of length `n` drawn from a seed vector
fn rhs(seed: &[i64], n: usize) -> Vec<BigRational> {
    (0..n).map(|i| rat(seed[i % seed.len()])).collect()
}

#[cfg(test)]
mod lu_solve_properties {
    use super::*;

    proptest! {
        /// B·solve(a) reproduces a
        #[test]
        fn solve_inverts_basis(
            rows in basis_strategy(),
            seed in prop::collection::vec(-10i64..10, 4)
        ) {
            let basis = to_matrix(&rows);
            let lu = LuDecomposition::new(&basis, &LuConfig::default()).unwrap();
            let a = rhs(&seed, basis.nrows());
            let x = lu.solve(&a).unwrap();
            prop_assert_eq!(basis.mul_vec(&x).unwrap(), a);
        }

        /// solve_transpose(c)ᵀ·B reproduces cᵀ
        #[test]
        fn solve_transpose_inverts_basis(
            rows in basis_strategy(),
            seed in prop::collection::vec(-10i64..10, 4)
        ) {
            let basis = to_matrix(&rows);
            let lu = LuDecomposition::new(&basis, &LuConfig::default()).unwrap();
            let c = rhs(&seed, basis.nrows());
            let y = lu.solve_transpose(&c).unwrap();
            prop_assert_eq!(basis.mul_vec_transpose(&y).unwrap(), c);
        }
    }
}

#[cfg(test)]
mod lu_update_properties {
    use super::*;

    proptest! {
        /// Updating with a new column solves like factoring the new basis
        #[test]
        fn update_matches_refactor(
            rows in basis_strategy(),
            column_seed in prop::collection::vec(-6i64..6, 4),
            rhs_seed in prop::collection::vec(-10i64..10, 4),
            row_seed in 0usize..4
        ) {
            let mut basis = to_matrix(&rows);
            let n = basis.nrows();
            let row = row_seed % n;
            let column = rhs(&column_seed, n);

            let mut lu = LuDecomposition::new(&basis, &LuConfig::fixed(100)).unwrap();
            match lu.update(row, Label::Structural(0), &column) {
                Err(PivotError::BadPivot { .. }) => {
                    // Replacing the column would make the basis singular
                    basis.set_column(row, &column).unwrap();
                    prop_assert!(LuDecomposition::new(&basis, &LuConfig::default()).is_err());
                    return Ok(());
                }
                other => other.unwrap(),
            }
            prop_assert_eq!(lu.eta_count(), 1);

            basis.set_column(row, &column).unwrap();
            let fresh = LuDecomposition::new(&basis, &LuConfig::default()).unwrap();
            let b = rhs(&rhs_seed, n);
            prop_assert_eq!(lu.solve(&b).unwrap(), fresh.solve(&b).unwrap());
            prop_assert_eq!(
                lu.solve_transpose(&b).unwrap(),
                fresh.solve_transpose(&b).unwrap()
            );

            lu.refactor(&basis).unwrap();
            prop_assert_eq!(lu.eta_count(), 0);
            prop_assert_eq!(lu.solve(&b).unwrap(), fresh.solve(&b).unwrap());
        }

        /// A parent with live forks refuses updates until they are gone
        #[test]
        fn forks_lock_parent(
            rows in basis_strategy(),
            forks in 1usize..4
        ) {
            let basis = to_matrix(&rows);
            let n = basis.nrows();
            let mut lu = LuDecomposition::new(&basis, &LuConfig::default()).unwrap();
            let children: Vec<_> = (0..forks).map(|_| lu.fork()).collect();
            prop_assert_eq!(lu.copy_count(), forks);

            let column = basis.column(0);
            let err = lu.update(0, Label::Structural(0), &column).unwrap_err();
            prop_assert_eq!(err, PivotError::BadCount { children: forks });
            prop_assert_eq!(lu.eta_count(), 0);

            for child in &children {
                prop_assert!(child.is_forked());
                prop_assert_eq!(child.solve(&column).unwrap(), lu.solve(&column).unwrap());
            }
            drop(children);
            prop_assert_eq!(lu.copy_count(), 0);
            prop_assert!(lu.update(0, Label::Structural(0), &column).is_ok());
            prop_assert_eq!(lu.solve(&column).unwrap(), {
                let mut e = vec![rat(0); n];
                e[0] = rat(1);
                e
            });
        }
    }
}
