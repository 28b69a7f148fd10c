//! Property-based tests for the LP tableau
//!
//! This module tests:
//! - Dual consistency along simplex paths
//! - Reverse pivots undoing forward pivots, primal and dual
//! - Forked tableaux never disturbing their parent

use lintab_core::{Label, LpTableau, Matrix, PivotError};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use proptest::prelude::*;

/// Helper to create rational
fn rat(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

/// Feasible at the slack basis: `A ≥ 0`, `b > 0`, mixed-sign costs
fn primal_lp_strategy() -> impl Strategy<Value = (Vec<Vec<i64>>, Vec<i64>, Vec<i64>)> {
    (2usize..=3, 2usize..=4).prop_flat_map(|(m, n)| {
        (
            prop::collection::vec(prop::collection::vec(0i64..6, n), m),
            prop::collection::vec(1i64..10, m),
            prop::collection::vec(-5i64..3, n),
        )
    })
}

/// Dual feasible at the slack basis: costs `> 0`, mixed-sign `A` and `b`
fn dual_lp_strategy() -> impl Strategy<Value = (Vec<Vec<i64>>, Vec<i64>, Vec<i64>)> {
    (2usize..=3, 2usize..=4).prop_flat_map(|(m, n)| {
        (
            prop::collection::vec(prop::collection::vec(-5i64..5, n), m),
            prop::collection::vec(-10i64..10, m),
            prop::collection::vec(1i64..6, n),
        )
    })
}

fn build(a: &[Vec<i64>], b: &[i64], c: &[i64]) -> LpTableau<BigRational> {
    let rows = a
        .iter()
        .map(|row| row.iter().map(|&v| rat(v)).collect())
        .collect();
    let matrix = Matrix::from_rows(rows).unwrap();
    let mut lp = LpTableau::new(matrix, b.iter().map(|&v| rat(v)).collect()).unwrap();
    let cost: Vec<_> = c.iter().map(|&v| rat(v)).collect();
    lp.set_cost(&cost).unwrap();
    lp
}

/// Forward primal pivot: most negative reduced cost, then minimum ratio.
/// Ties go to the smallest label.
fn primal_step(lp: &LpTableau<BigRational>) -> Option<(usize, Label)> {
    let tab = lp.tableau();
    let mut entering: Option<(Label, BigRational)> = None;
    for label in tab.nonbasic() {
        let reduced = lp.relative_cost(label).unwrap();
        if reduced.is_negative() && entering.as_ref().is_none_or(|(_, best)| reduced < *best) {
            entering = Some((label, reduced));
        }
    }
    let (label, _) = entering?;

    let column = tab.solve_column(label).unwrap();
    let x = tab.solution();
    let labels = tab.basis().labels();
    let mut leaving: Option<(usize, BigRational)> = None;
    for (row, t) in column.iter().enumerate() {
        if !t.is_positive() {
            continue;
        }
        let ratio = &x[row] / t;
        let better = match &leaving {
            None => true,
            Some((best_row, best)) => {
                ratio < *best || (ratio == *best && labels[row] < labels[*best_row])
            }
        };
        if better {
            leaving = Some((row, ratio));
        }
    }
    leaving.map(|(row, _)| (row, label))
}

/// Forward dual pivot: most negative basic value, then minimum `r / -α`.
/// Ties go to the smallest label.
fn dual_step(lp: &LpTableau<BigRational>) -> Option<(usize, Label)> {
    let tab = lp.tableau();
    let x = tab.solution();
    let labels = tab.basis().labels();
    let mut leaving: Option<usize> = None;
    for row in 0..tab.num_rows() {
        if !x[row].is_negative() {
            continue;
        }
        let better = match leaving {
            None => true,
            Some(best) => x[row] < x[best] || (x[row] == x[best] && labels[row] < labels[best]),
        };
        if better {
            leaving = Some(row);
        }
    }
    let row = leaving?;

    let mut unit = vec![BigRational::zero(); tab.num_rows()];
    unit[row] = rat(1);
    let pivot_row = tab.solve_transpose(&unit).unwrap();
    let mut entering: Option<(Label, BigRational)> = None;
    for label in tab.nonbasic() {
        let alpha = tab.column_dot(&pivot_row, label).unwrap();
        if !alpha.is_negative() {
            continue;
        }
        let ratio = lp.relative_cost(label).unwrap() / -alpha;
        if entering.as_ref().is_none_or(|(_, best)| ratio < *best) {
            entering = Some((label, ratio));
        }
    }
    entering.map(|(label, _)| (row, label))
}

/// Basic reduced costs vanish and the objective matches `c·x`.
fn check_dual_consistency(
    lp: &LpTableau<BigRational>,
    c: &[i64],
) -> Result<(), TestCaseError> {
    let tab = lp.tableau();
    let mut expected = BigRational::zero();
    for (row, &label) in tab.basis().labels().iter().enumerate() {
        prop_assert!(lp.relative_cost(label).unwrap().is_zero());
        if let Label::Structural(j) = label {
            expected += rat(c[j]) * &tab.solution()[row];
        }
    }
    prop_assert_eq!(lp.total_cost(), expected);
    Ok(())
}

#[cfg(test)]
mod primal_reverse_properties {
    use super::*;

    proptest! {
        /// Every reverse pivot leads to a tableau whose forward pivot
        /// comes straight back, and every forward pivot is a reverse pivot
        /// of the tableau it produces.
        #[test]
        fn reverse_pivots_undo_forward_pivots((a, b, c) in primal_lp_strategy()) {
            let mut lp = build(&a, &b, &c);
            for _ in 0..12 {
                check_dual_consistency(&lp, &c)?;
                prop_assert!(lp.tableau().is_feasible());

                let mut refactored = lp.fork();
                refactored.refactor().unwrap();
                prop_assert!(!refactored.tableau().lu().is_forked());
                prop_assert_eq!(refactored.tableau().solution(), lp.tableau().solution());
                prop_assert_eq!(refactored.dual(), lp.dual());
                drop(refactored);

                for (row, label) in lp.reverse_pivots().unwrap() {
                    let mut prior = lp.fork();
                    let leaving = prior.pivot(row, label).unwrap();
                    prop_assert!(prior.tableau().is_feasible());
                    prop_assert_eq!(primal_step(&prior), Some((row, leaving)));

                    prior.pivot(row, leaving).unwrap();
                    prop_assert_eq!(prior.tableau().basis().labels(), lp.tableau().basis().labels());
                    prop_assert_eq!(prior.tableau().solution(), lp.tableau().solution());
                }

                let Some((row, label)) = primal_step(&lp) else {
                    break;
                };
                let leaving = lp.pivot(row, label).unwrap();
                prop_assert!(lp.is_reverse_pivot(row, leaving).unwrap());
            }
        }
    }
}

#[cfg(test)]
mod dual_reverse_properties {
    use super::*;

    proptest! {
        /// Dual reverse pivots undo dual forward pivots along a dual
        /// simplex path.
        #[test]
        fn dual_reverse_pivots_undo_forward_pivots((a, b, c) in dual_lp_strategy()) {
            let mut lp = build(&a, &b, &c);
            for _ in 0..12 {
                check_dual_consistency(&lp, &c)?;
                prop_assert!(lp.is_dual_feasible());

                for (row, label) in lp.dual_reverse_pivots().unwrap() {
                    let mut prior = lp.fork();
                    let leaving = prior.pivot(row, label).unwrap();
                    prop_assert!(prior.is_dual_feasible());
                    prop_assert_eq!(dual_step(&prior), Some((row, leaving)));

                    prior.pivot(row, leaving).unwrap();
                    prop_assert_eq!(prior.tableau().basis().labels(), lp.tableau().basis().labels());
                    prop_assert_eq!(prior.tableau().solution(), lp.tableau().solution());
                }

                let Some((row, label)) = dual_step(&lp) else {
                    break;
                };
                let leaving = lp.pivot(row, label).unwrap();
                prop_assert!(lp.is_dual_reverse_pivot(row, leaving).unwrap());
            }
        }
    }
}

#[cfg(test)]
mod fork_properties {
    use super::*;

    proptest! {
        /// A child can walk anywhere without changing what its parent sees
        #[test]
        fn child_pivots_leave_parent_intact(
            (a, b, c) in primal_lp_strategy(),
            steps in 1usize..5
        ) {
            let mut lp = build(&a, &b, &c);
            let labels = lp.tableau().basis().labels().to_vec();
            let solution = lp.tableau().solution().to_vec();
            let dual = lp.dual().to_vec();

            let mut child = lp.fork();
            for _ in 0..steps {
                let Some((row, label)) = primal_step(&child) else {
                    break;
                };
                child.pivot(row, label).unwrap();
            }
            if let Some((row, label)) = primal_step(&lp) {
                prop_assert_eq!(
                    lp.pivot(row, label).unwrap_err(),
                    PivotError::BadCount { children: 1 }
                );
            }
            prop_assert_eq!(lp.tableau().basis().labels(), labels.as_slice());
            prop_assert_eq!(lp.tableau().solution(), solution.as_slice());
            prop_assert_eq!(lp.dual(), dual.as_slice());

            drop(child);
            if let Some((row, label)) = primal_step(&lp) {
                prop_assert!(lp.pivot(row, label).is_ok());
            }
        }
    }
}
