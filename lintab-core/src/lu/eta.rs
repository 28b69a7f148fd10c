//! Eta matrices: the identity with one column replaced.

use crate::numeric::Scalar;

/// Identity matrix whose column `col` is replaced by `etadata`.
///
/// The whole factorization is a product of these. Applying one (or its
/// inverse, or either transposed) to a dense vector costs `O(m)`.
#[derive(Debug, Clone, PartialEq)]
pub struct EtaMatrix<T> {
    /// Replaced column.
    pub col: usize,
    /// Contents of the replaced column.
    pub etadata: Vec<T>,
}

impl<T: Scalar> EtaMatrix<T> {
    /// Create an eta matrix.
    pub fn new(col: usize, etadata: Vec<T>) -> Self {
        Self { col, etadata }
    }

    /// Diagonal entry of the replaced column.
    pub fn pivot(&self) -> &T {
        &self.etadata[self.col]
    }

    /// `x ← E·x`
    pub fn apply(&self, x: &mut [T]) {
        let xk = x[self.col].clone();
        if xk.is_zero() {
            return;
        }
        for (i, d) in self.etadata.iter().enumerate() {
            if i == self.col {
                x[i] = d.clone() * xk.clone();
            } else if !d.is_zero() {
                x[i] = x[i].clone() + d.clone() * xk.clone();
            }
        }
    }

    /// `x ← Eᵀ·x`
    pub fn apply_transpose(&self, x: &mut [T]) {
        let sum = self
            .etadata
            .iter()
            .zip(x.iter())
            .filter(|(d, xi)| !d.is_zero() && !xi.is_zero())
            .fold(T::zero(), |acc, (d, xi)| acc + d.clone() * xi.clone());
        x[self.col] = sum;
    }

    /// `x ← E⁻¹·x`
    pub fn apply_inverse(&self, x: &mut [T]) {
        if x[self.col].is_zero() {
            return;
        }
        let xk = x[self.col].clone() / self.pivot().clone();
        for (i, d) in self.etadata.iter().enumerate() {
            if i != self.col && !d.is_zero() {
                x[i] = x[i].clone() - d.clone() * xk.clone();
            }
        }
        x[self.col] = xk;
    }

    /// `x ← E⁻ᵀ·x`
    pub fn apply_inverse_transpose(&self, x: &mut [T]) {
        let off_diagonal = self
            .etadata
            .iter()
            .zip(x.iter())
            .enumerate()
            .filter(|(i, (d, xi))| *i != self.col && !d.is_zero() && !xi.is_zero())
            .fold(T::zero(), |acc, (_, (d, xi))| acc + d.clone() * xi.clone());
        x[self.col] = (x[self.col].clone() - off_diagonal) / self.pivot().clone();
    }
}
