//! Dense row-major matrices and vector helpers.
#![allow(clippy::needless_range_loop)] // Matrix algorithms use explicit indexing

use crate::error::{PivotError, PivotResult};
use crate::numeric::Scalar;

/// Dense row-major matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Scalar> Matrix<T> {
    /// Matrix of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![T::zero(); rows * cols],
        }
    }

    /// Square identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = T::one();
        }
        m
    }

    /// Build from a list of rows. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> PivotResult<Self> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(nrows * ncols);
        for row in rows {
            if row.len() != ncols {
                return Err(PivotError::DimensionMismatch {
                    expected: ncols,
                    got: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            rows: nrows,
            cols: ncols,
            data,
        })
    }

    /// Build a matrix whose columns are the given vectors.
    pub fn from_columns(rows: usize, columns: &[Vec<T>]) -> PivotResult<Self> {
        let mut m = Self::zeros(rows, columns.len());
        for (j, column) in columns.iter().enumerate() {
            m.set_column(j, column)?;
        }
        Ok(m)
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Entry at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> &T {
        &self.data[row * self.cols + col]
    }

    /// Overwrite entry at `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.data[row * self.cols + col] = value;
    }

    /// Borrow a row.
    pub fn row(&self, row: usize) -> &[T] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Copy a column out.
    pub fn column(&self, col: usize) -> Vec<T> {
        (0..self.rows).map(|i| self.get(i, col).clone()).collect()
    }

    /// Overwrite a column.
    pub fn set_column(&mut self, col: usize, values: &[T]) -> PivotResult<()> {
        if values.len() != self.rows {
            return Err(PivotError::DimensionMismatch {
                expected: self.rows,
                got: values.len(),
            });
        }
        for (i, value) in values.iter().enumerate() {
            self.set(i, col, value.clone());
        }
        Ok(())
    }

    /// Exchange two rows in place.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for j in 0..self.cols {
            self.data.swap(a * self.cols + j, b * self.cols + j);
        }
    }

    /// Matrix-vector product.
    pub fn mul_vec(&self, x: &[T]) -> PivotResult<Vec<T>> {
        if x.len() != self.cols {
            return Err(PivotError::DimensionMismatch {
                expected: self.cols,
                got: x.len(),
            });
        }
        Ok((0..self.rows).map(|i| dot(self.row(i), x)).collect())
    }

    /// Transposed matrix-vector product `yᵀA`.
    pub fn mul_vec_transpose(&self, y: &[T]) -> PivotResult<Vec<T>> {
        if y.len() != self.rows {
            return Err(PivotError::DimensionMismatch {
                expected: self.rows,
                got: y.len(),
            });
        }
        let mut out = vec![T::zero(); self.cols];
        for i in 0..self.rows {
            if y[i].is_zero() {
                continue;
            }
            for j in 0..self.cols {
                out[j] = out[j].clone() + y[i].clone() * self.get(i, j).clone();
            }
        }
        Ok(out)
    }

    /// Iterate over all entries in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}

/// Inner product of two equally long slices.
pub(crate) fn dot<T: Scalar>(a: &[T], b: &[T]) -> T {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .filter(|(x, y)| !x.is_zero() && !y.is_zero())
        .fold(T::zero(), |acc, (x, y)| acc + x.clone() * y.clone())
}

/// Unit vector `e_index` of the given length.
pub fn unit_vector<T: Scalar>(len: usize, index: usize) -> Vec<T> {
    let mut v = vec![T::zero(); len];
    v[index] = T::one();
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Matrix<f64> {
        Matrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap()
    }

    #[test]
    fn test_from_rows() {
        let m = sample();
        assert_eq!(m.nrows(), 2);
        assert_eq!(m.ncols(), 3);
        assert_eq!(*m.get(1, 2), 6.0);
        assert_eq!(m.row(0), &[1.0, 2.0, 3.0]);
        assert_eq!(m.column(1), vec![2.0, 5.0]);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert_eq!(
            err,
            PivotError::DimensionMismatch {
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn test_products() {
        let m = sample();
        assert_eq!(m.mul_vec(&[1.0, 0.0, 1.0]).unwrap(), vec![4.0, 10.0]);
        assert_eq!(
            m.mul_vec_transpose(&[1.0, 1.0]).unwrap(),
            vec![5.0, 7.0, 9.0]
        );
        assert!(m.mul_vec(&[1.0]).is_err());
    }

    #[test]
    fn test_columns_and_swaps() {
        let mut m = Matrix::<f64>::identity(3);
        m.set_column(2, &[7.0, 8.0, 9.0]).unwrap();
        m.swap_rows(0, 2);
        assert_eq!(m.row(0), &[0.0, 0.0, 9.0]);
        assert_eq!(m.row(2), &[1.0, 0.0, 7.0]);
        assert_eq!(unit_vector::<f64>(3, 1), vec![0.0, 1.0, 0.0]);
    }
}
