//! Dense row-major matrix backing the container's primary data.

use crate::data::storage::{Storage, VecStorage};
use crate::debug_invariants::DebugInvariants;
use crate::tree_error::TreeDataError;

/// Dense `n_rows × n_cols` matrix of `f64` stored row-major.
///
/// # Invariants
/// `data.len() == n_rows * n_cols`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Matrix {
    n_rows: usize,
    n_cols: usize,
    data: VecStorage<f64>,
}

impl Matrix {
    /// All-zero matrix.
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            data: VecStorage::with_len(n_rows * n_cols, 0.0),
        }
    }

    /// Build from a row-major buffer.
    ///
    /// # Errors
    /// `ShapeMismatch` if `data.len() != n_rows * n_cols`.
    pub fn from_vec(n_rows: usize, n_cols: usize, data: Vec<f64>) -> Result<Self, TreeDataError> {
        if data.len() != n_rows * n_cols {
            return Err(TreeDataError::ShapeMismatch {
                expected: (n_rows, n_cols),
                found: (data.len(), 1),
            });
        }
        Ok(Self {
            n_rows,
            n_cols,
            data: VecStorage::from_vec(data),
        })
    }

    /// Build from equally long rows.
    ///
    /// # Errors
    /// `ShapeMismatch` naming the first ragged row.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, TreeDataError> {
        let n_cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * n_cols);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != n_cols {
                return Err(TreeDataError::ShapeMismatch {
                    expected: (i, n_cols),
                    found: (i, row.len()),
                });
            }
            data.extend_from_slice(row);
        }
        Self::from_vec(rows.len(), n_cols, data)
    }

    /// `(n_rows, n_cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    /// Value at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.n_rows && col < self.n_cols {
            self.data.as_slice().get(row * self.n_cols + col).copied()
        } else {
            None
        }
    }

    /// Overwrite the value at `(row, col)`.
    ///
    /// # Errors
    /// `ShapeMismatch` if the cell is outside the matrix.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<(), TreeDataError> {
        if row >= self.n_rows || col >= self.n_cols {
            return Err(TreeDataError::ShapeMismatch {
                expected: self.shape(),
                found: (row.saturating_add(1), col.saturating_add(1)),
            });
        }
        let n_cols = self.n_cols;
        self.data.as_mut_slice()[row * n_cols + col] = value;
        Ok(())
    }

    /// Row `row` as a slice.
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        (row < self.n_rows).then(|| &self.data.as_slice()[row * self.n_cols..(row + 1) * self.n_cols])
    }

    /// Entire row-major buffer.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        self.data.as_slice()
    }

    /// New matrix holding `rows × cols`, each in the requested order.
    ///
    /// # Errors
    /// `ShapeMismatch` if any position falls outside the matrix.
    pub fn take(&self, rows: &[usize], cols: &[usize]) -> Result<Self, TreeDataError> {
        if let Some(&r) = rows.iter().find(|&&r| r >= self.n_rows) {
            return Err(TreeDataError::ShapeMismatch {
                expected: self.shape(),
                found: (r.saturating_add(1), self.n_cols),
            });
        }
        if let Some(&c) = cols.iter().find(|&&c| c >= self.n_cols) {
            return Err(TreeDataError::ShapeMismatch {
                expected: self.shape(),
                found: (self.n_rows, c.saturating_add(1)),
            });
        }
        let n_cols = self.n_cols;
        let data = self
            .data
            .gather(rows.iter().flat_map(|&r| cols.iter().map(move |&c| r * n_cols + c)))?;
        Ok(Self {
            n_rows: rows.len(),
            n_cols: cols.len(),
            data,
        })
    }

    /// Swap rows and columns.
    pub fn transpose(&self) -> Self {
        let (n_rows, n_cols) = self.shape();
        let src = self.data.as_slice();
        let data = (0..n_cols)
            .flat_map(|c| (0..n_rows).map(move |r| src[r * n_cols + c]))
            .collect();
        Self {
            n_rows: n_cols,
            n_cols: n_rows,
            data: VecStorage::from_vec(data),
        }
    }
}

impl DebugInvariants for Matrix {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Matrix invalid");
    }

    fn validate_invariants(&self) -> Result<(), TreeDataError> {
        if self.data.len() != self.n_rows * self.n_cols {
            return Err(TreeDataError::ShapeMismatch {
                expected: self.shape(),
                found: (self.data.len(), 1),
            });
        }
        Ok(())
    }
}
