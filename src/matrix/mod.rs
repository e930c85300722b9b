//! Square matrix storage and the helpers the multipliers share.
//!
//! A [`Matrix`] is a `size × size` block of `f64` stored row-major in one
//! flat buffer, so element `(i, j)` lives at `i * size + j`. Every multiplier
//! in this crate reads and writes through it.
//!
//! - `quadrant`: splitting a matrix into its four half-size blocks and
//!   writing them back
//! - `naive_ikj`: the triple-loop reference product used as a correctness
//!   baseline

pub mod naive_ikj;
pub mod quadrant;

use crate::error::{MatmulError, Result};
use rayon::prelude::*;
use std::fmt;
use std::ops::{Index, IndexMut};

pub use quadrant::Quadrant;

/// Owned square matrix, row-major.
///
/// Storage is released when the value is dropped.
#[derive(Clone, Debug)]
pub struct Matrix {
    size: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Allocate a zero-filled `size × size` matrix.
    ///
    /// Aborts on allocation failure like any `Vec`; use [`Matrix::try_zeros`]
    /// when the caller wants to report it instead.
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            data: vec![0.0; size * size],
        }
    }

    /// Fallible version of [`Matrix::zeros`].
    pub fn try_zeros(size: usize) -> Result<Self> {
        let len = size
            .checked_mul(size)
            .ok_or(MatmulError::Allocation { size })?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| MatmulError::Allocation { size })?;
        data.resize(len, 0.0);
        Ok(Self { size, data })
    }

    /// Build a matrix from row-major data.
    pub fn from_vec(size: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != size * size {
            return Err(MatmulError::DataLength {
                size,
                expected: size * size,
                got: data.len(),
            });
        }
        Ok(Self { size, data })
    }

    /// Build a matrix from fixed-size rows.
    ///
    /// ```
    /// use matmul_recursive::Matrix;
    ///
    /// let m = Matrix::from_rows([[1.0, 2.0], [3.0, 4.0]]);
    /// assert_eq!(m[(1, 0)], 3.0);
    /// ```
    pub fn from_rows<const N: usize>(rows: [[f64; N]; N]) -> Self {
        Self {
            size: N,
            data: rows.iter().flatten().copied().collect(),
        }
    }

    /// Build a matrix where element `(i, j)` is `f(i, j)`.
    pub fn from_fn<F>(size: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut data = Vec::with_capacity(size * size);
        for i in 0..size {
            for j in 0..size {
                data.push(f(i, j));
            }
        }
        Self { size, data }
    }

    /// The benchmark's left operand: every element of row `i` is `i + 1`.
    pub fn row_ramp(size: usize) -> Self {
        Self::from_fn(size, |i, _| (i + 1) as f64)
    }

    /// The benchmark's right operand: every element of column `j` is `j + 1`.
    pub fn column_ramp(size: usize) -> Self {
        Self::from_fn(size, |_, j| (j + 1) as f64)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.size + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.size + col] = value;
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.size..(row + 1) * self.size]
    }

    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        &mut self.data[row * self.size..(row + 1) * self.size]
    }

    pub fn rows(&self) -> std::slice::Chunks<'_, f64> {
        self.data.chunks(self.size.max(1))
    }

    /// Rows as mutable chunks for row-parallel loops.
    pub fn par_rows_mut(&mut self) -> rayon::slice::ChunksMut<'_, f64> {
        let size = self.size.max(1);
        self.data.par_chunks_mut(size)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Fail unless `other` has the same size as `self`.
    pub fn ensure_same_size(&self, other: &Matrix) -> Result<()> {
        if self.size != other.size {
            return Err(MatmulError::ShapeMismatch {
                expected: self.size,
                got: other.size,
            });
        }
        Ok(())
    }
}

/// Exact element-wise comparison, no tolerance.
///
/// Used to check that two engines agree bit-for-bit on the same inputs.
/// Matrices of different sizes are never equal.
pub fn elements_equal(a: &Matrix, b: &Matrix) -> bool {
    a.size == b.size && a.data.iter().zip(&b.data).all(|(x, y)| x == y)
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        elements_equal(self, other)
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[row * self.size + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        &mut self.data[row * self.size + col]
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for value in row {
                write!(f, "{:8.2}", value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
