//! Winograd's additive matrix multiplication, single-threaded.
//!
//! Rewrites each inner product over pairs of indices:
//!
//! ```text
//!   Σ_k (x[2k] + y[2k+1]) (x[2k+1] + y[2k])
//!     = Σ_k x[2k] y[2k] + x[2k+1] y[2k+1]  +  Σ_k x[2k] x[2k+1]  +  Σ_k y[2k] y[2k+1]
//! ```
//!
//! The last two sums depend only on the row of `first` or the column of
//! `second`, so they are computed once per row/column and subtracted.
//! Only needs an even size; powers of two are not required.

use crate::algorithm::Algorithm;
use crate::error::Result;
use crate::matrix::Matrix;

/// Winograd multiplication: `result = first * second`. `result` is overwritten.
///
/// # Errors
///
/// [`MatmulError::InvalidSize`](crate::MatmulError::InvalidSize) for odd or
/// zero sizes, [`MatmulError::ShapeMismatch`](crate::MatmulError::ShapeMismatch)
/// if the matrices differ in size.
pub fn multiply(result: &mut Matrix, first: &Matrix, second: &Matrix) -> Result<()> {
    Algorithm::Winograd.check_operands(result, first, second)?;
    tracing::debug!(size = first.size(), "winograd multiply");

    let n = first.size();
    let row_factors: Vec<f64> = (0..n).map(|i| row_factor(first.row(i))).collect();
    let column_factors: Vec<f64> = (0..n).map(|j| column_factor(second, j)).collect();

    for i in 0..n {
        fill_row(
            result.row_mut(i),
            first.row(i),
            second,
            row_factors[i],
            &column_factors,
        );
    }
    Ok(())
}

/// `Σ_k row[2k] * row[2k+1]`.
pub(crate) fn row_factor(row: &[f64]) -> f64 {
    let mut factor = row[0] * row[1];
    for k in 1..row.len() / 2 {
        factor += row[2 * k] * row[2 * k + 1];
    }
    factor
}

/// `Σ_k second[2k][col] * second[2k+1][col]`.
pub(crate) fn column_factor(second: &Matrix, col: usize) -> f64 {
    let mut factor = second[(0, col)] * second[(1, col)];
    for k in 1..second.size() / 2 {
        factor += second[(2 * k, col)] * second[(2 * k + 1, col)];
    }
    factor
}

/// Compute one result row from the matching row of `first`.
pub(crate) fn fill_row(
    out: &mut [f64],
    first_row: &[f64],
    second: &Matrix,
    row_factor: f64,
    column_factors: &[f64],
) {
    let d = first_row.len() / 2;
    for (j, cell) in out.iter_mut().enumerate() {
        let mut value = -row_factor - column_factors[j];
        for k in 0..d {
            value += (first_row[2 * k] + second[(2 * k + 1, j)])
                * (first_row[2 * k + 1] + second[(2 * k, j)]);
        }
        *cell = value;
    }
}
