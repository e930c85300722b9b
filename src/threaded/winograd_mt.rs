//! Row-parallel Winograd multiplication.

use crate::algorithm::Algorithm;
use crate::error::Result;
use crate::matrix::Matrix;
use crate::threaded::ParallelConfig;
use crate::winograd::{column_factor, fill_row, row_factor};
use rayon::prelude::*;

/// Parallel [`crate::winograd::multiply`].
///
/// Three passes, each finished before the next starts: row factors, column
/// factors, then result rows. Every pass splits its work by row (or column),
/// so no two workers write the same element.
pub fn multiply_parallel(
    result: &mut Matrix,
    first: &Matrix,
    second: &Matrix,
    config: &ParallelConfig,
) -> Result<()> {
    Algorithm::Winograd.check_operands(result, first, second)?;
    tracing::debug!(
        size = first.size(),
        threads = ?config.threads,
        "winograd multiply (parallel)"
    );

    let n = first.size();
    config.install(|| {
        let row_factors: Vec<f64> = (0..n)
            .into_par_iter()
            .map(|i| row_factor(first.row(i)))
            .collect();
        let column_factors: Vec<f64> = (0..n)
            .into_par_iter()
            .map(|j| column_factor(second, j))
            .collect();

        result.par_rows_mut().enumerate().for_each(|(i, row)| {
            fill_row(row, first.row(i), second, row_factors[i], &column_factors);
        });
    })
}
