//! In-place recursive multiplication.
//!
//! Instead of copying quadrants out, each recursive call carries the
//! row/column offsets of the blocks it works on. The base case adds its
//! 2×2 product straight into the result, so a result block receives one
//! contribution from each of its two terms (`ae` and `bg` both land in `r`).

use crate::algorithm::Algorithm;
use crate::error::Result;
use crate::kernels::kernel_2x2::{kernel_2x2, load_2x2};
use crate::matrix::{Matrix, Quadrant};

/// Offsets of the three blocks a recursive call works on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Region {
    pub result_row: usize,
    pub result_col: usize,
    pub first_row: usize,
    pub first_col: usize,
    pub second_row: usize,
    pub second_col: usize,
}

impl Region {
    /// The two sub-regions, at size `half`, whose products sum into
    /// `quadrant` of this region's result block.
    ///
    /// For the top-left quadrant these are `ae` and `bg`; in general the
    /// `k`-th term multiplies first-block column band `k` with second-block
    /// row band `k`.
    pub fn terms(self, quadrant: Quadrant, half: usize) -> [Region; 2] {
        let (row, col) = quadrant.offsets(half);
        [0, half].map(|k| Region {
            result_row: self.result_row + row,
            result_col: self.result_col + col,
            first_row: self.first_row + row,
            first_col: self.first_col + k,
            second_row: self.second_row + k,
            second_col: self.second_col + col,
        })
    }

    /// All eight sub-regions: `ae, bg, af, bh, ce, dg, cf, dh`.
    pub fn children(self, half: usize) -> [Region; 8] {
        let mut out = [Region::default(); 8];
        for (i, quadrant) in Quadrant::ALL.into_iter().enumerate() {
            let [x, y] = self.terms(quadrant, half);
            out[2 * i] = x;
            out[2 * i + 1] = y;
        }
        out
    }
}

/// Destination of base-case contributions.
///
/// Coordinates are absolute positions in the full result matrix.
pub(crate) trait Accumulate {
    fn accumulate(&mut self, row: usize, col: usize, value: f64);
}

impl Accumulate for Matrix {
    #[inline(always)]
    fn accumulate(&mut self, row: usize, col: usize, value: f64) {
        self[(row, col)] += value;
    }
}

/// `result = first * second`, computed in place.
///
/// Zeroes `result` and then runs [`multiply_accumulate`].
pub fn multiply(result: &mut Matrix, first: &Matrix, second: &Matrix) -> Result<()> {
    Algorithm::RecursiveInPlace.check_operands(result, first, second)?;
    result.fill(0.0);
    multiply_accumulate(result, first, second)
}

/// `result += first * second`, computed in place.
///
/// No temporaries are allocated at any level. `result` is not cleared:
/// pass a zeroed matrix to get the plain product. Calling this twice on the
/// same buffer leaves twice the product in it.
///
/// # Errors
///
/// Same size rules as [`crate::recursive::out_of_place::multiply`].
pub fn multiply_accumulate(result: &mut Matrix, first: &Matrix, second: &Matrix) -> Result<()> {
    Algorithm::RecursiveInPlace.check_operands(result, first, second)?;
    tracing::debug!(size = first.size(), "recursive in-place multiply");

    multiply_region(result, first, second, Region::default(), first.size());
    Ok(())
}

/// Unchecked recursion over one region of size `size`.
pub(crate) fn multiply_region<A>(
    acc: &mut A,
    first: &Matrix,
    second: &Matrix,
    region: Region,
    size: usize,
) where
    A: Accumulate + ?Sized,
{
    if size == 2 {
        let out = kernel_2x2(
            load_2x2(first, region.first_row, region.first_col),
            load_2x2(second, region.second_row, region.second_col),
        );
        for (di, row) in out.iter().enumerate() {
            for (dj, &value) in row.iter().enumerate() {
                acc.accumulate(region.result_row + di, region.result_col + dj, value);
            }
        }
        return;
    }

    let half = size / 2;
    for child in region.children(half) {
        multiply_region(acc, first, second, child, half);
    }
}
