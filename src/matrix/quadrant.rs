//! Quadrant decomposition.
//!
//! ```text
//!   | a  b |      TopLeft     TopRight
//!   |      |
//!   | c  d |      BottomLeft  BottomRight
//! ```

use super::Matrix;
use rayon::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    /// `(row, col)` of the quadrant's top-left element in a matrix of size `2 * half`.
    #[inline]
    pub fn offsets(self, half: usize) -> (usize, usize) {
        match self {
            Quadrant::TopLeft => (0, 0),
            Quadrant::TopRight => (0, half),
            Quadrant::BottomLeft => (half, 0),
            Quadrant::BottomRight => (half, half),
        }
    }
}

impl Matrix {
    /// Copy one quadrant of `self` into `dst`, which must be half our size.
    pub fn copy_quadrant_into(&self, quadrant: Quadrant, dst: &mut Matrix) {
        let half = dst.size();
        debug_assert_eq!(self.size(), 2 * half);
        let (row_off, col_off) = quadrant.offsets(half);

        for i in 0..half {
            dst.row_mut(i)
                .copy_from_slice(&self.row(row_off + i)[col_off..col_off + half]);
        }
    }

    /// Row-parallel [`Matrix::copy_quadrant_into`].
    pub fn par_copy_quadrant_into(&self, quadrant: Quadrant, dst: &mut Matrix) {
        let half = dst.size();
        debug_assert_eq!(self.size(), 2 * half);
        let (row_off, col_off) = quadrant.offsets(half);

        dst.par_rows_mut().enumerate().for_each(|(i, row)| {
            row.copy_from_slice(&self.row(row_off + i)[col_off..col_off + half]);
        });
    }

    /// Split into the four quadrants, in [`Quadrant::ALL`] order.
    pub fn quadrants(&self) -> [Matrix; 4] {
        let half = self.size() / 2;
        Quadrant::ALL.map(|quadrant| {
            let mut block = Matrix::zeros(half);
            self.copy_quadrant_into(quadrant, &mut block);
            block
        })
    }

    /// Row-parallel [`Matrix::quadrants`].
    pub fn par_quadrants(&self) -> [Matrix; 4] {
        let half = self.size() / 2;
        Quadrant::ALL.map(|quadrant| {
            let mut block = Matrix::zeros(half);
            self.par_copy_quadrant_into(quadrant, &mut block);
            block
        })
    }

    /// Overwrite one quadrant of `self` with `src`, which must be half our size.
    pub fn write_quadrant(&mut self, quadrant: Quadrant, src: &Matrix) {
        let half = src.size();
        debug_assert_eq!(self.size(), 2 * half);
        let (row_off, col_off) = quadrant.offsets(half);

        for i in 0..half {
            self.row_mut(row_off + i)[col_off..col_off + half].copy_from_slice(src.row(i));
        }
    }
}
