//! 2×2 base-case kernel.

use crate::matrix::Matrix;

/// A 2×2 block, row-major.
pub type Block2 = [[f64; 2]; 2];

/// Multiply two 2×2 blocks.
///
/// ```text
///   | r  s |     | a  b |   | e  f |
///   |      |  =  |      | * |      |
///   | t  u |     | c  d |   | g  h |
///
///   r = ae + bg    s = af + bh
///   t = ce + dg    u = cf + dh
/// ```
#[inline(always)]
pub fn kernel_2x2(first: Block2, second: Block2) -> Block2 {
    let [[a, b], [c, d]] = first;
    let [[e, f], [g, h]] = second;

    [
        [a * e + b * g, a * f + b * h],
        [c * e + d * g, c * f + d * h],
    ]
}

/// Read the 2×2 block whose top-left element is `(row, col)`.
#[inline(always)]
pub fn load_2x2(m: &Matrix, row: usize, col: usize) -> Block2 {
    [
        [m[(row, col)], m[(row, col + 1)]],
        [m[(row + 1, col)], m[(row + 1, col + 1)]],
    ]
}
