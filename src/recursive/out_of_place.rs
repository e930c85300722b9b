//! Out-of-place recursive multiplication.

use crate::algorithm::Algorithm;
use crate::error::Result;
use crate::kernels::kernel_2x2::{kernel_2x2, load_2x2};
use crate::matrix::Matrix;

/// Recursive matrix multiplication: `result = first * second`.
///
/// Every level copies the eight operand quadrants into fresh half-size
/// matrices, multiplies the eight pairs into eight more, and sums them into
/// the result quadrants. `result` is overwritten.
///
/// # Errors
///
/// [`MatmulError::InvalidSize`](crate::MatmulError::InvalidSize) unless the
/// size is a power of two ≥ 2, and
/// [`MatmulError::ShapeMismatch`](crate::MatmulError::ShapeMismatch) if the
/// three matrices differ in size.
pub fn multiply(result: &mut Matrix, first: &Matrix, second: &Matrix) -> Result<()> {
    Algorithm::RecursiveOutOfPlace.check_operands(result, first, second)?;
    tracing::debug!(size = first.size(), "recursive out-of-place multiply");

    mult(result, first, second);
    Ok(())
}

/// Unchecked recursion. Sizes must already be validated.
pub(crate) fn mult(result: &mut Matrix, first: &Matrix, second: &Matrix) {
    let size = first.size();
    if size == 2 {
        let [[r, s], [t, u]] = kernel_2x2(load_2x2(first, 0, 0), load_2x2(second, 0, 0));
        result[(0, 0)] = r;
        result[(0, 1)] = s;
        result[(1, 0)] = t;
        result[(1, 1)] = u;
        return;
    }

    let half = size / 2;
    let [a, b, c, d] = first.quadrants();
    let [e, f, g, h] = second.quadrants();

    let mut products = Products::new(half);
    let Products {
        ae,
        bg,
        af,
        bh,
        ce,
        dg,
        cf,
        dh,
    } = &mut products;

    mult(ae, &a, &e);
    mult(bg, &b, &g);

    mult(af, &a, &f);
    mult(bh, &b, &h);

    mult(ce, &c, &e);
    mult(dg, &d, &g);

    mult(cf, &c, &f);
    mult(dh, &d, &h);

    for (i, row) in result.as_mut_slice().chunks_mut(size).enumerate() {
        products.combine_row(i, row);
    }
}

/// The eight half-size partial products of one recursion level.
pub(crate) struct Products {
    pub ae: Matrix,
    pub bg: Matrix,
    pub af: Matrix,
    pub bh: Matrix,
    pub ce: Matrix,
    pub dg: Matrix,
    pub cf: Matrix,
    pub dh: Matrix,
}

impl Products {
    pub(crate) fn new(half: usize) -> Self {
        Self {
            ae: Matrix::zeros(half),
            bg: Matrix::zeros(half),
            af: Matrix::zeros(half),
            bh: Matrix::zeros(half),
            ce: Matrix::zeros(half),
            dg: Matrix::zeros(half),
            cf: Matrix::zeros(half),
            dh: Matrix::zeros(half),
        }
    }

    /// Fill row `i` of the full-size result from the partial products.
    ///
    /// Rows only read the products, so any set of rows can be filled
    /// concurrently once all eight products are complete.
    pub(crate) fn combine_row(&self, i: usize, row: &mut [f64]) {
        let half = self.ae.size();
        let (left, right) = row.split_at_mut(half);

        if i < half {
            sum_into(left, self.ae.row(i), self.bg.row(i)); // r = ae + bg
            sum_into(right, self.af.row(i), self.bh.row(i)); // s = af + bh
        } else {
            let i = i - half;
            sum_into(left, self.ce.row(i), self.dg.row(i)); // t = ce + dg
            sum_into(right, self.cf.row(i), self.dh.row(i)); // u = cf + dh
        }
    }
}

#[inline]
fn sum_into(dst: &mut [f64], x: &[f64], y: &[f64]) {
    for ((d, x), y) in dst.iter_mut().zip(x).zip(y) {
        *d = x + y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MatmulError;
    use crate::matrix::naive_ikj::multiply_naive;

    #[test]
    fn test_base_case() {
        let first = Matrix::from_rows([[1.0, 2.0], [3.0, 4.0]]);
        let second = Matrix::from_rows([[5.0, 6.0], [7.0, 8.0]]);
        let mut result = Matrix::zeros(2);

        multiply(&mut result, &first, &second).unwrap();
        assert_eq!(result, Matrix::from_rows([[19.0, 22.0], [43.0, 50.0]]));
    }

    #[test]
    fn test_matches_naive() {
        for size in [2, 4, 8, 16, 32, 64] {
            let first = Matrix::from_fn(size, |i, j| ((i * 7 + j * 3) % 11) as f64 - 5.0);
            let second = Matrix::from_fn(size, |i, j| ((i * 5 + j) % 13) as f64);

            let mut expected = Matrix::zeros(size);
            let mut result = Matrix::zeros(size);
            multiply_naive(&mut expected, &first, &second).unwrap();
            multiply(&mut result, &first, &second).unwrap();

            assert_eq!(expected, result, "size {}", size);
        }
    }

    #[test]
    fn test_overwrites_result() {
        let first = Matrix::row_ramp(8);
        let second = Matrix::column_ramp(8);
        let mut result = Matrix::from_fn(8, |_, _| -1.0);

        multiply(&mut result, &first, &second).unwrap();
        assert_eq!(result[(3, 5)], (8 * 4 * 6) as f64);
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        for size in [0, 1, 3, 6, 12] {
            let m = Matrix::zeros(size);
            let mut result = Matrix::zeros(size);
            let err = multiply(&mut result, &m, &m).unwrap_err();
            assert!(matches!(err, MatmulError::InvalidSize { .. }), "size {}", size);
        }
    }

    #[test]
    fn test_rejects_mismatched_operands() {
        let mut result = Matrix::zeros(4);
        let err = multiply(&mut result, &Matrix::zeros(4), &Matrix::zeros(8)).unwrap_err();
        assert_eq!(err, MatmulError::ShapeMismatch { expected: 4, got: 8 });
    }
}
