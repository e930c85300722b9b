use super::Matrix;
use crate::error::Result;

/// Reference product using the cache-friendly i-k-j loop order.
///
/// `result` is overwritten. Works for any size, so it doubles as the
/// brute-force oracle the recursive engines are checked against.
pub fn multiply_naive(result: &mut Matrix, first: &Matrix, second: &Matrix) -> Result<()> {
    result.ensure_same_size(first)?;
    result.ensure_same_size(second)?;

    let n = first.size();
    result.fill(0.0);

    for i in 0..n {
        for p in 0..n {
            let a = first[(i, p)];
            let b_row = second.row(p);
            let c_row = result.row_mut(i);
            for j in 0..n {
                c_row[j] += a * b_row[j];
            }
        }
    }
    Ok(())
}
