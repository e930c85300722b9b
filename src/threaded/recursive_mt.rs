//! Fork-join out-of-place recursive multiplication.

use crate::algorithm::Algorithm;
use crate::error::Result;
use crate::matrix::Matrix;
use crate::recursive::out_of_place::{self, Products};
use crate::threaded::ParallelConfig;
use rayon::prelude::*;

/// Parallel [`out_of_place::multiply`].
///
/// Per level: quadrant copy-out runs row-parallel; then the eight
/// products are spawned as tasks, each writing only its own temporary;
/// the scope joins all eight before the row-parallel summation reads them.
/// Results are bit-identical to the serial engine.
pub fn multiply_parallel(
    result: &mut Matrix,
    first: &Matrix,
    second: &Matrix,
    config: &ParallelConfig,
) -> Result<()> {
    Algorithm::RecursiveOutOfPlace.check_operands(result, first, second)?;
    tracing::debug!(
        size = first.size(),
        threads = ?config.threads,
        cutoff = config.cutoff(),
        "recursive out-of-place multiply (parallel)"
    );

    let cutoff = config.cutoff();
    config.install(|| mult_parallel(result, first, second, cutoff))
}

fn mult_parallel(result: &mut Matrix, first: &Matrix, second: &Matrix, cutoff: usize) {
    let size = first.size();
    if size <= cutoff {
        out_of_place::mult(result, first, second);
        return;
    }

    let half = size / 2;
    let [a, b, c, d] = first.par_quadrants();
    let [e, f, g, h] = second.par_quadrants();

    let mut products = Products::new(half);
    {
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
        let (a, b, c, d) = (&a, &b, &c, &d);
        let (e, f, g, h) = (&e, &f, &g, &h);

        rayon::scope(|s| {
            s.spawn(|_| mult_parallel(ae, a, e, cutoff));
            s.spawn(|_| mult_parallel(bg, b, g, cutoff));

            s.spawn(|_| mult_parallel(af, a, f, cutoff));
            s.spawn(|_| mult_parallel(bh, b, h, cutoff));

            s.spawn(|_| mult_parallel(ce, c, e, cutoff));
            s.spawn(|_| mult_parallel(dg, d, g, cutoff));

            s.spawn(|_| mult_parallel(cf, c, f, cutoff));
            s.spawn(|_| mult_parallel(dh, d, h, cutoff));
        });
    }

    result
        .par_rows_mut()
        .enumerate()
        .for_each(|(i, row)| products.combine_row(i, row));
}
