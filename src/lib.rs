//! Recursive divide-and-conquer matrix multiplication in Rust.
//!
//! I wanted to see how much the textbook recursive algorithm (CLRS 28.2)
//! actually pays for its temporaries, and what fork-join parallelism buys on
//! top. This crate has three engines, each in a serial and a task-parallel
//! form:
//!
//! - **Recursive, out-of-place**: copies quadrants into sixteen temporaries
//!   per level
//! - **Recursive, in-place**: addresses quadrants by offset, allocates nothing
//! - **Winograd**: precomputed row/column factors, any even size
//!
//! ## Usage
//!
//! ```
//! use matmul_recursive::{Matrix, multiply};
//!
//! let a = Matrix::row_ramp(64);
//! let b = Matrix::column_ramp(64);
//! let mut c = Matrix::zeros(64);
//!
//! multiply(&mut c, &a, &b).unwrap();
//! assert_eq!(c[(1, 2)], 64.0 * 2.0 * 3.0);
//! ```
//!
//! For large matrices, use the fork-join version:
//!
//! ```
//! use matmul_recursive::{Matrix, multiply_parallel};
//!
//! let a = Matrix::row_ramp(256);
//! let b = Matrix::column_ramp(256);
//! let mut c = Matrix::zeros(256);
//!
//! multiply_parallel(&mut c, &a, &b, 4).unwrap();
//! ```
//!
//! To pick an engine explicitly, build a [`Variant`] and use it as a
//! [`Multiplier`].

pub mod algorithm;
pub mod error;
pub mod harness;
pub mod kernels;
pub mod matrix;
pub mod recursive;
pub mod threaded;
pub mod winograd;

pub use algorithm::{Algorithm, Execution, Multiplier, Variant};
pub use error::{MatmulError, Result};
pub use matrix::naive_ikj::multiply_naive;
pub use matrix::{Matrix, elements_equal};
pub use threaded::{InPlaceSchedule, ParallelConfig};

/// Matrix multiply: `result = first * second`.
///
/// Picks the engine the size allows: recursive in-place for powers of two,
/// Winograd for other even sizes, the naive triple loop otherwise.
///
/// # Errors
///
/// [`MatmulError::ShapeMismatch`] if the three matrices differ in size.
pub fn multiply(result: &mut Matrix, first: &Matrix, second: &Matrix) -> Result<()> {
    match engine_for(first.size()) {
        Some(algorithm) => Variant::serial(algorithm).multiply(result, first, second),
        None => multiply_naive(result, first, second),
    }
}

/// Same as [`multiply`] but fork-join parallel on `num_threads` workers.
pub fn multiply_parallel(
    result: &mut Matrix,
    first: &Matrix,
    second: &Matrix,
    num_threads: usize,
) -> Result<()> {
    match engine_for(first.size()) {
        Some(algorithm) => Variant::parallel(algorithm, ParallelConfig::with_threads(num_threads))
            .multiply(result, first, second),
        None => multiply_naive(result, first, second),
    }
}

fn engine_for(size: usize) -> Option<Algorithm> {
    [Algorithm::RecursiveInPlace, Algorithm::Winograd]
        .into_iter()
        .find(|algorithm| algorithm.validate(size).is_ok())
}
