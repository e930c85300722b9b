//! Benchmark driver.
//!
//! For each size: build the ramp inputs (`first[i][j] = i + 1`,
//! `second[i][j] = j + 1`), time the parallel and then the serial form of one
//! algorithm on them, and check that both produced the same matrix.

use crate::algorithm::{Algorithm, Multiplier, Variant};
use crate::error::Result;
use crate::matrix::{Matrix, elements_equal};
use crate::threaded::ParallelConfig;
use std::fmt;
use std::time::{Duration, Instant};

/// Sizes benchmarked when none are given.
pub const DEFAULT_SIZES: [usize; 5] = [64, 128, 256, 512, 1024];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BenchConfig {
    pub sizes: Vec<usize>,
    pub algorithm: Algorithm,
    pub parallel: ParallelConfig,
    /// Timed runs per variant, averaged. A warm-up run always comes first.
    pub iterations: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            sizes: DEFAULT_SIZES.to_vec(),
            algorithm: Algorithm::RecursiveInPlace,
            parallel: ParallelConfig::default(),
            iterations: 1,
        }
    }
}

/// One line of benchmark output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BenchRecord {
    pub size: usize,
    pub parallel: Duration,
    pub serial: Duration,
    /// Serial and parallel results were identical.
    pub equal: bool,
}

impl BenchRecord {
    pub fn speedup(&self) -> f64 {
        self.serial.as_secs_f64() / self.parallel.as_secs_f64()
    }
}

impl fmt::Display for BenchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{:.6}\t{:.6}\t{}",
            self.size,
            self.parallel.as_secs_f64(),
            self.serial.as_secs_f64(),
            u8::from(self.equal)
        )
    }
}

/// Benchmark every size in `config`, stopping at the first error.
pub fn run(config: &BenchConfig) -> Result<Vec<BenchRecord>> {
    tracing::info!(
        algorithm = %config.algorithm,
        sizes = ?config.sizes,
        iterations = config.iterations,
        "starting benchmark"
    );

    let mut records = Vec::with_capacity(config.sizes.len());
    for &size in &config.sizes {
        let record = run_size(size, config.algorithm, &config.parallel, config.iterations)?;
        if record.equal {
            tracing::info!(
                size,
                parallel_ms = record.parallel.as_secs_f64() * 1000.0,
                serial_ms = record.serial.as_secs_f64() * 1000.0,
                "size done"
            );
        } else {
            tracing::warn!(size, "serial and parallel results differ");
        }
        records.push(record);
    }
    Ok(records)
}

/// Benchmark one size: parallel first, then serial, then compare.
pub fn run_size(
    size: usize,
    algorithm: Algorithm,
    parallel: &ParallelConfig,
    iterations: usize,
) -> Result<BenchRecord> {
    algorithm.validate(size)?;

    let first = Matrix::row_ramp(size);
    let second = Matrix::column_ramp(size);

    let (parallel_result, parallel_time) = time_variant(
        &Variant::parallel(algorithm, *parallel),
        &first,
        &second,
        iterations,
    )?;
    let (serial_result, serial_time) =
        time_variant(&Variant::serial(algorithm), &first, &second, iterations)?;

    Ok(BenchRecord {
        size,
        parallel: parallel_time,
        serial: serial_time,
        equal: elements_equal(&parallel_result, &serial_result),
    })
}

/// Warm up once, then average `iterations` timed runs, each into a fresh
/// result. Returns the last result with the average time.
fn time_variant<M: Multiplier>(
    multiplier: &M,
    first: &Matrix,
    second: &Matrix,
    iterations: usize,
) -> Result<(Matrix, Duration)> {
    let size = first.size();
    let mut result = Matrix::try_zeros(size)?;
    multiplier.multiply(&mut result, first, second)?;

    let iterations = iterations.max(1);
    let mut total = Duration::ZERO;
    for _ in 0..iterations {
        result = Matrix::try_zeros(size)?;
        let start = Instant::now();
        multiplier.multiply(&mut result, first, second)?;
        total += start.elapsed();
    }

    Ok((result, average(total, iterations)))
}

/// `total / iterations` without narrowing the count.
fn average(total: Duration, iterations: usize) -> Duration {
    total.div_f64(iterations.max(1) as f64)
}

/// Multiply the ramp inputs once and render operands and product.
pub fn demo(size: usize, algorithm: Algorithm) -> Result<String> {
    let first = Matrix::row_ramp(size);
    let second = Matrix::column_ramp(size);
    let mut result = Matrix::try_zeros(size)?;

    Variant::serial(algorithm).multiply(&mut result, &first, &second)?;
    Ok(format!("A\n{}B\n{}Result\n{}", first, second, result))
}
