//! Algorithm selection.
//!
//! Every engine in the crate has the same shape, `multiply(result, first,
//! second)`, so the benchmark picks one by value: an [`Algorithm`] plus an
//! [`Execution`] mode make a [`Variant`], and a `Variant` is a
//! [`Multiplier`].

use crate::error::{MatmulError, Result};
use crate::matrix::Matrix;
use crate::threaded::ParallelConfig;
use crate::{recursive, threaded, winograd};
use std::fmt;
use std::str::FromStr;

/// Anything that computes `result = first * second`.
pub trait Multiplier {
    fn multiply(&self, result: &mut Matrix, first: &Matrix, second: &Matrix) -> Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Quadrant copies into temporaries, see [`recursive::out_of_place`].
    RecursiveOutOfPlace,
    /// Offset-addressed accumulation, see [`recursive::in_place`].
    RecursiveInPlace,
    /// Additive row/column factors, see [`winograd`].
    Winograd,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [
        Algorithm::RecursiveOutOfPlace,
        Algorithm::RecursiveInPlace,
        Algorithm::Winograd,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::RecursiveOutOfPlace => "recursive",
            Algorithm::RecursiveInPlace => "in-place",
            Algorithm::Winograd => "winograd",
        }
    }

    /// Check that this algorithm is defined for `size`.
    ///
    /// The recursive engines halve down to 2×2 blocks, so they need a power
    /// of two ≥ 2. Winograd pairs up columns and only needs an even size.
    pub fn validate(self, size: usize) -> Result<()> {
        let (ok, requirement) = match self {
            Algorithm::RecursiveOutOfPlace | Algorithm::RecursiveInPlace => (
                size >= 2 && size.is_power_of_two(),
                "size must be a power of two >= 2",
            ),
            Algorithm::Winograd => (size >= 2 && size % 2 == 0, "size must be even and >= 2"),
        };
        if ok {
            Ok(())
        } else {
            Err(MatmulError::InvalidSize {
                size,
                algorithm: self.name(),
                requirement,
            })
        }
    }

    /// Check that all three operands share one size valid for this algorithm.
    pub fn check_operands(self, result: &Matrix, first: &Matrix, second: &Matrix) -> Result<()> {
        first.ensure_same_size(second)?;
        first.ensure_same_size(result)?;
        self.validate(first.size())
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "recursive" | "out-of-place" => Ok(Algorithm::RecursiveOutOfPlace),
            "in-place" | "inplace" => Ok(Algorithm::RecursiveInPlace),
            "winograd" => Ok(Algorithm::Winograd),
            other => Err(format!(
                "unknown algorithm '{}' (expected recursive, in-place or winograd)",
                other
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Execution {
    Serial,
    Parallel(ParallelConfig),
}

/// One concrete multiplier: an algorithm and how to run it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Variant {
    pub algorithm: Algorithm,
    pub execution: Execution,
}

impl Variant {
    pub fn serial(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            execution: Execution::Serial,
        }
    }

    pub fn parallel(algorithm: Algorithm, config: ParallelConfig) -> Self {
        Self {
            algorithm,
            execution: Execution::Parallel(config),
        }
    }

    /// Serial and parallel form of every algorithm.
    pub fn all(config: ParallelConfig) -> Vec<Variant> {
        Algorithm::ALL
            .into_iter()
            .flat_map(|algorithm| [Variant::serial(algorithm), Variant::parallel(algorithm, config)])
            .collect()
    }

    pub fn is_parallel(&self) -> bool {
        matches!(self.execution, Execution::Parallel(_))
    }
}

impl Multiplier for Variant {
    fn multiply(&self, result: &mut Matrix, first: &Matrix, second: &Matrix) -> Result<()> {
        match (self.algorithm, &self.execution) {
            (Algorithm::RecursiveOutOfPlace, Execution::Serial) => {
                recursive::out_of_place::multiply(result, first, second)
            }
            (Algorithm::RecursiveOutOfPlace, Execution::Parallel(config)) => {
                threaded::recursive_mt::multiply_parallel(result, first, second, config)
            }
            (Algorithm::RecursiveInPlace, Execution::Serial) => {
                recursive::in_place::multiply(result, first, second)
            }
            (Algorithm::RecursiveInPlace, Execution::Parallel(config)) => {
                threaded::in_place_mt::multiply_parallel(result, first, second, config)
            }
            (Algorithm::Winograd, Execution::Serial) => winograd::multiply(result, first, second),
            (Algorithm::Winograd, Execution::Parallel(config)) => {
                threaded::winograd_mt::multiply_parallel(result, first, second, config)
            }
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.execution {
            Execution::Serial => write!(f, "{} (serial)", self.algorithm),
            Execution::Parallel(_) => write!(f, "{} (parallel)", self.algorithm),
        }
    }
}
