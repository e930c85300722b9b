//! Task-parallel (fork-join) forms of every engine.
//!
//! Built on rayon: `rayon::scope` is the fork-join group (each `spawn` is a
//! task, leaving the scope is the join barrier) and `par_chunks_mut` runs
//! the row loops in parallel.
//!
//! Available implementations:
//! - `recursive_mt`: out-of-place recursion, eight product tasks per level
//! - `in_place_mt`: in-place recursion, see [`InPlaceSchedule`] for how
//!   tasks that add into the same result block are kept apart
//! - `winograd_mt`: row-parallel Winograd

pub mod in_place_mt;
pub mod recursive_mt;
pub mod winograd_mt;

use crate::error::{MatmulError, Result};
use parking_lot::Mutex;
use rayon::ThreadPool;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

/// Default size at and below which a task recurses serially.
pub const DEFAULT_TASK_CUTOFF: usize = 32;

/// How the parallel in-place engine keeps concurrent additions apart.
///
/// Each result block is the sum of two products (`r = ae + bg`), and the
/// in-place engine adds both straight into the result, so the two
/// contributing subtrees write the same addresses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InPlaceSchedule {
    /// One task per result quadrant. The task owns its quadrant exclusively
    /// and runs the two contributing products one after the other. Results
    /// are bit-identical to the serial engine.
    #[default]
    PairedQuadrants,
    /// All eight products are independent tasks adding into a shared
    /// accumulator with atomic compare-and-swap. Additions land in
    /// scheduling order, so results match the serial engine bit-for-bit only
    /// when every addition is exact.
    AtomicAccumulate,
}

impl fmt::Display for InPlaceSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InPlaceSchedule::PairedQuadrants => f.write_str("paired"),
            InPlaceSchedule::AtomicAccumulate => f.write_str("atomic"),
        }
    }
}

impl FromStr for InPlaceSchedule {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "paired" => Ok(InPlaceSchedule::PairedQuadrants),
            "atomic" => Ok(InPlaceSchedule::AtomicAccumulate),
            other => Err(format!(
                "unknown schedule '{}' (expected paired or atomic)",
                other
            )),
        }
    }
}

/// Knobs for the parallel engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Worker threads. `None` runs on rayon's global pool.
    pub threads: Option<usize>,
    /// Sub-problems of this size or smaller run serially inside the task
    /// that reached them. The arithmetic is unchanged, only the task count.
    /// Values below 2 are treated as 2, i.e. a task for every
    /// sub-multiplication down to the base case.
    pub task_cutoff: usize,
    pub in_place_schedule: InPlaceSchedule,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            threads: None,
            task_cutoff: DEFAULT_TASK_CUTOFF,
            in_place_schedule: InPlaceSchedule::default(),
        }
    }
}

impl ParallelConfig {
    pub fn with_threads(threads: usize) -> Self {
        Self {
            threads: Some(threads),
            ..Self::default()
        }
    }

    pub(crate) fn cutoff(&self) -> usize {
        self.task_cutoff.max(2)
    }

    /// Run `op` on the configured pool and return once it has finished.
    pub(crate) fn install<R, OP>(&self, op: OP) -> Result<R>
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        match self.threads {
            None => Ok(op()),
            Some(threads) => Ok(dedicated_pool(threads)?.install(op)),
        }
    }
}

/// Dedicated pools, one per thread count, built on first use and kept for
/// the life of the process.
fn pools() -> &'static Mutex<HashMap<usize, Arc<ThreadPool>>> {
    static POOLS: OnceLock<Mutex<HashMap<usize, Arc<ThreadPool>>>> = OnceLock::new();
    POOLS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// The shared pool with `threads` workers.
pub fn dedicated_pool(threads: usize) -> Result<Arc<ThreadPool>> {
    let mut pools = pools().lock();
    if let Some(pool) = pools.get(&threads) {
        return Ok(Arc::clone(pool));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(move |i| format!("matmul-{}-{}", threads, i))
        .build()
        .map_err(|e| MatmulError::ThreadPool(e.to_string()))?;
    tracing::debug!(threads, "built thread pool");

    let pool = Arc::new(pool);
    pools.insert(threads, Arc::clone(&pool));
    Ok(pool)
}
