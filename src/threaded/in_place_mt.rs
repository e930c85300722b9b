//! Fork-join in-place recursive multiplication.

use crate::algorithm::Algorithm;
use crate::error::Result;
use crate::matrix::{Matrix, Quadrant};
use crate::recursive::in_place::{Accumulate, Region, multiply_region};
use crate::threaded::{InPlaceSchedule, ParallelConfig};
use rayon::prelude::*;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

/// Parallel [`crate::recursive::in_place::multiply`]: zeroes `result`, then
/// accumulates the product into it.
pub fn multiply_parallel(
    result: &mut Matrix,
    first: &Matrix,
    second: &Matrix,
    config: &ParallelConfig,
) -> Result<()> {
    Algorithm::RecursiveInPlace.check_operands(result, first, second)?;
    result.fill(0.0);
    multiply_accumulate_parallel(result, first, second, config)
}

/// Parallel [`crate::recursive::in_place::multiply_accumulate`]:
/// `result += first * second`.
///
/// Returns only after every spawned task has finished, so `result` is
/// complete when this returns. How concurrent additions into the same block
/// are kept apart is chosen by `config.in_place_schedule`.
pub fn multiply_accumulate_parallel(
    result: &mut Matrix,
    first: &Matrix,
    second: &Matrix,
    config: &ParallelConfig,
) -> Result<()> {
    Algorithm::RecursiveInPlace.check_operands(result, first, second)?;
    tracing::debug!(
        size = first.size(),
        threads = ?config.threads,
        cutoff = config.cutoff(),
        schedule = %config.in_place_schedule,
        "recursive in-place multiply (parallel)"
    );

    let cutoff = config.cutoff();
    let size = first.size();
    config.install(|| match config.in_place_schedule {
        InPlaceSchedule::PairedQuadrants => {
            mult_paired(
                RegionMut::new(result),
                first,
                second,
                Region::default(),
                size,
                cutoff,
            );
        }
        InPlaceSchedule::AtomicAccumulate => {
            let grid = AtomicGrid::zeros(size);
            rayon::scope(|s| {
                spawn_atomic(s, &grid, first, second, Region::default(), size, cutoff)
            });
            grid.add_into(result);
        }
    })
}

/// Each quadrant task owns its result quadrant and runs both terms of its
/// sum in order, so no address is ever written by two tasks at once.
fn mult_paired(
    mut out: RegionMut<'_>,
    first: &Matrix,
    second: &Matrix,
    region: Region,
    size: usize,
    cutoff: usize,
) {
    out.check_covers(region.result_row, region.result_col, size);
    if size <= cutoff {
        multiply_region(&mut out, first, second, region, size);
        return;
    }

    let half = size / 2;
    let quarters = out.split();

    rayon::scope(|s| {
        for (quadrant, mut quarter) in Quadrant::ALL.into_iter().zip(quarters) {
            s.spawn(move |_| {
                let [x, y] = region.terms(quadrant, half);
                mult_paired(quarter.reborrow(), first, second, x, half, cutoff); // ae
                mult_paired(quarter, first, second, y, half, cutoff); //  + bg
            });
        }
    });
}

/// Every sub-multiplication is its own task in one flat scope; only the
/// top-level scope waits.
fn spawn_atomic<'s>(
    scope: &rayon::Scope<'s>,
    grid: &'s AtomicGrid,
    first: &'s Matrix,
    second: &'s Matrix,
    region: Region,
    size: usize,
    cutoff: usize,
) {
    if size <= cutoff {
        let mut acc = grid;
        multiply_region(&mut acc, first, second, region, size);
        return;
    }

    let half = size / 2;
    for child in region.children(half) {
        scope.spawn(move |s| spawn_atomic(s, grid, first, second, child, half, cutoff));
    }
}

/// Mutable window onto one square block of a result matrix.
///
/// Windows produced by [`RegionMut::split`] cover disjoint blocks, which is
/// what lets them move to different tasks. Coordinates passed to
/// [`Accumulate::accumulate`] are absolute and must fall inside the block;
/// callers check that once per region with [`RegionMut::check_covers`].
struct RegionMut<'a> {
    base: *mut f64,
    stride: usize,
    row: usize,
    col: usize,
    size: usize,
    _marker: PhantomData<&'a mut Matrix>,
}

// SAFETY: a RegionMut only touches the elements of its own block, blocks
// handed out by `split` never overlap, and the borrow of the matrix lasts
// for 'a.
unsafe impl Send for RegionMut<'_> {}

impl<'a> RegionMut<'a> {
    fn new(matrix: &'a mut Matrix) -> Self {
        let size = matrix.size();
        Self {
            base: matrix.as_mut_slice().as_mut_ptr(),
            stride: size,
            row: 0,
            col: 0,
            size,
            _marker: PhantomData,
        }
    }

    /// The four quadrant windows, in [`Quadrant::ALL`] order.
    fn split(self) -> [RegionMut<'a>; 4] {
        let half = self.size / 2;
        Quadrant::ALL.map(|quadrant| {
            let (row, col) = quadrant.offsets(half);
            RegionMut {
                base: self.base,
                stride: self.stride,
                row: self.row + row,
                col: self.col + col,
                size: half,
                _marker: PhantomData,
            }
        })
    }

    /// Panics unless the `size` block at (`row`, `col`) lies inside this
    /// window.
    fn check_covers(&self, row: usize, col: usize, size: usize) {
        assert!(
            row >= self.row && row + size <= self.row + self.size,
            "rows {}..{} outside block {}..{}",
            row,
            row + size,
            self.row,
            self.row + self.size
        );
        assert!(
            col >= self.col && col + size <= self.col + self.size,
            "cols {}..{} outside block {}..{}",
            col,
            col + size,
            self.col,
            self.col + self.size
        );
    }

    fn reborrow(&mut self) -> RegionMut<'_> {
        RegionMut {
            base: self.base,
            stride: self.stride,
            row: self.row,
            col: self.col,
            size: self.size,
            _marker: PhantomData,
        }
    }
}

impl Accumulate for RegionMut<'_> {
    #[inline(always)]
    fn accumulate(&mut self, row: usize, col: usize, value: f64) {
        debug_assert!(
            row >= self.row && row < self.row + self.size,
            "row {} outside block {}..{}",
            row,
            self.row,
            self.row + self.size
        );
        debug_assert!(
            col >= self.col && col < self.col + self.size,
            "col {} outside block {}..{}",
            col,
            self.col,
            self.col + self.size
        );
        // SAFETY: the enclosing region passed `check_covers`, so (row, col)
        // is inside this window's block, which lies inside
        // the borrowed matrix and is not shared with any other window.
        unsafe {
            *self.base.add(row * self.stride + col) += value;
        }
    }
}

/// Shared accumulator of `f64` cells stored as bits in `AtomicU64`.
struct AtomicGrid {
    cells: Vec<AtomicU64>,
    size: usize,
}

impl AtomicGrid {
    fn zeros(size: usize) -> Self {
        // 0u64 is the bit pattern of 0.0
        let cells = (0..size * size).map(|_| AtomicU64::new(0)).collect();
        Self { cells, size }
    }

    #[inline]
    fn fetch_add(&self, row: usize, col: usize, value: f64) {
        let cell = &self.cells[row * self.size + col];
        let _ = cell.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
            Some((f64::from_bits(bits) + value).to_bits())
        });
    }

    fn add_into(&self, result: &mut Matrix) {
        result
            .as_mut_slice()
            .par_iter_mut()
            .zip(self.cells.par_iter())
            .for_each(|(r, cell)| *r += f64::from_bits(cell.load(Ordering::Relaxed)));
    }
}

impl Accumulate for &AtomicGrid {
    #[inline(always)]
    fn accumulate(&mut self, row: usize, col: usize, value: f64) {
        self.fetch_add(row, col, value);
    }
}
