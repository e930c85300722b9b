//! Recursive divide-and-conquer multiplication, single-threaded.
//!
//! Both engines split each operand into quadrants and compute
//!
//! ```text
//!   | r  s |     | a  b |   | e  f |      r = ae + bg
//!   |      |  =  |      | * |      |      s = af + bh
//!   | t  u |     | c  d |   | g  h |      t = ce + dg
//!                                         u = cf + dh
//! ```
//!
//! recursing until the blocks are 2×2. Sizes must be powers of two.
//!
//! Available implementations:
//! - `out_of_place`: copies quadrants into sixteen temporaries per level and
//!   sums the eight partial products into the result
//! - `in_place`: addresses quadrants by row/column offsets into the original
//!   buffers and accumulates straight into the result, allocating nothing
//!
//! The task-parallel forms live in [`crate::threaded`].

pub mod in_place;
pub mod out_of_place;
