//! Closed-form base case shared by every recursive engine.
//!
//! The recursion bottoms out at 2×2 blocks, which are multiplied directly
//! by `kernel_2x2` instead of being split again.

pub mod kernel_2x2;
