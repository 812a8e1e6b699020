//! # chansum-kernels
//!
//! Reduction kernels over `ndarray` views.
//!
//! Provides:
//! - `sine_sum`: sum of the elementwise sine of a real array
//! - `block_sum`: per-pixel channel sum of an `(H, W, C)` array, iterated
//!   in `ksize x ksize` blocks
//! - `par_block_sum`: the same reduction with rayon fork-join parallelism
//!   over the block grid
//! - `KernelConfig`: worker-pool and threshold settings

pub mod block_grid;
pub mod block_sum;
pub mod config;
pub mod error;
pub mod par_block_sum;
pub mod sine_sum;

pub use block_grid::{hwc_view, Block, BlockGrid};
pub use block_sum::block_sum;
pub use config::KernelConfig;
pub use error::{ChansumError, Result};
pub use par_block_sum::{par_block_sum, par_block_sum_with};
pub use sine_sum::sine_sum;
