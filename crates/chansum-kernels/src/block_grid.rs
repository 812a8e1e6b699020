//! Partitioning of the spatial plane into `ksize x ksize` blocks.
//!
//! The last block row and column are clamped to the array bound, so
//! heights and widths that are not multiples of `ksize` are supported.

use std::ops::Range;

use ndarray::{ArrayView, ArrayView3, Dimension, Ix3};

use crate::error::{ChansumError, Result};

/// Check that `input` is `(H, W, C)` and return it as a 3-D view.
pub fn hwc_view<'a, A, D: Dimension>(input: ArrayView<'a, A, D>) -> Result<ArrayView3<'a, A>> {
    let got = input.shape().to_vec();
    input
        .into_dimensionality::<Ix3>()
        .map_err(|_| ChansumError::InvalidShape { expected_ndim: 3, got })
}

/// One block of the grid: its index and the clamped pixel ranges it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub index: (usize, usize),
    pub rows: Range<usize>,
    pub cols: Range<usize>,
}

impl Block {
    /// Whether the block was cut short by the array bound.
    pub fn is_clamped(&self, ksize: usize) -> bool {
        self.rows.len() < ksize || self.cols.len() < ksize
    }
}

/// Grid of block indices `[0, ceil(H/ksize)) x [0, ceil(W/ksize))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGrid {
    height: usize,
    width: usize,
    ksize: usize,
}

impl BlockGrid {
    pub fn new(height: usize, width: usize, ksize: usize) -> Result<Self> {
        if ksize == 0 {
            return Err(ChansumError::InvalidBlockSize(ksize));
        }
        Ok(Self {
            height,
            width,
            ksize,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn ksize(&self) -> usize {
        self.ksize
    }

    /// Number of block rows, counting a trailing partial row.
    pub fn block_rows(&self) -> usize {
        self.height.div_ceil(self.ksize)
    }

    /// Number of block columns, counting a trailing partial column.
    pub fn block_cols(&self) -> usize {
        self.width.div_ceil(self.ksize)
    }

    pub fn num_blocks(&self) -> usize {
        self.block_rows() * self.block_cols()
    }

    /// Whether both H and W are exact multiples of ksize.
    pub fn is_exact(&self) -> bool {
        self.height % self.ksize == 0 && self.width % self.ksize == 0
    }

    /// Pixel rows covered by block row `by`, clamped to H.
    pub fn row_range(&self, by: usize) -> Range<usize> {
        let start = (by * self.ksize).min(self.height);
        start..(start + self.ksize).min(self.height)
    }

    /// Pixel columns covered by block column `bx`, clamped to W.
    pub fn col_range(&self, bx: usize) -> Range<usize> {
        let start = (bx * self.ksize).min(self.width);
        start..(start + self.ksize).min(self.width)
    }

    pub fn block(&self, by: usize, bx: usize) -> Block {
        Block {
            index: (by, bx),
            rows: self.row_range(by),
            cols: self.col_range(bx),
        }
    }

    /// All blocks in row-major block order.
    pub fn blocks(&self) -> impl Iterator<Item = Block> + '_ {
        let cols = self.block_cols();
        (0..self.block_rows()).flat_map(move |by| (0..cols).map(move |bx| self.block(by, bx)))
    }
}
