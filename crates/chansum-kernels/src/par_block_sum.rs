//! Data-parallel block-wise channel sum.
//!
//! Work is split over the block grid in two levels: the output is cut
//! into bands of `ksize` rows (block rows), and each band into tiles of
//! `ksize` columns (block columns). Every task owns a disjoint mutable
//! view of the output, so no locking is needed and the result matches
//! `block_sum` bit for bit.

use ndarray::{Array2, ArrayView, ArrayView3, Axis, Dimension, LinalgScalar};
use rayon::prelude::*;
use tracing::debug;

use crate::block_grid::{hwc_view, BlockGrid};
use crate::block_sum::{block_sum, channel_sum};
use crate::config::KernelConfig;
use crate::error::Result;

/// [`block_sum`] on rayon's global pool.
pub fn par_block_sum<A, D>(input: ArrayView<'_, A, D>, ksize: usize) -> Result<Array2<A>>
where
    A: LinalgScalar + Send + Sync,
    D: Dimension,
{
    par_block_sum_with(input, ksize, &KernelConfig::default())
}

/// [`block_sum`] with fork-join parallelism, configured by `config`.
///
/// Inputs smaller than `config.par_threshold` run sequentially. When
/// `config.num_threads` is set the work runs inside a dedicated pool.
pub fn par_block_sum_with<A, D>(
    input: ArrayView<'_, A, D>,
    ksize: usize,
    config: &KernelConfig,
) -> Result<Array2<A>>
where
    A: LinalgScalar + Send + Sync,
    D: Dimension,
{
    let input = hwc_view(input)?;
    let (h, w, c) = input.dim();
    let grid = BlockGrid::new(h, w, ksize)?;

    if input.len() < config.par_threshold {
        debug!(numel = input.len(), threshold = config.par_threshold, "below threshold, running sequentially");
        return block_sum(input, ksize);
    }

    let pool = config.build_pool()?;
    debug!(
        height = h,
        width = w,
        channels = c,
        ksize,
        block_rows = grid.block_rows(),
        block_cols = grid.block_cols(),
        threads = pool.as_ref().map_or_else(rayon::current_num_threads, |p| p.current_num_threads()),
        "par_block_sum"
    );

    let run = || reduce_grid(&input, ksize);
    Ok(match pool {
        Some(pool) => pool.install(run),
        None => run(),
    })
}

fn reduce_grid<A>(input: &ArrayView3<'_, A>, ksize: usize) -> Array2<A>
where
    A: LinalgScalar + Send + Sync,
{
    let (h, w, _) = input.dim();
    let mut out = Array2::zeros((h, w));

    let bands: Vec<_> = out.axis_chunks_iter_mut(Axis(0), ksize).enumerate().collect();
    bands.into_par_iter().for_each(|(by, mut band)| {
        let y0 = by * ksize;
        let rows = y0..y0 + band.nrows();
        let tiles: Vec<_> = band.axis_chunks_iter_mut(Axis(1), ksize).enumerate().collect();
        tiles.into_par_iter().for_each(|(bx, mut tile)| {
            let x0 = bx * ksize;
            let cols = x0..x0 + tile.ncols();
            tile.assign(&channel_sum(input, rows.clone(), cols));
        });
    });

    out
}
