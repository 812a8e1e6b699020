//! Sequential block-wise channel sum.
//!
//! `out[y][x] = Σ_c in[y][x][c]` for an `(H, W, C)` input. The plane is
//! visited one `ksize x ksize` block at a time; ksize changes the memory
//! access pattern, never the result.

use ndarray::{s, Array2, ArrayView, ArrayView3, Axis, Dimension, LinalgScalar};
use tracing::{debug, trace};

use crate::block_grid::{hwc_view, BlockGrid};
use crate::error::Result;

/// Channel sum of an `(H, W, C)` array, iterated block by block.
///
/// Accepts any dimensionality at the type level so callers holding a
/// dynamic-rank view get the shape check here. Returns a fresh `(H, W)`
/// array of the input's element type; strided input is read in place.
///
/// # Errors
/// - `InvalidShape` if the input is not 3-D
/// - `InvalidBlockSize` if `ksize == 0`
///
/// # Examples
///
/// ```
/// use chansum_kernels::block_sum;
/// use ndarray::array;
///
/// let a = array![[[1, 2], [3, 4]], [[5, 6], [7, 8]]];
/// let out = block_sum(a.view(), 1).unwrap();
/// assert_eq!(out, array![[3, 7], [11, 15]]);
/// ```
pub fn block_sum<A, D>(input: ArrayView<'_, A, D>, ksize: usize) -> Result<Array2<A>>
where
    A: LinalgScalar,
    D: Dimension,
{
    let input = hwc_view(input)?;
    let (h, w, c) = input.dim();
    let grid = BlockGrid::new(h, w, ksize)?;
    debug!(
        height = h,
        width = w,
        channels = c,
        ksize,
        blocks = grid.num_blocks(),
        "block_sum"
    );

    let mut out = Array2::zeros((h, w));
    for block in grid.blocks() {
        if block.is_clamped(ksize) {
            trace!(index = ?block.index, rows = ?block.rows, cols = ?block.cols, "clamped edge block");
        }
        out.slice_mut(s![block.rows.clone(), block.cols.clone()])
            .assign(&channel_sum(&input, block.rows, block.cols));
    }
    Ok(out)
}

/// Channel sums of the input pixels in `rows x cols`.
#[inline]
pub(crate) fn channel_sum<A: LinalgScalar>(
    input: &ArrayView3<'_, A>,
    rows: std::ops::Range<usize>,
    cols: std::ops::Range<usize>,
) -> Array2<A> {
    input.slice(s![rows, cols, ..]).sum_axis(Axis(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChansumError;
    use ndarray::{array, Array, Array3, ArrayD, IxDyn};

    fn ramp(h: usize, w: usize, c: usize) -> Array3<i32> {
        Array::from_iter((0..(h * w * c) as i32).map(|v| v * 7 % 11 - 5))
            .into_shape_with_order((h, w, c))
            .unwrap()
    }

    #[test]
    fn test_2x2x2_ksize_1() {
        let a = array![[[1, 2], [3, 4]], [[5, 6], [7, 8]]];
        let out = block_sum(a.view(), 1).unwrap();
        assert_eq!(out, array![[3, 7], [11, 15]]);
    }

    #[test]
    fn test_ksize_does_not_change_result() {
        let a = ramp(6, 8, 3);
        let expected = a.sum_axis(Axis(2));
        for ksize in [1, 2, 3, 4, 5, 8, 16] {
            assert_eq!(block_sum(a.view(), ksize).unwrap(), expected, "ksize={ksize}");
        }
    }

    #[test]
    fn test_non_multiple_shape_is_clamped() {
        // 3x5 plane with ksize 2: last block row and column are partial
        let a = Array::from_iter(1..=30i64).into_shape_with_order((3, 5, 2)).unwrap();
        let out = block_sum(a.view(), 2).unwrap();
        assert_eq!(out.dim(), (3, 5));
        assert_eq!(out, a.sum_axis(Axis(2)));
        // bottom-right pixel holds 29 + 30
        assert_eq!(out[[2, 4]], 59);
    }

    #[test]
    fn test_element_type_is_preserved() {
        let a = array![[[0.5f64, 0.25], [1.0, 2.0]]];
        let out: Array2<f64> = block_sum(a.view(), 4).unwrap();
        assert_eq!(out, array![[0.75, 3.0]]);

        let a = array![[[200u8, 50], [1, 2]]];
        assert_eq!(block_sum(a.view(), 1).unwrap(), array![[250u8, 3]]);
    }

    #[test]
    fn test_zero_channels_gives_zeros() {
        let a = Array3::<i32>::zeros((2, 3, 0));
        let out = block_sum(a.view(), 2).unwrap();
        assert_eq!(out, Array2::<i32>::zeros((2, 3)));
    }

    #[test]
    fn test_empty_plane() {
        let a = Array3::<i64>::zeros((0, 4, 3));
        let out = block_sum(a.view(), 2).unwrap();
        assert_eq!(out.dim(), (0, 4));
        assert!(out.is_empty());
    }

    #[test]
    fn test_strided_input() {
        // (C, H, W) permuted to (H, W, C)
        let chw = Array::from_iter(0..12i32).into_shape_with_order((3, 2, 2)).unwrap();
        let hwc = chw.view().permuted_axes([1, 2, 0]);
        assert!(!hwc.is_standard_layout());
        let out = block_sum(hwc, 1).unwrap();
        assert_eq!(out, array![[12, 15], [18, 21]]);
    }

    #[test]
    fn test_dynamic_rank_input() {
        let a = ArrayD::from_shape_vec(IxDyn(&[1, 2, 3]), vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(block_sum(a.view(), 2).unwrap(), array![[6.0f32, 15.0]]);
    }

    #[test]
    fn test_invalid_shape() {
        let a = Array2::<i32>::zeros((4, 4));
        assert_eq!(
            block_sum(a.view(), 2).unwrap_err(),
            ChansumError::InvalidShape { expected_ndim: 3, got: vec![4, 4] }
        );

        // shape is checked before ksize
        assert!(matches!(block_sum(a.view(), 0), Err(ChansumError::InvalidShape { .. })));
    }

    #[test]
    fn test_invalid_block_size() {
        let a = Array3::<i32>::zeros((2, 2, 2));
        assert_eq!(block_sum(a.view(), 0).unwrap_err(), ChansumError::InvalidBlockSize(0));
    }
}
