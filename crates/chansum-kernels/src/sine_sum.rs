//! Sum of sines: `Σ sin(a)` over a real array of any shape.

use ndarray::{ArrayView, Axis, RemoveAxis};
use tracing::debug;

/// Elementwise sine, summed along axis 0, then collapsed to a scalar.
///
/// Every element is widened to `f64` before the sine, so `f32` input is
/// accumulated in double precision. The collapse sums whatever axes remain
/// after the axis-0 reduction, so the result is the sum of `sin` over every
/// element. A 0-d input yields `sin(x)`; an input with a zero-length axis
/// yields `0.0`.
pub fn sine_sum<A, D>(input: ArrayView<'_, A, D>) -> f64
where
    A: Copy + Into<f64>,
    D: RemoveAxis,
{
    debug!(shape = ?input.shape(), "sine_sum");
    let sines = input.mapv(|v| v.into().sin());
    if sines.ndim() == 0 {
        return sines.sum();
    }
    sines.sum_axis(Axis(0)).sum()
}
