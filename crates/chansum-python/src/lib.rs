//! # chansum-python
//!
//! PyO3 bindings for chansum → `import chansum` in Python.
//!
//! Provides:
//! - `chansum.sum_of_sines(a)` — sum of `sin` over a real array
//! - `chansum.sum(a, ksize)` — channel sum of an `(H, W, C)` array, block by block
//! - `chansum.par_sum(a, ksize, num_threads=None)` — same, rayon-parallel
//!
//! int32, int64, float32 and float64 arrays are read in place and keep their
//! dtype. Other real dtypes are cast by NumPy first: bool and integer arrays
//! to int64, remaining floats to float64.

use chansum_kernels::{ChansumError, KernelConfig};
use numpy::ndarray::LinalgScalar;
use numpy::{
    AllowTypeChange, PyArray2, PyArrayDescrMethods, PyArrayLikeDyn, PyReadonlyArrayDyn,
    PyUntypedArray, PyUntypedArrayMethods,
};
use pyo3::exceptions::{PyTypeError, PyValueError};
use pyo3::prelude::*;

// ============================================================================
// Conversion helpers
// ============================================================================

fn to_py_err(e: ChansumError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Run the sequential (`config == None`) or parallel block sum on a borrowed
/// NumPy array, with the GIL released, and hand the result back to NumPy.
fn block_sum_into_py<T>(
    py: Python<'_>,
    a: &PyReadonlyArrayDyn<'_, T>,
    ksize: usize,
    config: Option<&KernelConfig>,
) -> PyResult<PyObject>
where
    T: numpy::Element + LinalgScalar + Send + Sync,
{
    let view = a.as_array();
    let out = py
        .allow_threads(move || match config {
            None => chansum_kernels::block_sum(view, ksize),
            Some(config) => chansum_kernels::par_block_sum_with(view, ksize, config),
        })
        .map_err(to_py_err)?;
    Ok(PyArray2::from_owned_array_bound(py, out).into_any().unbind())
}

fn dispatch_block_sum(
    py: Python<'_>,
    a: &Bound<'_, PyAny>,
    ksize: usize,
    config: Option<&KernelConfig>,
) -> PyResult<PyObject> {
    if let Ok(a) = a.extract::<PyReadonlyArrayDyn<'_, i32>>() {
        return block_sum_into_py(py, &a, ksize, config);
    }
    if let Ok(a) = a.extract::<PyReadonlyArrayDyn<'_, i64>>() {
        return block_sum_into_py(py, &a, ksize, config);
    }
    if let Ok(a) = a.extract::<PyReadonlyArrayDyn<'_, f32>>() {
        return block_sum_into_py(py, &a, ksize, config);
    }
    if let Ok(a) = a.extract::<PyReadonlyArrayDyn<'_, f64>>() {
        return block_sum_into_py(py, &a, ksize, config);
    }

    let kind = a.downcast::<PyUntypedArray>()?.dtype().kind();
    match kind {
        b'b' | b'i' | b'u' => {
            let cast = a.extract::<PyArrayLikeDyn<'_, i64, AllowTypeChange>>()?;
            block_sum_into_py::<i64>(py, &cast, ksize, config)
        }
        b'f' => {
            let cast = a.extract::<PyArrayLikeDyn<'_, f64, AllowTypeChange>>()?;
            block_sum_into_py::<f64>(py, &cast, ksize, config)
        }
        _ => Err(PyTypeError::new_err(format!(
            "expected an array of real numbers, got dtype kind '{}'",
            char::from(kind)
        ))),
    }
}

// ============================================================================
// Exported functions
// ============================================================================

/// Sum the sines of the input values.
#[pyfunction]
fn sum_of_sines<'py>(py: Python<'py>, a: PyArrayLikeDyn<'py, f64, AllowTypeChange>) -> f64 {
    let view = a.as_array();
    py.allow_threads(move || chansum_kernels::sine_sum(view))
}

/// Sum over axis 2 of an (H, W, C) array, processed block by block.
#[pyfunction]
fn sum(py: Python<'_>, a: &Bound<'_, PyAny>, ksize: usize) -> PyResult<PyObject> {
    dispatch_block_sum(py, a, ksize, None)
}

/// Sum over axis 2 of an (H, W, C) array, processed with rayon.
#[pyfunction]
#[pyo3(signature = (a, ksize, num_threads=None))]
fn par_sum(
    py: Python<'_>,
    a: &Bound<'_, PyAny>,
    ksize: usize,
    num_threads: Option<usize>,
) -> PyResult<PyObject> {
    let config = KernelConfig {
        num_threads,
        ..KernelConfig::default()
    };
    dispatch_block_sum(py, a, ksize, Some(&config))
}

// ============================================================================
// Module entry point
// ============================================================================

#[pymodule]
fn chansum(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__doc__", "Block-wise channel sums and sine sums over NumPy arrays")?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_function(wrap_pyfunction!(sum_of_sines, m)?)?;
    m.add_function(wrap_pyfunction!(sum, m)?)?;
    m.add_function(wrap_pyfunction!(par_sum, m)?)?;
    Ok(())
}
