#![cfg(feature = "python")]

#[cfg(feature = "numpy-support")]
use numpy::PyReadonlyArray1;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::marker::PhantomData;

use crate::{roc_points, trapezoid_auc, weighted_auc};

enum DataView<'a> {
    Owned(Vec<f64>, PhantomData<&'a ()>),
    #[cfg(feature = "numpy-support")]
    Numpy(PyReadonlyArray1<'a, f64>),
}

impl<'a> DataView<'a> {
    fn as_slice(&self) -> &[f64] {
        match self {
            DataView::Owned(v, _) => v.as_slice(),
            #[cfg(feature = "numpy-support")]
            DataView::Numpy(array) => array.as_slice().expect("numpy array should be contiguous"),
        }
    }
}

fn extract_view<'py>(obj: &Bound<'py, PyAny>) -> PyResult<DataView<'py>> {
    #[cfg(feature = "numpy-support")]
    {
        if let Ok(array) = obj.extract::<PyReadonlyArray1<'py, f64>>() {
            if array.as_slice().is_ok() {
                return Ok(DataView::Numpy(array));
            }
        }
    }

    let owned = obj.extract::<Vec<f64>>()?;
    Ok(DataView::Owned(owned, PhantomData))
}

fn extract_optional_view<'py>(obj: Option<&Bound<'py, PyAny>>) -> PyResult<Option<DataView<'py>>> {
    match obj {
        Some(obj) if !obj.is_none() => Ok(Some(extract_view(obj)?)),
        _ => Ok(None),
    }
}

/// Python API wrapper for weighted_auc
#[pyfunction]
#[pyo3(name = "weighted_auc")]
fn weighted_auc_py(
    classes: &Bound<'_, PyAny>,
    predictions: &Bound<'_, PyAny>,
    weights: Option<&Bound<'_, PyAny>>,
) -> PyResult<f64> {
    let classes_view = extract_view(classes)?;
    let predictions_view = extract_view(predictions)?;
    let weights_view = extract_optional_view(weights)?;
    weighted_auc(
        classes_view.as_slice(),
        predictions_view.as_slice(),
        weights_view.as_ref().map(|view| view.as_slice()),
    )
    .map_err(|err| PyValueError::new_err(err.to_string()))
}

/// Python API wrapper for roc_points; returns (threshold, fpr, tpr) tuples.
#[pyfunction]
#[pyo3(name = "roc_points")]
fn roc_points_py(
    classes: &Bound<'_, PyAny>,
    predictions: &Bound<'_, PyAny>,
    weights: Option<&Bound<'_, PyAny>>,
) -> PyResult<Vec<(f64, f64, f64)>> {
    let classes_view = extract_view(classes)?;
    let predictions_view = extract_view(predictions)?;
    let weights_view = extract_optional_view(weights)?;
    let points = roc_points(
        classes_view.as_slice(),
        predictions_view.as_slice(),
        weights_view.as_ref().map(|view| view.as_slice()),
    )
    .map_err(|err| PyValueError::new_err(err.to_string()))?;
    Ok(points
        .into_iter()
        .map(|point| {
            (
                point.threshold,
                point.false_positive_rate,
                point.true_positive_rate,
            )
        })
        .collect())
}

/// Python API wrapper for trapezoid_auc over (threshold, fpr, tpr) tuples.
#[pyfunction]
#[pyo3(name = "trapezoid_auc")]
fn trapezoid_auc_py(points: Vec<(f64, f64, f64)>) -> f64 {
    let points: Vec<crate::RocPoint> = points
        .into_iter()
        .map(|(threshold, false_positive_rate, true_positive_rate)| crate::RocPoint {
            threshold,
            false_positive_rate,
            true_positive_rate,
        })
        .collect();
    trapezoid_auc(&points)
}

#[pymodule]
fn sepeval_core(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(weighted_auc_py, m)?)?;
    m.add_function(wrap_pyfunction!(roc_points_py, m)?)?;
    m.add_function(wrap_pyfunction!(trapezoid_auc_py, m)?)?;
    Ok(())
}
