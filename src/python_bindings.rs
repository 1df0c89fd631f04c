//! Python bindings for probing and loading.

use crate::config::{IOConfig, LoadConfig, LoaderConfig};
use crate::host::MemoryImage;
use pyo3::prelude::*;

/// Probe a buffer. Returns `(matched, label, score)`.
#[pyfunction]
#[pyo3(name = "probe_bytes")]
fn probe_bytes_py(data: &[u8]) -> PyResult<(bool, Option<String>, i32)> {
    let verdict = crate::probe::probe_bytes(data);
    Ok((
        verdict.matched,
        verdict.format_label().map(str::to_string),
        verdict.score_value(),
    ))
}

/// Probe a file on disk. Returns `(matched, label, score)`.
#[pyfunction]
#[pyo3(name = "probe_path", signature = (path, config=None))]
fn probe_path_py(path: &str, config: Option<IOConfig>) -> PyResult<(bool, Option<String>, i32)> {
    let config = config.unwrap_or_default();
    let verdict = crate::probe::probe_path(path, &config);
    Ok((
        verdict.matched,
        verdict.format_label().map(str::to_string),
        verdict.score_value(),
    ))
}

/// Load a buffer into an in-memory image and return the result as JSON.
#[pyfunction]
#[pyo3(name = "load_bytes", signature = (data, config=None))]
fn load_bytes_py(data: &[u8], config: Option<LoadConfig>) -> PyResult<String> {
    let config = config.unwrap_or_default();
    let mut image = MemoryImage::new();
    let result = crate::load::load_bytes(data, &mut image, &config)?;
    Ok(result.to_json()?)
}

/// Python module entry point.
#[pymodule]
fn gba_loader(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<LoaderConfig>()?;
    m.add_class::<IOConfig>()?;
    m.add_class::<LoadConfig>()?;
    m.add("FORMAT_LABEL", crate::probe::FORMAT_LABEL)?;
    m.add_function(wrap_pyfunction!(probe_bytes_py, m)?)?;
    m.add_function(wrap_pyfunction!(probe_path_py, m)?)?;
    m.add_function(wrap_pyfunction!(load_bytes_py, m)?)?;
    m.add_function(wrap_pyfunction!(crate::logging::init_logging, m)?)?;
    Ok(())
}
