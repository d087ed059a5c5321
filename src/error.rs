// src/error.rs

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort an analysis.
///
/// Everything that is merely *unavailable* (a quantity missing at one
/// timestep, no encoder on PATH) is handled in place and never reaches this
/// type.
#[derive(Debug, Error)]
pub enum Error {
    /// The grid-coordinate file every plot is drawn against is absent.
    #[error("grid file not found: {path} (is the dataset directory in place?)")]
    MissingGrid { path: PathBuf },

    /// No `<quantity>_NN.npy` file matched in the dataset directory.
    #[error("no {quantities}_NN.npy files found in {dir}")]
    NoTimesteps { dir: PathBuf, quantities: String },

    /// A present array file could not be decoded.
    #[error("failed to read array {path}: {source}")]
    ReadArray {
        path: PathBuf,
        #[source]
        source: ndarray_npy::ReadNpyError,
    },

    /// The array was read but is not one-dimensional data on the grid.
    #[error("array {path} has {got} samples, grid has {expected}")]
    ShapeMismatch {
        path: PathBuf,
        got: usize,
        expected: usize,
    },

    /// Plotting backend failure while writing an image.
    #[error("failed to render {path}: {message}")]
    Render { path: PathBuf, message: String },

    /// A results directory that a report depends on does not exist.
    #[error("no results in {path}; run the analysis first")]
    MissingResults { path: PathBuf },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
