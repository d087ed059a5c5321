// src/grid.rs

use ndarray::Array1;

/// Fixed 1D spatial grid shared by every quantity of a dataset.
///
/// Coordinates are stored exactly as read from the grid file (`x1.npy`,
/// `x3.npy`); no uniform spacing is assumed.
#[derive(Debug, Clone)]
pub struct Grid1D {
    /// Axis name used in plot labels ("x", "z").
    pub axis: String,
    pub coords: Array1<f64>,
}

impl Grid1D {
    pub fn new(axis: impl Into<String>, coords: Array1<f64>) -> Self {
        Self {
            axis: axis.into(),
            coords,
        }
    }

    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Leftmost and rightmost coordinate, or `None` for an empty grid.
    pub fn extent(&self) -> Option<(f64, f64)> {
        let first = *self.coords.first()?;
        let last = *self.coords.last()?;
        Some((first.min(last), first.max(last)))
    }
}
