// src/field.rs

use ndarray::Array1;

use crate::grid::Grid1D;

/// One named quantity (`rho`, `vx1`, `bx3`, ...) sampled on the grid at a
/// single timestep.
#[derive(Debug, Clone)]
pub struct ScalarField {
    pub quantity: String,
    pub t: u32,
    pub values: Array1<f64>,
}

impl ScalarField {
    pub fn new(quantity: impl Into<String>, t: u32, values: Array1<f64>) -> Self {
        Self {
            quantity: quantity.into(),
            t,
            values,
        }
    }

    /// Smallest and largest finite sample, `None` if there are none.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        min_max(&self.values)
    }

    /// Pair each sample with its grid coordinate, ready for a line plot.
    pub fn points(&self, grid: &Grid1D) -> Vec<(f64, f64)> {
        grid.coords
            .iter()
            .zip(self.values.iter())
            .map(|(&x, &y)| (x, y))
            .collect()
    }
}

/// Finite min/max over an array; NaN and inf samples are ignored.
pub fn min_max(values: &Array1<f64>) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in values.iter() {
        if v.is_finite() {
            if v < lo {
                lo = v;
            }
            if v > hi {
                hi = v;
            }
        }
    }
    if lo.is_finite() && hi.is_finite() {
        Some((lo, hi))
    } else {
        None
    }
}
