// src/derived.rs
//
// Closed-form quantities derived from the loaded snapshots. Units are the
// code units of the simulation (the 1/sqrt(4 pi) of the Alfven speed is
// absorbed into B).

use std::fmt;

use ndarray::Array1;

use crate::field::{min_max, ScalarField};

/// Mach number at which the perturbation regime flips.
pub const REGIME_THRESHOLD: f64 = 1.0;

/// Isothermal equation of state: P = cs^2 * rho, elementwise.
pub fn pressure(density: &Array1<f64>, sound_speed: f64) -> Array1<f64> {
    let cs2 = sound_speed * sound_speed;
    density.mapv(|rho| cs2 * rho)
}

/// Arithmetic mean over the grid, `None` for an empty array.
pub fn mean(values: &Array1<f64>) -> Option<f64> {
    values.mean()
}

/// v_A = B0 / sqrt(rho0).
///
/// Undefined when either mean is unavailable or the density is not positive.
pub fn alfven_speed(b0: Option<f64>, rho0: Option<f64>) -> Option<f64> {
    let (b0, rho0) = (b0?, rho0?);
    if rho0 <= 0.0 || !rho0.is_finite() || !b0.is_finite() {
        return None;
    }
    Some(b0 / rho0.sqrt())
}

/// Half the peak-to-peak range: (max - min) / 2.
pub fn half_peak_to_peak(values: &Array1<f64>) -> f64 {
    match min_max(values) {
        Some((lo, hi)) => 0.5 * (hi - lo),
        None => 0.0,
    }
}

/// Largest absolute sample value.
pub fn max_abs(values: &Array1<f64>) -> f64 {
    values
        .iter()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()))
}

/// Amplitude measures of one snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmplitudeSample {
    pub t: u32,
    pub half_range: f64,
    pub max_abs: f64,
}

impl AmplitudeSample {
    pub fn of(field: &ScalarField) -> Self {
        Self {
            t: field.t,
            half_range: half_peak_to_peak(&field.values),
            max_abs: max_abs(&field.values),
        }
    }
}

/// Amplitude of every snapshot in `series`, in the given order.
pub fn amplitude_history(series: &[ScalarField]) -> Vec<AmplitudeSample> {
    series.iter().map(AmplitudeSample::of).collect()
}

/// Largest |value| seen over the whole history, `None` for an empty one.
pub fn peak_amplitude(history: &[AmplitudeSample]) -> Option<f64> {
    history
        .iter()
        .map(|s| s.max_abs)
        .fold(None, |acc: Option<f64>, a| Some(acc.map_or(a, |m| m.max(a))))
}

/// Perturbation amplitude relative to the Alfven speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    SubAlfvenic,
    SuperAlfvenic,
}

impl Regime {
    /// Classify by the Mach number M = amplitude / speed against
    /// [`REGIME_THRESHOLD`]. Returns the Mach number alongside.
    pub fn classify(amplitude: f64, speed: f64) -> (f64, Regime) {
        let mach = amplitude / speed;
        let regime = if mach < REGIME_THRESHOLD {
            Regime::SubAlfvenic
        } else {
            Regime::SuperAlfvenic
        };
        (mach, regime)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::SubAlfvenic => "sub-Alfvenic (M_A < 1)",
            Regime::SuperAlfvenic => "super-Alfvenic (M_A >= 1)",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn pressure_is_exact_cs_squared_times_density() {
        let rho = array![1.0, 1.25, 0.75, 3.0];
        let p = pressure(&rho, 2.0);
        for (pi, ri) in p.iter().zip(rho.iter()) {
            assert_eq!(*pi, 4.0 * ri);
        }
        // cs = 1 leaves the array untouched
        assert_eq!(pressure(&rho, 1.0), rho);
    }

    #[test]
    fn alfven_speed_is_b_over_sqrt_rho() {
        assert_relative_eq!(alfven_speed(Some(2.0), Some(4.0)).unwrap(), 1.0);
        assert_relative_eq!(
            alfven_speed(Some(1.0), Some(0.5)).unwrap(),
            1.0 / 0.5_f64.sqrt()
        );
        assert_eq!(alfven_speed(None, Some(1.0)), None);
        assert_eq!(alfven_speed(Some(1.0), None), None);
        assert_eq!(alfven_speed(Some(1.0), Some(0.0)), None);
    }

    #[test]
    fn amplitude_measures() {
        let v = array![-0.1, 0.05, 0.3, -0.2];
        assert_relative_eq!(half_peak_to_peak(&v), 0.25);
        assert_relative_eq!(max_abs(&v), 0.3);

        let series = vec![
            ScalarField::new("vx1", 0, array![0.0, 0.1, -0.1]),
            ScalarField::new("vx1", 5, array![0.0, 0.4, -0.2]),
        ];
        let hist = amplitude_history(&series);
        assert_eq!(hist.len(), 2);
        assert_eq!(hist[1].t, 5);
        assert_relative_eq!(hist[1].half_range, 0.3);
        assert_relative_eq!(peak_amplitude(&hist).unwrap(), 0.4);
        assert_eq!(peak_amplitude(&[]), None);
    }

    #[test]
    fn regime_threshold_is_one() {
        let (m, r) = Regime::classify(0.1, 1.0);
        assert_relative_eq!(m, 0.1);
        assert_eq!(r, Regime::SubAlfvenic);

        assert_eq!(Regime::classify(1.0, 1.0).1, Regime::SuperAlfvenic);
        assert_eq!(Regime::classify(3.0, 2.0).1, Regime::SuperAlfvenic);
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&Array1::<f64>::zeros(0)), None);
        assert_relative_eq!(mean(&array![1.0, 2.0, 3.0]).unwrap(), 2.0);
    }
}
