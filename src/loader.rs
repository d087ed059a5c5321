// src/loader.rs
//
// Snapshot files follow the PLUTO-to-numpy export layout:
//
//   <dataset>/x1.npy           grid coordinates (mandatory)
//   <dataset>/rho_00.npy       density at output 0
//   <dataset>/vx1_07.npy       velocity component 1 at output 7
//   ...
//
// Indices are zero-padded to at least two digits.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;
use ndarray::Array1;
use ndarray_npy::{read_npy, ReadNpyError};

use crate::error::{Error, Result};
use crate::field::ScalarField;
use crate::grid::Grid1D;

/// File name of one snapshot: `<quantity>_<t:02>.npy`.
pub fn snapshot_file_name(quantity: &str, t: u32) -> String {
    format!("{quantity}_{t:02}.npy")
}

/// Parse the timestep out of `<quantity>_<digits>.npy`.
///
/// Only the canonical spelling produced by [`snapshot_file_name`] is
/// accepted, so every discovered index can be loaded back (`rho_7.npy` and
/// `rho_007.npy` are ignored).
fn parse_index(file_name: &str, quantity: &str) -> Option<u32> {
    let rest = file_name.strip_prefix(quantity)?.strip_prefix('_')?;
    let digits = rest.strip_suffix(".npy")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let t: u32 = digits.parse().ok()?;
    (format!("{t:02}") == digits).then_some(t)
}

/// Sorted, de-duplicated timestep indices available for `quantity` in `dir`.
///
/// A missing directory simply has no timesteps.
pub fn discover_times(dir: &Path, quantity: &str) -> Result<Vec<u32>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut times = BTreeSet::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        match parse_index(name, quantity) {
            Some(t) => {
                times.insert(t);
            }
            None if name.starts_with(quantity) && name.ends_with(".npy") => {
                debug!("{}: {name} does not match {quantity}_NN.npy, ignored", dir.display());
            }
            None => {}
        }
    }
    Ok(times.into_iter().collect())
}

/// Union of the timesteps of several quantities.
pub fn discover_union(dir: &Path, quantities: &[&str]) -> Result<Vec<u32>> {
    let mut all = BTreeSet::new();
    for q in quantities {
        all.extend(discover_times(dir, q)?);
    }
    Ok(all.into_iter().collect())
}

/// Read a 1D `.npy` array, widening `f32` payloads to `f64`.
pub fn read_array(path: &Path) -> Result<Array1<f64>> {
    match read_npy::<_, Array1<f64>>(path) {
        Ok(a) => Ok(a),
        Err(ReadNpyError::WrongDescriptor(_)) => read_npy::<_, Array1<f32>>(path)
            .map(|a| a.mapv(f64::from))
            .map_err(|source| Error::ReadArray {
                path: path.to_path_buf(),
                source,
            }),
        Err(source) => Err(Error::ReadArray {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// One dataset directory together with its (already loaded) grid.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub dir: PathBuf,
    pub grid: Grid1D,
}

impl Dataset {
    /// Open `dir` and load the mandatory grid file `grid_file`.
    ///
    /// `axis` is the coordinate name used in plot labels.
    pub fn open(dir: impl Into<PathBuf>, grid_file: &str, axis: &str) -> Result<Self> {
        let dir = dir.into();
        let grid_path = dir.join(grid_file);
        if !grid_path.is_file() {
            return Err(Error::MissingGrid { path: grid_path });
        }
        let coords = read_array(&grid_path)?;
        debug!("grid {} loaded ({} points)", grid_path.display(), coords.len());
        Ok(Self {
            dir,
            grid: Grid1D::new(axis, coords),
        })
    }

    pub fn path_of(&self, quantity: &str, t: u32) -> PathBuf {
        self.dir.join(snapshot_file_name(quantity, t))
    }

    pub fn has(&self, quantity: &str, t: u32) -> bool {
        self.path_of(quantity, t).is_file()
    }

    /// Timesteps available for `quantity`.
    pub fn times(&self, quantity: &str) -> Result<Vec<u32>> {
        discover_times(&self.dir, quantity)
    }

    /// Union of timesteps over `quantities`; an empty union is fatal.
    pub fn require_times(&self, quantities: &[&str]) -> Result<Vec<u32>> {
        let times = discover_union(&self.dir, quantities)?;
        if times.is_empty() {
            return Err(Error::NoTimesteps {
                dir: self.dir.clone(),
                quantities: quantities.join("|"),
            });
        }
        Ok(times)
    }

    /// Load `quantity` at timestep `t`; `Ok(None)` when the file is absent.
    pub fn field(&self, quantity: &str, t: u32) -> Result<Option<ScalarField>> {
        let path = self.path_of(quantity, t);
        if !path.is_file() {
            debug!("{} not present, skipping", path.display());
            return Ok(None);
        }
        let values = read_array(&path)?;
        if values.len() != self.grid.len() {
            return Err(Error::ShapeMismatch {
                path,
                got: values.len(),
                expected: self.grid.len(),
            });
        }
        Ok(Some(ScalarField::new(quantity, t, values)))
    }

    /// Every available snapshot of `quantity` at the given timesteps, in
    /// order, silently skipping the missing ones.
    pub fn series(&self, quantity: &str, times: &[u32]) -> Result<Vec<ScalarField>> {
        let mut out = Vec::with_capacity(times.len());
        for &t in times {
            if let Some(f) = self.field(quantity, t)? {
                out.push(f);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray_npy::write_npy;

    #[test]
    fn parse_index_requires_exact_prefix_and_digits() {
        assert_eq!(parse_index("rho_07.npy", "rho"), Some(7));
        assert_eq!(parse_index("rho_120.npy", "rho"), Some(120));
        assert_eq!(parse_index("rho_7a.npy", "rho"), None);
        assert_eq!(parse_index("rho_.npy", "rho"), None);
        assert_eq!(parse_index("rho_07.png", "rho"), None);
        assert_eq!(parse_index("vx1_07.npy", "rho"), None);
        // `vx` must not pick up `vx1_*`
        assert_eq!(parse_index("vx1_07.npy", "vx"), None);
        // only the spelling `snapshot_file_name` would load
        assert_eq!(parse_index("rho_7.npy", "rho"), None);
        assert_eq!(parse_index("rho_007.npy", "rho"), None);
        assert_eq!(parse_index("rho_00.npy", "rho"), Some(0));
        for t in [0, 5, 42, 120] {
            assert_eq!(parse_index(&snapshot_file_name("rho", t), "rho"), Some(t));
        }
    }

    #[test]
    fn file_names_are_zero_padded_to_two_digits() {
        assert_eq!(snapshot_file_name("bx3", 0), "bx3_00.npy");
        assert_eq!(snapshot_file_name("bx3", 9), "bx3_09.npy");
        assert_eq!(snapshot_file_name("bx3", 123), "bx3_123.npy");
    }

    #[test]
    fn missing_directory_has_no_times() {
        let times = discover_times(Path::new("/definitely/not/here"), "rho").unwrap();
        assert!(times.is_empty());
    }

    fn dataset_with_grid(n: usize) -> (tempfile::TempDir, Dataset) {
        let tmp = tempfile::tempdir().unwrap();
        write_npy(tmp.path().join("x3.npy"), &Array1::linspace(0.0, 1.0, n)).unwrap();
        let ds = Dataset::open(tmp.path(), "x3.npy", "z").unwrap();
        (tmp, ds)
    }

    #[test]
    fn union_is_sorted_and_deduplicated() {
        let (tmp, ds) = dataset_with_grid(4);
        for name in ["vx1_00.npy", "vx1_10.npy", "bx1_02.npy", "bx1_10.npy", "bx3_01.npy"] {
            write_npy(tmp.path().join(name), &Array1::<f64>::zeros(4)).unwrap();
        }
        std::fs::write(tmp.path().join("bx3_notes.txt"), b"").unwrap();

        assert_eq!(ds.require_times(&["vx1", "bx1", "bx3"]).unwrap(), vec![0, 1, 2, 10]);
        assert!(matches!(
            ds.require_times(&["rho"]),
            Err(Error::NoTimesteps { .. })
        ));
    }

    #[test]
    fn every_discovered_timestep_can_be_loaded() {
        let (tmp, ds) = dataset_with_grid(4);
        for name in ["rho_1.npy", "rho_007.npy", "rho_03.npy"] {
            write_npy(tmp.path().join(name), &Array1::<f64>::zeros(4)).unwrap();
        }

        let times = ds.require_times(&["rho"]).unwrap();
        assert_eq!(times, vec![3]);
        for t in times {
            assert!(ds.field("rho", t).unwrap().is_some());
        }
    }

    #[test]
    fn single_precision_snapshots_are_widened() {
        let (tmp, ds) = dataset_with_grid(3);
        let values = Array1::from(vec![0.5f32, -1.25, 2.0]);
        write_npy(tmp.path().join("rho_00.npy"), &values).unwrap();

        let field = ds.field("rho", 0).unwrap().unwrap();
        assert_eq!(field.values, Array1::from(vec![0.5, -1.25, 2.0]));
        assert_eq!(field.t, 0);
    }

    #[test]
    fn absent_snapshot_is_none_and_wrong_length_is_an_error() {
        let (tmp, ds) = dataset_with_grid(5);
        assert!(ds.field("rho", 3).unwrap().is_none());

        write_npy(tmp.path().join("rho_03.npy"), &Array1::<f64>::zeros(4)).unwrap();
        assert!(matches!(
            ds.field("rho", 3),
            Err(Error::ShapeMismatch { got: 4, expected: 5, .. })
        ));
    }

    #[test]
    fn open_requires_the_grid_file() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            Dataset::open(tmp.path(), "x1.npy", "x"),
            Err(Error::MissingGrid { .. })
        ));
    }
}
