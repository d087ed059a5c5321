// src/output.rs

use std::fs::{create_dir_all, remove_dir_all};
use std::io;
use std::path::Path;

use log::info;

/// Delete `dir` (if present) and create it again empty, so nothing from a
/// previous run can leak into this one.
pub fn recreate_dir(dir: &Path) -> io::Result<()> {
    if dir.exists() {
        info!("removing previous results in {}", dir.display());
        remove_dir_all(dir)?;
    }
    create_dir_all(dir)
}

/// Create `dir` and its parents if missing.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    create_dir_all(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn recreate_wipes_previous_contents() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("results/sound");
        fs::create_dir_all(dir.join("frames_density")).unwrap();
        fs::write(dir.join("frames_density/density_00.png"), b"old").unwrap();

        recreate_dir(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }
}
