// src/config.rs

use serde::{Deserialize, Serialize};
use serde_json;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Settings shared by every analysis. Every field has a default, so a
/// config file only needs the keys it wants to change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding `soundwave-data/` and `alfvenwave-data/`.
    pub data_root: PathBuf,
    /// Directory under which `sound/` and `alfven/` are (re)created.
    pub results_root: PathBuf,
    /// Frame rate of the assembled videos and GIFs.
    pub fps: u32,
    /// Isothermal sound speed used for P = cs^2 rho.
    pub sound_speed: f64,
    /// Fractional margin for data-driven axis ranges.
    pub pad_frac: f64,
    /// Rendered image size in pixels (width, height).
    pub image_size: [u32; 2],
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("data"),
            results_root: PathBuf::from("results"),
            fps: 10,
            sound_speed: 1.0,
            pad_frac: 0.05,
            image_size: [1260, 720],
        }
    }
}

impl PipelineConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let cfg: Self = serde_json::from_reader(BufReader::new(file))?;
        Ok(cfg.sanitized())
    }

    /// Clamp values the encoders cannot take (`fps` is at least 1).
    pub fn sanitized(mut self) -> Self {
        self.fps = self.fps.max(1);
        self
    }

    pub fn image_size(&self) -> (u32, u32) {
        (self.image_size[0], self.image_size[1])
    }
}

/// Provenance written next to the outputs of one analysis.
#[derive(Serialize)]
pub struct RunConfig<'a> {
    pub pipeline: &'a PipelineConfig,
    pub run: RunInfo,
}

#[derive(Serialize)]
pub struct RunInfo {
    pub analysis: String,
    pub dataset: PathBuf,
    /// Timesteps discovered in the dataset.
    pub timesteps: Vec<u32>,
    pub crate_version: String,
}

impl RunInfo {
    pub fn new(analysis: &str, dataset: &Path, timesteps: &[u32]) -> Self {
        Self {
            analysis: analysis.to_string(),
            dataset: dataset.to_path_buf(),
            timesteps: timesteps.to_vec(),
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl RunConfig<'_> {
    pub fn write_to_dir(&self, out_dir: &Path) -> std::io::Result<()> {
        let path = out_dir.join("config.json");
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wavepost.json");
        std::fs::write(&path, r#"{ "fps": 24, "data_root": "/srv/pluto" }"#).unwrap();

        let cfg = PipelineConfig::load(&path).unwrap();
        assert_eq!(cfg.fps, 24);
        assert_eq!(cfg.data_root, PathBuf::from("/srv/pluto"));
        assert_eq!(cfg.sound_speed, 1.0);
        assert_eq!(cfg.image_size(), (1260, 720));
    }

    #[test]
    fn zero_fps_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wavepost.json");
        std::fs::write(&path, r#"{ "fps": 0 }"#).unwrap();
        assert_eq!(PipelineConfig::load(&path).unwrap().fps, 1);

        let cfg = PipelineConfig {
            fps: 0,
            ..PipelineConfig::default()
        };
        assert_eq!(cfg.sanitized().fps, 1);
        assert_eq!(PipelineConfig::default().sanitized(), PipelineConfig::default());
    }

    #[test]
    fn malformed_config_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ fps: }").unwrap();
        assert!(matches!(
            PipelineConfig::load(&path),
            Err(crate::error::Error::Config(_))
        ));
    }

    #[test]
    fn run_config_is_written_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = PipelineConfig::default();
        let run = RunConfig {
            pipeline: &cfg,
            run: RunInfo::new("sound", Path::new("data/soundwave-data"), &[0, 1, 2]),
        };
        run.write_to_dir(dir.path()).unwrap();

        let text = std::fs::read_to_string(dir.path().join("config.json")).unwrap();
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["run"]["analysis"], "sound");
        assert_eq!(v["run"]["timesteps"][2], 2);
        assert_eq!(v["pipeline"]["fps"], 10);
    }
}
