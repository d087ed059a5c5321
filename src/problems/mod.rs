// src/problems/mod.rs
//
// The two analyses. Each one:
//   1. opens its dataset (grid + timestep discovery; both fatal if absent),
//   2. recreates its results directory,
//   3. renders frames and static figures,
//   4. assembles videos/GIFs,
//   5. writes the numeric summary and the narrative.

pub mod alfven;
pub mod sound;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, info};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::loader::Dataset;
use crate::movie::{SequenceReport, VideoEncoder};
use crate::summary::SummaryRecord;
use crate::visualisation::{AxisRange, LinePlot, PlotRenderer};

/// Which dataset to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analysis {
    Sound,
    Alfven,
}

impl Analysis {
    pub const ALL: [Analysis; 2] = [Analysis::Sound, Analysis::Alfven];

    pub fn as_str(&self) -> &'static str {
        match self {
            Analysis::Sound => "sound",
            Analysis::Alfven => "alfven",
        }
    }

    /// Results directory of this analysis under `cfg.results_root`.
    pub fn results_dir(&self, cfg: &PipelineConfig) -> PathBuf {
        cfg.results_root.join(self.as_str())
    }

    /// Dataset directory of this analysis under `cfg.data_root`.
    pub fn data_dir(&self, cfg: &PipelineConfig) -> PathBuf {
        match self {
            Analysis::Sound => cfg.data_root.join(sound::DATASET),
            Analysis::Alfven => cfg.data_root.join(alfven::DATASET),
        }
    }

    /// Run the full analysis.
    pub fn run(
        &self,
        cfg: &PipelineConfig,
        renderer: &mut dyn PlotRenderer,
        encoder: &dyn VideoEncoder,
    ) -> Result<Outcome> {
        match self {
            Analysis::Sound => sound::run(cfg, renderer, encoder),
            Analysis::Alfven => alfven::run(cfg, renderer, encoder),
        }
    }

    /// Regenerate only the narrative from an existing results directory.
    pub fn report(&self, cfg: &PipelineConfig) -> Result<PathBuf> {
        let dir = self.results_dir(cfg);
        match self {
            Analysis::Sound => crate::summary::narrative::write_sound_report(&dir, cfg.sound_speed),
            Analysis::Alfven => crate::summary::narrative::write_alfven_report(&dir),
        }
    }
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Analysis {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "sound" | "soundwave" => Ok(Analysis::Sound),
            "alfven" | "alfvenwave" => Ok(Analysis::Alfven),
            other => Err(format!("unknown analysis '{other}' (expected sound|alfven)")),
        }
    }
}

/// What one analysis produced.
#[derive(Debug, Default)]
pub struct Outcome {
    pub results_dir: PathBuf,
    pub timesteps: Vec<u32>,
    /// Per-variable frame statistics, in rendering order.
    pub frames: Vec<FrameStats>,
    /// Video/GIF results, keyed by output base name.
    pub sequences: Vec<(String, SequenceReport)>,
    /// Static analysis figures written.
    pub figures: Vec<PathBuf>,
    pub summary: SummaryRecord,
}

/// Frames rendered for one variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameStats {
    pub variable: String,
    pub dir: PathBuf,
    pub written: Vec<u32>,
    /// Timesteps without a snapshot of this quantity.
    pub skipped: Vec<u32>,
}

/// How one variable's frames are drawn.
pub(crate) struct FrameSpec<'a> {
    /// Name used in titles, labels and output names ("Bx", "density").
    pub variable: &'a str,
    /// Snapshot quantity on disk ("bx1", "rho").
    pub quantity: &'a str,
    /// Axis label of the plotted value.
    pub y_label: &'a str,
    /// Frame file prefix inside the frames directory.
    pub prefix: &'a str,
    pub y_range: AxisRange,
}

/// Render one frame per timestep into `frames_dir`; timesteps without a
/// snapshot are skipped.
pub(crate) fn render_frames(
    ds: &Dataset,
    spec: &FrameSpec<'_>,
    times: &[u32],
    frames_dir: &Path,
    renderer: &mut dyn PlotRenderer,
) -> Result<FrameStats> {
    crate::output::ensure_dir(frames_dir)?;
    info!("rendering {} frames for {}", times.len(), spec.variable);

    let axis = ds.grid.axis.as_str();
    let mut stats = FrameStats {
        variable: spec.variable.to_string(),
        dir: frames_dir.to_path_buf(),
        written: Vec::new(),
        skipped: Vec::new(),
    };

    for &t in times {
        let Some(field) = ds.field(spec.quantity, t)? else {
            stats.skipped.push(t);
            continue;
        };
        let plot = LinePlot::new(
            format!("{}({axis}), t = {t}", spec.variable),
            format!("{axis} (code units)"),
            spec.y_label,
        )
        .curve(None, field.points(&ds.grid))
        .y_range(spec.y_range);

        let path = frames_dir.join(format!("{}{t:02}.png", spec.prefix));
        renderer.render(&path, &plot)?;
        stats.written.push(t);
    }

    if !stats.skipped.is_empty() {
        debug!(
            "{}: no {} snapshot at t = {:?}",
            spec.variable, spec.quantity, stats.skipped
        );
    }
    Ok(stats)
}
