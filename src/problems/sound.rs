// src/problems/sound.rs
//
// Acoustic pulse in a 1D box with reflective walls.
//
// Outputs (in <results_root>/sound/):
//   frames_density/density_NN.png, density.mp4, density.gif,
//   velocities_tNN.png (first and last timestep), pressure_tNN.png (last),
//   config.json, summary.md

use log::{debug, info};

use crate::config::{PipelineConfig, RunConfig, RunInfo};
use crate::derived::pressure;
use crate::error::Result;
use crate::loader::Dataset;
use crate::movie::{assemble, VideoEncoder};
use crate::output::recreate_dir;
use crate::problems::{render_frames, Analysis, FrameSpec, Outcome};
use crate::summary::format_g;
use crate::summary::narrative::write_sound_report;
use crate::visualisation::{AxisRange, LinePlot, PlotRenderer};

pub const DATASET: &str = "soundwave-data";
pub const GRID_FILE: &str = "x1.npy";

/// Velocity components overlaid in the velocity figures.
const VELOCITY_COMPONENTS: [&str; 3] = ["vx1", "vx2", "vx3"];

pub fn run(
    cfg: &PipelineConfig,
    renderer: &mut dyn PlotRenderer,
    encoder: &dyn VideoEncoder,
) -> Result<Outcome> {
    let data_dir = Analysis::Sound.data_dir(cfg);
    let ds = Dataset::open(&data_dir, GRID_FILE, "x")?;
    let times = ds.require_times(&["rho"])?;
    info!(
        "sound: {} density snapshots in {}",
        times.len(),
        data_dir.display()
    );

    let out = Analysis::Sound.results_dir(cfg);
    recreate_dir(&out)?;
    RunConfig {
        pipeline: cfg,
        run: RunInfo::new(Analysis::Sound.as_str(), &data_dir, &times),
    }
    .write_to_dir(&out)?;

    let mut outcome = Outcome {
        results_dir: out.clone(),
        timesteps: times.clone(),
        ..Outcome::default()
    };

    // One y range for every density frame so the frames are comparable.
    let densities = ds.series("rho", &times)?;
    let range = AxisRange::from_series(densities.iter().map(|f| &f.values), cfg.pad_frac, false)
        .unwrap_or(AxisRange::fixed(-1.0, 1.0));

    let spec = FrameSpec {
        variable: "density",
        quantity: "rho",
        y_label: "rho (code units)",
        prefix: "density_",
        y_range: range,
    };
    let frames_dir = out.join("frames_density");
    let stats = render_frames(&ds, &spec, &times, &frames_dir, renderer)?;
    outcome.frames.push(stats);

    let report = assemble(&frames_dir, &out.join("density"), "density_", cfg.fps, encoder);
    outcome.sequences.push(("density".to_string(), report));

    // Velocity components at the first and last timestep.
    let (first, last) = (times[0], times[times.len() - 1]);
    let mut snapshots = vec![first];
    if last != first {
        snapshots.push(last);
    }
    for t in snapshots {
        let mut plot = LinePlot::new(
            format!("Velocity components, t = {t}"),
            "x (code units)",
            "v (code units)",
        );
        for comp in VELOCITY_COMPONENTS {
            match ds.field(comp, t)? {
                Some(v) => plot = plot.curve(Some(comp), v.points(&ds.grid)),
                None => debug!("sound: {comp} missing at t = {t}"),
            }
        }
        if plot.curves.is_empty() {
            debug!("sound: no velocity component at t = {t}, figure skipped");
            continue;
        }
        let path = out.join(format!("velocities_t{t:02}.png"));
        renderer.render(&path, &plot)?;
        outcome.figures.push(path);
    }

    // Pressure from the equation of state at the last timestep.
    if let Some(rho) = ds.field("rho", last)? {
        let p = pressure(&rho.values, cfg.sound_speed);
        let points = ds
            .grid
            .coords
            .iter()
            .zip(p.iter())
            .map(|(&x, &y)| (x, y))
            .collect();
        let plot = LinePlot::new(
            format!(
                "Pressure P(x) = cs^2 rho(x), t = {last} (cs = {})",
                format_g(cfg.sound_speed, 6)
            ),
            "x (code units)",
            "P (code units)",
        )
        .curve(None, points);
        let path = out.join(format!("pressure_t{last:02}.png"));
        renderer.render(&path, &plot)?;
        outcome.figures.push(path);
    }

    write_sound_report(&out, cfg.sound_speed)?;
    info!("sound: results in {}", out.display());
    Ok(outcome)
}
