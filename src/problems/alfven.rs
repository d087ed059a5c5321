// src/problems/alfven.rs
//
// Transverse Alfven wave travelling along a uniform background field B0 z.
//
// Outputs (in <results_root>/alfven/):
//   frames_{Bx,Bz,vx}/NN.png, {Bx,Bz,vx}.mp4, {Bx,Bz,vx}.gif,
//   by_vy_tNN.png (middle timestep), rho_t00.png, bz_t00.png,
//   vx_amp_over_time.png, summary.txt, config.json, summary.md

use log::info;

use crate::config::{PipelineConfig, RunConfig, RunInfo};
use crate::derived::{alfven_speed, amplitude_history, mean, peak_amplitude, Regime};
use crate::error::Result;
use crate::loader::Dataset;
use crate::movie::{assemble, VideoEncoder};
use crate::output::recreate_dir;
use crate::problems::{render_frames, Analysis, FrameSpec, Outcome};
use crate::summary::narrative::{write_alfven_report, SUMMARY_FILE};
use crate::summary::{format_g, SummaryRecord};
use crate::visualisation::{AxisRange, LinePlot, PlotRenderer};

pub const DATASET: &str = "alfvenwave-data";
pub const GRID_FILE: &str = "x3.npy";

/// Quantities whose snapshots define the available timesteps.
pub const TIME_QUANTITIES: [&str; 3] = ["vx1", "bx1", "bx3"];

/// Fixed axis for the transverse field and velocity (|B1| = 0.1 << 1).
const TRANSVERSE_RANGE: AxisRange = AxisRange::fixed(-1.0, 1.0);

pub fn run(
    cfg: &PipelineConfig,
    renderer: &mut dyn PlotRenderer,
    encoder: &dyn VideoEncoder,
) -> Result<Outcome> {
    let data_dir = Analysis::Alfven.data_dir(cfg);
    let ds = Dataset::open(&data_dir, GRID_FILE, "z")?;
    let times = ds.require_times(&TIME_QUANTITIES)?;
    info!(
        "alfven: {} timesteps in {}",
        times.len(),
        data_dir.display()
    );

    let out = Analysis::Alfven.results_dir(cfg);
    recreate_dir(&out)?;
    RunConfig {
        pipeline: cfg,
        run: RunInfo::new(Analysis::Alfven.as_str(), &data_dir, &times),
    }
    .write_to_dir(&out)?;

    let mut outcome = Outcome {
        results_dir: out.clone(),
        timesteps: times.clone(),
        ..Outcome::default()
    };

    // Bz varies little around B0, so its range comes from the data.
    let bz_series = ds.series("bx3", &times)?;
    let bz_range = AxisRange::from_series(bz_series.iter().map(|f| &f.values), cfg.pad_frac, false)
        .unwrap_or(TRANSVERSE_RANGE);

    let specs = [
        FrameSpec {
            variable: "Bx",
            quantity: "bx1",
            y_label: "Bx (code units)",
            prefix: "",
            y_range: TRANSVERSE_RANGE,
        },
        FrameSpec {
            variable: "Bz",
            quantity: "bx3",
            y_label: "Bz (code units)",
            prefix: "",
            y_range: bz_range,
        },
        FrameSpec {
            variable: "vx",
            quantity: "vx1",
            y_label: "vx (code units)",
            prefix: "",
            y_range: TRANSVERSE_RANGE,
        },
    ];
    for spec in &specs {
        let frames_dir = out.join(format!("frames_{}", spec.variable));
        let stats = render_frames(&ds, spec, &times, &frames_dir, renderer)?;
        outcome.frames.push(stats);

        let report = assemble(&frames_dir, &out.join(spec.variable), spec.prefix, cfg.fps, encoder);
        outcome.sequences.push((spec.variable.to_string(), report));
    }

    // By and vy should stay at zero for a wave polarised in x.
    let t_mid = times[times.len() / 2];
    let mut plot = LinePlot::new(
        format!("By and vy, t = {t_mid} (expected ~ 0)"),
        "z (code units)",
        "value (code units)",
    );
    if let Some(by) = ds.field("bx2", t_mid)? {
        plot = plot.curve(Some("By"), by.points(&ds.grid));
    }
    if let Some(vy) = ds.field("vx2", t_mid)? {
        plot = plot.curve(Some("vy"), vy.points(&ds.grid));
    }
    if !plot.curves.is_empty() {
        let path = out.join(format!("by_vy_t{t_mid:02}.png"));
        renderer.render(&path, &plot)?;
        outcome.figures.push(path);
    }

    // Initial state: rho0, B0 and the Alfven speed.
    let mut summary = SummaryRecord::new();
    let mut rho0 = None;
    let mut b0 = None;

    if let Some(rho) = ds.field("rho", 0)? {
        let m = mean(&rho.values);
        rho0 = m;
        let plot = LinePlot::new("rho(z) at t = 0", "z (code units)", "rho (code units)")
            .curve(None, rho.points(&ds.grid));
        let path = out.join("rho_t00.png");
        renderer.render(&path, &plot)?;
        outcome.figures.push(path);
        if let Some(m) = m {
            summary.push_scalar("rho0 (mean at t=0)", m);
        }
    }

    if let Some(bz) = ds.field("bx3", 0)? {
        let m = mean(&bz.values);
        b0 = m;
        let mut plot = LinePlot::new(
            "Bz(z) at t = 0 (B0 ~ 1 expected)",
            "z (code units)",
            "Bz (code units)",
        )
        .curve(None, bz.points(&ds.grid));
        if let Some(m) = m {
            plot = plot.reference(m, format!("B0 ~ {} (mean)", format_g(m, 3)));
            summary.push_scalar("B0 (mean of Bz at t=0)", m);
        }
        let path = out.join("bz_t00.png");
        renderer.render(&path, &plot)?;
        outcome.figures.push(path);
    }

    let v_a = alfven_speed(b0, rho0);
    if let Some(v) = v_a {
        summary.push_scalar("v_A = B0 / sqrt(rho0)", v);
    }

    // Perturbation amplitude and regime.
    let vx_series = ds.series("vx1", &times)?;
    let history = amplitude_history(&vx_series);
    if !history.is_empty() {
        let points = history
            .iter()
            .map(|s| (f64::from(s.t), s.half_range))
            .collect();
        let plot = LinePlot::new(
            "Amplitude (max - min) / 2 of vx per timestep",
            "t (output index)",
            "vx amplitude (code units)",
        )
        .curve(None, points)
        .with_markers();
        let path = out.join("vx_amp_over_time.png");
        renderer.render(&path, &plot)?;
        outcome.figures.push(path);
    }

    if let Some(a_max) = peak_amplitude(&history) {
        summary.push_scalar("max |vx| observed", a_max);
        if let Some(v) = v_a {
            let (mach, regime) = Regime::classify(a_max, v);
            summary.push_scalar("M_A = |vx|max / v_A", mach);
            summary.push("regime", regime.as_str());
        }
    }

    if !summary.is_empty() {
        summary.write_text(&out.join(SUMMARY_FILE))?;
        for line in summary.lines() {
            info!("alfven:{line}");
        }
    }
    outcome.summary = summary;

    write_alfven_report(&out)?;
    info!("alfven: results in {}", out.display());
    Ok(outcome)
}
