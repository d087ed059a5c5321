// src/summary/narrative.rs
//
// Markdown write-ups of each analysis. Both are built from what is actually
// present in the results directory, so they can be regenerated at any time
// after a run (`wavepost report ...`).

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::derived::Regime;
use crate::error::{Error, Result};
use crate::summary::{format_g, read_text};

/// Name of the narrative document inside a results directory.
pub const NARRATIVE_FILE: &str = "summary.md";
/// Name of the numeric summary inside a results directory.
pub const SUMMARY_FILE: &str = "summary.txt";

/// File names in `dir` of the form `<prefix>*<suffix>`, sorted.
pub fn figures_matching(dir: &Path, prefix: &str, suffix: &str) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name();
        if let Some(name) = name.to_str() {
            if name.starts_with(prefix) && name.ends_with(suffix) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

fn require_results(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(Error::MissingResults {
            path: dir.to_path_buf(),
        })
    }
}

fn image_or_note(dir: &Path, file: &str, alt: &str) -> String {
    if dir.join(file).is_file() {
        format!("![{alt}]({file})")
    } else {
        format!("*{file} was not produced in this run.*")
    }
}

fn image_list(names: &[String], alt: &str, missing: &str) -> String {
    if names.is_empty() {
        return format!("*{missing}*");
    }
    names
        .iter()
        .map(|n| format!("![{alt}]({n})"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Write `summary.md` for a sound-wave results directory.
pub fn write_sound_report(dir: &Path, sound_speed: f64) -> Result<PathBuf> {
    require_results(dir)?;

    let velocities = figures_matching(dir, "velocities_t", ".png")?;
    let pressure = figures_matching(dir, "pressure_t", ".png")?;
    let cs = format_g(sound_speed, 6);

    let animation = image_or_note(dir, "density.gif", "Density evolution");
    let velocity_figs = image_list(&velocities, "Velocity components", "No velocity snapshots were available.");
    let pressure_figs = image_list(&pressure, "Pressure", "No pressure snapshot was available.");

    let body = format!(
        r#"# Sound wave in a 1D box with reflective walls

## Setup

- Hydrodynamics: d(rho)/dt + div(rho v) = 0, dv/dt + (v . grad) v = -grad(P) / rho
- Initial condition: a localized pulse at the centre of the box (a hand clap)
- Boundaries: reflective walls on both ends
- Equation of state: P = cs^2 rho with cs = {cs}

## What happens when the wave reaches the walls?

With reflective boundaries the normal velocity flips sign at the wall (no
mass leaves the box) and the reflected front interferes with the incoming
one. Depending on the travel time, quasi-standing patterns form inside the
domain.

{animation}

## What would you hear at the centre of the box?

The central pulse splits into two fronts that run to the walls and come
back. At the centre you hear the original clap followed by periodic echoes
separated by about 2L / cs (there and back), with amplitudes modulated by
the superposition of both fronts.

{velocity_figs}

## Which velocity component stays zero?

The problem is one-dimensional along x and has no transverse forcing, so
the transverse components vx2 and vx3 stay at zero when they start at zero.
Only vx1 evolves.

## Pressure

With P = cs^2 rho and cs = {cs} the pressure profile is the density profile
scaled by cs^2.

{pressure_figs}

## Generated files

- Animation: `density.mp4`, `density.gif`
- Frames: `frames_density/density_NN.png`
- Velocities: {velocity_list}
- Pressure: {pressure_list}
"#,
        velocity_list = code_list(&velocities),
        pressure_list = code_list(&pressure),
    );

    let path = dir.join(NARRATIVE_FILE);
    fs::write(&path, body)?;
    info!("narrative written: {}", path.display());
    Ok(path)
}

fn code_list(names: &[String]) -> String {
    if names.is_empty() {
        return "none".to_string();
    }
    names
        .iter()
        .map(|n| format!("`{n}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Regime sentence derived from the numeric summary lines.
fn regime_sentence(summary: &[String]) -> &'static str {
    let has = |r: Regime| summary.iter().any(|l| l.contains(r.as_str()));
    if has(Regime::SuperAlfvenic) {
        "The run is **super-Alfvenic** (M_A >= 1): the velocity perturbation \
         reaches or exceeds the Alfven speed and non-linear effects matter."
    } else if has(Regime::SubAlfvenic) {
        "The run is **sub-Alfvenic** (M_A < 1): the velocity perturbation stays \
         below the Alfven speed, so the wave behaves close to linearly."
    } else {
        "The regime could not be determined: the Alfven speed needs both \
         `rho_00.npy` and `bx3_00.npy`."
    }
}

/// Write `summary.md` for an Alfven-wave results directory, quoting the
/// numeric `summary.txt` when it exists.
pub fn write_alfven_report(dir: &Path) -> Result<PathBuf> {
    require_results(dir)?;

    let summary_path = dir.join(SUMMARY_FILE);
    let summary = if summary_path.is_file() {
        read_text(&summary_path)?
    } else {
        Vec::new()
    };
    let numbers = if summary.is_empty() {
        "*No numeric summary was produced.*".to_string()
    } else {
        summary.join("\n")
    };

    let by_vy = figures_matching(dir, "by_vy_t", ".png")?;
    let bx = image_or_note(dir, "Bx.gif", "Bx evolution");
    let bz = image_or_note(dir, "Bz.gif", "Bz evolution");
    let vx = image_or_note(dir, "vx.gif", "vx evolution");
    let by_vy_figs = image_list(&by_vy, "By and vy", "Neither bx2 nor vx2 was available.");
    let rho0 = image_or_note(dir, "rho_t00.png", "Density at t=0");
    let bz0 = image_or_note(dir, "bz_t00.png", "Bz at t=0");
    let amp = image_or_note(dir, "vx_amp_over_time.png", "vx amplitude over time");
    let regime = regime_sentence(&summary);

    let body = format!(
        r#"# Alfven wave along a uniform magnetic field

## Setup

- Ideal MHD, periodic boundaries
- Background field B0 along z
- Perturbation B1 = 0.1 sin(8 pi z / L) along x, perpendicular to B0
- Uniform density

## What are Alfven waves and how do they travel?

Alfven waves are transverse MHD perturbations that travel along magnetic
field lines. The initial Bx perturbation is perpendicular to the background
Bz, so the disturbance propagates along z.

Perpendicular field Bx:

{bx}

Background field Bz:

{bz}

Velocity vx:

{vx}

## Why do By and vy stay near zero?

For a pure Alfven wave along z the perturbations live in the plane spanned
by the initial perturbation (x) and the background field (z). Nothing drives
the y direction, so By and vy remain at zero.

{by_vy_figs}

## Alfven speed

v_A = B0 / sqrt(rho0), with B0 the mean background field and rho0 the mean
density at t = 0.

```text
{numbers}
```

{rho0}

{bz0}

## Sub- or super-Alfvenic?

The Alfvenic Mach number compares the largest |vx| with v_A.

{regime}

## Amplitude over time

A linear Alfven wave keeps its amplitude; any drift points to non-linear
steepening, dispersion or numerical dissipation.

{amp}

## Generated files

- Animations: `Bx.mp4`, `Bx.gif`, `Bz.mp4`, `Bz.gif`, `vx.mp4`, `vx.gif`
- Frames: `frames_Bx/NN.png`, `frames_Bz/NN.png`, `frames_vx/NN.png`
- Analysis: `rho_t00.png`, `bz_t00.png`, {by_vy_list}, `vx_amp_over_time.png`
- Numbers: `{SUMMARY_FILE}`
"#,
        by_vy_list = code_list(&by_vy),
    );

    let path = dir.join(NARRATIVE_FILE);
    fs::write(&path, body)?;
    info!("narrative written: {}", path.display());
    Ok(path)
}
