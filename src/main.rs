// src/main.rs
//
// Command-line driver. Reads the PLUTO snapshot exports under `data/` and
// writes everything to `results/` (both overridable).
//
// Examples:
//
//   cargo run --release -- all
//       -> sound-wave and Alfven-wave analyses, one after the other
//
//   cargo run --release -- --data /srv/pluto --fps 24 alfven
//       -> only the Alfven analysis, 24 fps videos
//
//   cargo run --release -- report sound
//       -> rewrite results/sound/summary.md from the files already there
//
// Typical outputs:
//   results/
//     ├── sound/   frames_density/, density.{mp4,gif}, velocities_tNN.png, ...
//     └── alfven/  frames_{Bx,Bz,vx}/, {Bx,Bz,vx}.{mp4,gif}, summary.txt, ...
//
// Set RUST_LOG=debug to see which optional snapshots were skipped, and
// WAVEPOST_FFMPEG to point at a specific ffmpeg binary.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};

use wavepost::config::PipelineConfig;
use wavepost::movie::Ffmpeg;
use wavepost::problems::Analysis;
use wavepost::visualisation::BitmapRenderer;

#[derive(Parser)]
#[command(name = "wavepost")]
#[command(about = "Plots, movies and summaries for 1D sound- and Alfven-wave snapshots")]
#[command(version)]
struct Cli {
    /// JSON configuration file (all keys optional).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Directory containing soundwave-data/ and alfvenwave-data/.
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// Directory the results are written to.
    #[arg(long, global = true)]
    results: Option<PathBuf>,
    /// Frames per second of the videos and GIFs.
    #[arg(long, global = true)]
    fps: Option<u32>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sound wave with reflective walls.
    Sound,
    /// Alfven wave along a uniform field.
    Alfven,
    /// Both analyses (the default).
    All,
    /// Regenerate summary.md from an existing results directory.
    Report {
        #[arg(value_enum)]
        analysis: AnalysisArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum AnalysisArg {
    Sound,
    Alfven,
}

impl From<AnalysisArg> for Analysis {
    fn from(a: AnalysisArg) -> Self {
        match a {
            AnalysisArg::Sound => Analysis::Sound,
            AnalysisArg::Alfven => Analysis::Alfven,
        }
    }
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut cfg = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(d) = &cli.data {
        cfg.data_root = d.clone();
    }
    if let Some(r) = &cli.results {
        cfg.results_root = r.clone();
    }
    if let Some(fps) = cli.fps {
        cfg.fps = fps;
    }
    Ok(cfg.sanitized())
}

/// Run the given analyses independently; returns how many succeeded.
fn run_analyses(cfg: &PipelineConfig, analyses: &[Analysis]) -> usize {
    let mut renderer = BitmapRenderer::new(cfg.image_size());
    let encoder = Ffmpeg::from_env();

    let mut ok = 0;
    for analysis in analyses {
        info!("==================================================");
        info!("running {analysis} analysis");
        info!("==================================================");
        match analysis.run(cfg, &mut renderer, &encoder) {
            Ok(outcome) => {
                ok += 1;
                info!(
                    "{analysis}: done, {} figures, results in {}",
                    outcome.figures.len(),
                    outcome.results_dir.display()
                );
            }
            Err(e) => error!("{analysis}: {e}"),
        }
    }
    ok
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let cfg = load_config(&cli)?;

    let analyses: Vec<Analysis> = match cli.command.unwrap_or(Commands::All) {
        Commands::Sound => vec![Analysis::Sound],
        Commands::Alfven => vec![Analysis::Alfven],
        Commands::All => Analysis::ALL.to_vec(),
        Commands::Report { analysis } => {
            let path = Analysis::from(analysis).report(&cfg)?;
            println!("{}", path.display());
            return Ok(ExitCode::SUCCESS);
        }
    };

    let ok = run_analyses(&cfg, &analyses);
    info!("{ok}/{} analyses completed, results in {}", analyses.len(), cfg.results_root.display());

    Ok(if ok == analyses.len() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
