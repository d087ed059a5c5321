// tests/common/mod.rs
//
// Shared fixtures: synthetic snapshot directories and recording doubles for
// the two environment seams (image sink and video encoder).

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use ndarray::Array1;
use ndarray_npy::write_npy;

use wavepost::config::PipelineConfig;
use wavepost::movie::{EncodeError, EncodeRequest, VideoEncoder};
use wavepost::visualisation::{LinePlot, PlotRenderer};
use wavepost::Result;

pub const N: usize = 32;

/// Uniform grid on [0, 1].
pub fn grid() -> Array1<f64> {
    Array1::linspace(0.0, 1.0, N)
}

pub fn write_array(dir: &Path, name: &str, values: &Array1<f64>) {
    fs::create_dir_all(dir).unwrap();
    write_npy(dir.join(name), values).unwrap();
}

/// Gaussian pulse of height `amp` on top of 1.
pub fn pulse(amp: f64, centre: f64) -> Array1<f64> {
    grid().mapv(|x| 1.0 + amp * (-((x - centre) / 0.05).powi(2)).exp())
}

pub fn sine(amp: f64, phase: f64) -> Array1<f64> {
    grid().mapv(|z| amp * (8.0 * std::f64::consts::PI * z + phase).sin())
}

pub fn constant(v: f64) -> Array1<f64> {
    Array1::from_elem(N, v)
}

/// Config rooted in a temp directory.
pub fn config(root: &Path) -> PipelineConfig {
    PipelineConfig {
        data_root: root.join("data"),
        results_root: root.join("results"),
        ..PipelineConfig::default()
    }
}

/// Stands in for the bitmap renderer: remembers every plot and writes a
/// tiny solid PNG at the requested path so the frame sequencer has real
/// files to work with.
#[derive(Default)]
pub struct RecordingRenderer {
    pub rendered: Vec<(PathBuf, LinePlot)>,
}

impl RecordingRenderer {
    pub fn paths(&self) -> Vec<PathBuf> {
        self.rendered.iter().map(|(p, _)| p.clone()).collect()
    }

    pub fn plot_at(&self, path: &Path) -> Option<&LinePlot> {
        self.rendered
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, plot)| plot)
    }
}

impl PlotRenderer for RecordingRenderer {
    fn render(&mut self, path: &Path, plot: &LinePlot) -> Result<()> {
        let shade = (self.rendered.len() * 37 % 255) as u8;
        RgbImage::from_pixel(8, 6, Rgb([shade, 128, 255 - shade]))
            .save(path)
            .expect("fixture PNG");
        self.rendered.push((path.to_path_buf(), plot.clone()));
        Ok(())
    }
}

/// Encoder double that records requests and touches the output file.
#[derive(Default)]
pub struct RecordingEncoder {
    pub requests: RefCell<Vec<EncodeRequest>>,
}

impl VideoEncoder for RecordingEncoder {
    fn encode(&self, request: &EncodeRequest) -> std::result::Result<(), EncodeError> {
        fs::write(&request.output, b"mp4")?;
        self.requests.borrow_mut().push(request.clone());
        Ok(())
    }
}

/// Encoder double for a machine without ffmpeg.
pub struct MissingEncoder;

impl VideoEncoder for MissingEncoder {
    fn encode(&self, _request: &EncodeRequest) -> std::result::Result<(), EncodeError> {
        Err(EncodeError::ToolMissing("ffmpeg".into()))
    }
}
