// src/movie.rs
//
// Turn a directory of numbered PNG frames into an MP4 (external `ffmpeg`)
// and, independently, an animated GIF (`image` crate, `gif` feature).
// Neither output is required: failures are logged and reported, never
// propagated.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{info, warn};
use thiserror::Error;

/// Environment variable that overrides the encoder executable.
pub const FFMPEG_ENV: &str = "WAVEPOST_FFMPEG";

/// Numeric index of a frame file named `<prefix><digits>.png`.
pub fn frame_index(file_name: &str, prefix: &str) -> Option<u32> {
    let digits = file_name.strip_prefix(prefix)?.strip_suffix(".png")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// All `<prefix>NN.png` frames in `dir`, in ascending numeric order.
pub fn list_frames(dir: &Path, prefix: &str) -> io::Result<Vec<(u32, PathBuf)>> {
    let mut frames = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some(k) = frame_index(name, prefix) {
            frames.push((k, entry.path()));
        }
    }
    frames.sort_by_key(|(k, _)| *k);
    Ok(frames)
}

/// Zero-pad width of the frame numbers: at least 2, else the digit count
/// of the largest index.
pub fn pattern_width(indices: impl IntoIterator<Item = u32>) -> usize {
    indices
        .into_iter()
        .max()
        .map(|m| m.to_string().len())
        .unwrap_or(2)
        .max(2)
}

/// First missing index between the smallest and largest of `indices`
/// (sorted ascending), if any.
pub fn first_gap(indices: &[u32]) -> Option<u32> {
    indices
        .windows(2)
        .find(|w| w[1] > w[0] + 1)
        .map(|w| w[0] + 1)
}

/// `printf`-style input pattern understood by the encoder, e.g.
/// `density_%02d.png`.
pub fn frame_pattern(prefix: &str, width: usize) -> String {
    format!("{prefix}%0{width}d.png")
}

/// One video encoding job.
#[derive(Debug, Clone)]
pub struct EncodeRequest {
    pub frames_dir: PathBuf,
    /// File-name pattern inside `frames_dir` (see [`frame_pattern`]).
    pub pattern: String,
    /// Index of the first frame; the pattern is read from there on.
    pub start_number: u32,
    pub fps: u32,
    pub output: PathBuf,
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("encoder `{0}` not found")]
    ToolMissing(String),
    #[error("encoder exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Something that can turn numbered frames into a video file.
pub trait VideoEncoder {
    fn encode(&self, request: &EncodeRequest) -> Result<(), EncodeError>;
}

/// The `ffmpeg` command-line encoder.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    pub program: String,
}

impl Ffmpeg {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// `ffmpeg` from PATH unless [`FFMPEG_ENV`] names another binary.
    pub fn from_env() -> Self {
        Self::new(env::var(FFMPEG_ENV).unwrap_or_else(|_| "ffmpeg".into()))
    }

    /// Arguments for one request (without the program name).
    pub fn args(request: &EncodeRequest) -> Vec<OsString> {
        let input = request.frames_dir.join(&request.pattern);
        vec![
            "-y".into(),
            "-framerate".into(),
            request.fps.to_string().into(),
            "-start_number".into(),
            request.start_number.to_string().into(),
            "-i".into(),
            input.into_os_string(),
            "-vf".into(),
            "format=yuv420p".into(),
            request.output.clone().into_os_string(),
        ]
    }
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::from_env()
    }
}

impl VideoEncoder for Ffmpeg {
    fn encode(&self, request: &EncodeRequest) -> Result<(), EncodeError> {
        let output = Command::new(&self.program)
            .args(Self::args(request))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => EncodeError::ToolMissing(self.program.clone()),
                _ => EncodeError::Io(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // the last lines carry the actual reason
            let tail: Vec<&str> = stderr.lines().rev().take(3).collect();
            return Err(EncodeError::Failed {
                status: output.status.to_string(),
                stderr: tail.into_iter().rev().collect::<Vec<_>>().join(" | "),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum AnimationError {
    #[error("built without the `gif` feature")]
    Unavailable,
    #[error("no frames matching {0}")]
    NoFrames(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[cfg(feature = "gif")]
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Encode all `<prefix>NN.png` frames of `frames_dir`, in numeric order,
/// into a looping GIF. Returns the number of frames written.
#[cfg(feature = "gif")]
pub fn build_gif(
    frames_dir: &Path,
    prefix: &str,
    output: &Path,
    fps: u32,
) -> Result<usize, AnimationError> {
    use std::fs::File;
    use std::io::BufWriter;

    use image::codecs::gif::{GifEncoder, Repeat};
    use image::{Delay, Frame};

    let frames = list_frames(frames_dir, prefix)?;
    if frames.is_empty() {
        return Err(AnimationError::NoFrames(format!(
            "{}/{prefix}*.png",
            frames_dir.display()
        )));
    }

    let delay = Delay::from_numer_denom_ms(1000 / fps.max(1), 1);
    let write = |frames: &[(u32, PathBuf)]| -> Result<(), AnimationError> {
        let file = File::create(output)?;
        let mut encoder = GifEncoder::new_with_speed(BufWriter::new(file), 10);
        encoder.set_repeat(Repeat::Infinite)?;
        for (_, path) in frames {
            let rgba = image::open(path)?.to_rgba8();
            encoder.encode_frame(Frame::from_parts(rgba, 0, 0, delay))?;
        }
        Ok(())
    };

    if let Err(e) = write(&frames) {
        // no truncated animation left behind
        if output.exists() {
            let _ = fs::remove_file(output);
        }
        return Err(e);
    }
    Ok(frames.len())
}

#[cfg(not(feature = "gif"))]
pub fn build_gif(
    _frames_dir: &Path,
    _prefix: &str,
    _output: &Path,
    _fps: u32,
) -> Result<usize, AnimationError> {
    Err(AnimationError::Unavailable)
}

/// What [`assemble`] managed to produce.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceReport {
    pub video: Option<PathBuf>,
    pub animation: Option<PathBuf>,
}

fn with_suffix(base: &Path, ext: &str) -> PathBuf {
    let mut s = base.as_os_str().to_owned();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

/// Build `<output_base>.mp4` and `<output_base>.gif` from the frames
/// `<prefix>NN.png` in `frames_dir`. The two outputs are independent and
/// either may be missing from the report.
pub fn assemble(
    frames_dir: &Path,
    output_base: &Path,
    prefix: &str,
    fps: u32,
    encoder: &dyn VideoEncoder,
) -> SequenceReport {
    let mut report = SequenceReport::default();

    let indices = list_frames(frames_dir, prefix)
        .map(|f| f.into_iter().map(|(k, _)| k).collect::<Vec<_>>())
        .unwrap_or_default();

    let mp4 = with_suffix(output_base, "mp4");
    if let Some(missing) = first_gap(&indices) {
        warn!(
            "{}: frame {missing} is missing, the video stops before it",
            frames_dir.display()
        );
    }
    let request = EncodeRequest {
        frames_dir: frames_dir.to_path_buf(),
        pattern: frame_pattern(prefix, pattern_width(indices.iter().copied())),
        start_number: indices.first().copied().unwrap_or(0),
        fps,
        output: mp4.clone(),
    };
    match encoder.encode(&request) {
        Ok(()) => {
            info!("video written: {}", mp4.display());
            report.video = Some(mp4);
        }
        Err(e) => warn!("could not create video {}: {e}", mp4.display()),
    }

    let gif = with_suffix(output_base, "gif");
    match build_gif(frames_dir, prefix, &gif, fps) {
        Ok(n) => {
            info!("GIF written: {} ({n} frames)", gif.display());
            report.animation = Some(gif);
        }
        Err(e) => warn!("could not create GIF {}: {e}", gif.display()),
    }

    report
}
