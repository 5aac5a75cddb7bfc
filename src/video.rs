//! Movie assembly: delivery frames piped into `ffmpeg -f image2pipe`.

use std::{
    ffi::OsString,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process::{ChildStdin, Command, Stdio},
};

use tracing::{debug, info, warn};

use crate::{
    convert::FRAME_EXTENSION,
    error::{Error, Result},
};

pub const DEFAULT_MOVIE_FILENAME: &str = "output.mkv";

/// Containers known to accept low frame-rate image2pipe input.
/// mpg is left out: MPEG-1/2 rejects rates like 5/1.
pub const SUPPORTED_MOVIE_EXTENSIONS: [&str; 4] = ["mkv", "mp4", "flv", "avi"];

pub const MIN_FRAME_RATE: i64 = 1;
pub const MAX_FRAME_RATE: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeOutcome {
    Created,
    /// Encoder exited with a non-zero status (`None` when killed by a signal)
    Failed(Option<i32>),
}

pub trait FrameEncoder: Sync {
    /// Encode `frames` in order into `output`, which must not exist
    fn encode(
        &self,
        frames: &[PathBuf],
        output: &Path,
        frame_rate: Option<u32>,
        verbose: bool,
    ) -> Result<EncodeOutcome>;
}

/// Delivery frames in `dir`, lexicographically ordered
pub fn collect_frames(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/*.{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        FRAME_EXTENSION
    );
    let paths = glob::glob(&pattern)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?
        .collect::<std::result::Result<Vec<PathBuf>, glob::GlobError>>()
        .map_err(glob::GlobError::into_error)?;
    let mut frames: Vec<PathBuf> = paths.into_iter().filter(|p| p.is_file()).collect();
    frames.sort_unstable();
    Ok(frames)
}

#[derive(Debug, Clone)]
pub struct Ffmpeg {
    program: PathBuf,
}

impl Ffmpeg {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn args(output: &Path, frame_rate: Option<u32>, verbose: bool) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            if verbose { "debug" } else { "panic" }.into(),
            "-f".into(),
            "image2pipe".into(),
        ];
        if let Some(rate) = frame_rate {
            args.push("-framerate".into());
            args.push(rate.to_string().into());
        }
        args.extend(["-i".into(), "-".into(), "-an".into(), output.into()]);
        args
    }
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new(crate::utils::find_program("ffmpeg"))
    }
}

impl FrameEncoder for Ffmpeg {
    fn encode(
        &self,
        frames: &[PathBuf],
        output: &Path,
        frame_rate: Option<u32>,
        verbose: bool,
    ) -> Result<EncodeOutcome> {
        let args = Ffmpeg::args(output, frame_rate, verbose);
        info!(
            "running {} {}",
            self.program.display(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );
        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = feed(&mut stdin, frames) {
                // stdin is still open, so the encoder can't finish a partial movie
                if let Err(k) = child.kill() {
                    debug!("can't stop encoder: {k}");
                }
                child.wait()?;
                return Err(e.into());
            }
            // dropping stdin signals end of input
        }

        let status = child.wait()?;
        if status.success() {
            Ok(EncodeOutcome::Created)
        } else {
            Ok(EncodeOutcome::Failed(status.code()))
        }
    }
}

/// Write every frame to the encoder; it closing its input early is not an error
fn feed(stdin: &mut ChildStdin, frames: &[PathBuf]) -> io::Result<()> {
    for frame in frames {
        let bytes = fs::read(frame)?;
        if let Err(e) = stdin.write_all(&bytes) {
            if e.kind() == io::ErrorKind::BrokenPipe {
                debug!("encoder closed its input at {}", frame.display());
                return Ok(());
            }
            return Err(e);
        }
    }
    Ok(())
}

/// Extension check for the movie file name
pub fn validate_movie_extension(movie: &Path) -> Result<()> {
    let ext = movie
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if ext.is_empty() {
        return Err(Error::InvalidMovieExtension(movie.to_path_buf()));
    }
    if !SUPPORTED_MOVIE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(Error::UnsupportedMovieExtension(ext));
    }
    Ok(())
}

pub fn validate_frame_rate(rate: i64) -> Result<u32> {
    if !(MIN_FRAME_RATE..=MAX_FRAME_RATE).contains(&rate) {
        return Err(Error::FrameRateOutOfRange(rate));
    }
    u32::try_from(rate).map_err(|_| Error::FrameRateOutOfRange(rate))
}

/// Log the outcome; a failed encode is not fatal
pub fn report(outcome: EncodeOutcome, output: &Path) {
    match outcome {
        EncodeOutcome::Created => info!("output file {} created", output.display()),
        EncodeOutcome::Failed(Some(code)) => {
            warn!("ffmpeg returned a non-zero exit status: {code}, consider using --verbose")
        }
        EncodeOutcome::Failed(None) => warn!("ffmpeg was terminated by a signal"),
    }
}
