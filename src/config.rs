use std::path::PathBuf;

use tracing::debug;

use crate::{
    annotate,
    args::Opt,
    convert,
    error::{Error, Result},
    rename::RenameOptions,
    video,
};

/// Validated run configuration, built once from the command line
#[derive(Debug, Clone)]
pub struct Config {
    pub verbose: bool,
    /// `None` means the current directory, after confirmation
    pub input_dir: Option<PathBuf>,
    /// Defaults to the input directory
    pub output_dir: Option<PathBuf>,
    pub rename: RenameOptions,
    pub skip_sidecars: bool,
    pub keep_sidecars: bool,
    pub annotate: bool,
    pub movie_file: PathBuf,
    pub frame_rate: Option<u32>,
    pub overwrite_movie: bool,
    pub skip_movie: bool,
    pub jpeg_quality: u8,
    pub font: Option<PathBuf>,
    pub font_size: f32,
    pub nproc: usize,
    pub exiftool: Option<PathBuf>,
    pub ffmpeg: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: false,
            input_dir: None,
            output_dir: None,
            rename: RenameOptions {
                enabled: false,
                backup: true,
            },
            skip_sidecars: false,
            keep_sidecars: false,
            annotate: false,
            movie_file: PathBuf::from(video::DEFAULT_MOVIE_FILENAME),
            frame_rate: None,
            overwrite_movie: false,
            skip_movie: false,
            jpeg_quality: convert::DEFAULT_JPEG_QUALITY,
            font: None,
            font_size: annotate::DEFAULT_FONT_SIZE,
            nproc: 1,
            exiftool: None,
            ffmpeg: None,
        }
    }
}

impl Config {
    /// Check the arguments before anything on disk is touched
    pub fn from_opt(opt: Opt) -> Result<Self> {
        if let Some(dir) = &opt.input_dir {
            if !dir.is_dir() {
                return Err(Error::MissingDirectory(dir.to_path_buf()));
            }
        }

        video::validate_movie_extension(&opt.movie_file)?;
        debug!("movie file extension ok: {}", opt.movie_file.display());

        let frame_rate = opt.framerate.map(video::validate_frame_rate).transpose()?;

        let jpeg_quality = u8::try_from(opt.quality)
            .ok()
            .filter(|q| (1..=100).contains(q))
            .ok_or(Error::InvalidQuality(opt.quality))?;

        let config = Self {
            verbose: opt.verbose,
            input_dir: opt.input_dir,
            output_dir: opt.output_dir,
            rename: RenameOptions {
                enabled: opt.rename,
                backup: !opt.no_backup,
            },
            skip_sidecars: opt.skip_json,
            keep_sidecars: opt.keep_json,
            annotate: opt.annotate,
            movie_file: opt.movie_file,
            frame_rate,
            overwrite_movie: opt.overwrite_movie,
            skip_movie: opt.skip_movie,
            jpeg_quality,
            font: opt.font,
            font_size: opt.font_size,
            nproc: opt.nproc,
            exiftool: opt.exiftool,
            ffmpeg: opt.ffmpeg,
        };
        debug!("{:?}", &config);
        Ok(config)
    }
}
