use std::path::PathBuf;

use clap::Parser;
use clap_complete::Shell;

use crate::{annotate, convert, video};

/// Combine the PNG files of a directory into a movie file
#[derive(Parser, Clone, Debug)]
#[command(name = "rotofy", version, about)]
pub struct Opt {
    /// Verbose output (per-file log lines instead of progress bars)
    #[arg(short, long)]
    pub verbose: bool,
    /// Directory to convert [current directory]
    #[arg(short, long = "input-dir", visible_alias = "dir")]
    pub input_dir: Option<PathBuf>,
    /// Directory for json files, frames and the movie [input directory]
    #[arg(short, long = "output-dir")]
    pub output_dir: Option<PathBuf>,
    /// Rename files based upon their modify date tag
    #[arg(long)]
    pub rename: bool,
    /// Don't copy originals into bak/ before renaming
    #[arg(long)]
    pub no_backup: bool,
    /// Skip json file creation
    #[arg(long = "skip-json", alias = "skipjson")]
    pub skip_json: bool,
    /// Don't remove json files after use
    #[arg(long = "keep-json", alias = "keepjson")]
    pub keep_json: bool,
    /// Annotate top of frames with key parameters
    #[arg(short, long)]
    pub annotate: bool,
    /// Output movie file (mkv|mp4|avi|flv), relative to the output directory
    #[arg(short, long = "movie-file", alias = "moviefile", default_value = video::DEFAULT_MOVIE_FILENAME)]
    pub movie_file: PathBuf,
    /// Output movie frame rate (1-30)
    #[arg(short = 'r', long, allow_negative_numbers = true)]
    pub framerate: Option<i64>,
    /// Overwrite movie file without prompting
    #[arg(long = "overwrite-movie", alias = "overwritemovie")]
    pub overwrite_movie: bool,
    /// Skip movie file creation
    #[arg(long = "skip-movie", alias = "skipmovie")]
    pub skip_movie: bool,
    /// JPEG frame quality (1-100)
    #[arg(short, long, default_value_t = i64::from(convert::DEFAULT_JPEG_QUALITY), allow_negative_numbers = true)]
    pub quality: i64,
    /// Caption font (ttf/otf) [first system sans font found]
    #[arg(long)]
    pub font: Option<PathBuf>,
    /// Caption font size in px
    #[arg(long, default_value_t = annotate::DEFAULT_FONT_SIZE)]
    pub font_size: f32,
    /// Number of simultaneously converted images
    #[arg(long, default_value = "1")]
    pub nproc: usize,
    /// exiftool executable [found on PATH]
    #[arg(long)]
    pub exiftool: Option<PathBuf>,
    /// ffmpeg executable [found on PATH]
    #[arg(long)]
    pub ffmpeg: Option<PathBuf>,
    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL")]
    pub completions: Option<Shell>,
}
