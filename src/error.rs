use std::path::PathBuf;

use thiserror::Error;

pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_MISSING_DIR: i32 = 11;
pub const EXIT_INVALID_MOVIE_EXT: i32 = 12;
pub const EXIT_UNSUPPORTED_MOVIE_EXT: i32 = 13;
pub const EXIT_FRAMERATE_OUT_OF_RANGE: i32 = 14;
pub const EXIT_USER_DECLINED: i32 = 15;
pub const EXIT_NO_PNG_FOR_JSON: i32 = 16;
pub const EXIT_RENAME_DUPLICATE: i32 = 17;
pub const EXIT_NO_JSON_FOR_ANNOTATE: i32 = 18;
pub const EXIT_NO_PNG_TO_CONVERT: i32 = 19;
pub const EXIT_INVALID_QUALITY: i32 = 20;

#[derive(Error, Debug)]
pub enum Error {
    #[error("input directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),

    #[error("invalid file extension for movie file '{}'", .0.display())]
    InvalidMovieExtension(PathBuf),

    #[error("unsupported extension for movie file '{0}' (expected mkv, mp4, flv or avi)")]
    UnsupportedMovieExtension(String),

    #[error("frame rate value {0} is out of range 1..30")]
    FrameRateOutOfRange(i64),

    #[error("jpeg quality {0} is out of range 1..100")]
    InvalidQuality(i64),

    #[error("{0}, exiting")]
    UserDeclined(String),

    #[error("no PNG files found in {} (conversion may be required)", .0.display())]
    NoImagesForSidecars(PathBuf),

    #[error(
        "can't rename {} to {}: the file exists, two images share a modify date or --rename was already used",
        .from.display(),
        .to.display()
    )]
    RenameCollision { from: PathBuf, to: PathBuf },

    #[error("sidecar {} not found, perhaps --skip-json was used before any sidecar was created", .0.display())]
    MissingSidecar(PathBuf),

    #[error("no PNG files found to convert in {}", .0.display())]
    NoImagesToConvert(PathBuf),

    #[error("{tool} returned a non-zero exit status: {code}")]
    ExternalTool { tool: String, code: i32 },

    #[error("malformed output from {tool}: {source}")]
    ToolOutput {
        tool: String,
        source: serde_json::Error,
    },

    #[error("can't decode image {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("can't encode frame {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("malformed sidecar {}: {source}", .path.display())]
    Sidecar {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("can't load font {}", .0.display())]
    Font(PathBuf),

    #[error("can't build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::MissingDirectory(_) => EXIT_MISSING_DIR,
            Error::InvalidMovieExtension(_) => EXIT_INVALID_MOVIE_EXT,
            Error::UnsupportedMovieExtension(_) => EXIT_UNSUPPORTED_MOVIE_EXT,
            Error::FrameRateOutOfRange(_) => EXIT_FRAMERATE_OUT_OF_RANGE,
            Error::InvalidQuality(_) => EXIT_INVALID_QUALITY,
            Error::UserDeclined(_) => EXIT_USER_DECLINED,
            Error::NoImagesForSidecars(_) => EXIT_NO_PNG_FOR_JSON,
            Error::RenameCollision { .. } => EXIT_RENAME_DUPLICATE,
            Error::MissingSidecar(_) => EXIT_NO_JSON_FOR_ANNOTATE,
            Error::NoImagesToConvert(_) => EXIT_NO_PNG_TO_CONVERT,
            Error::ExternalTool { code, .. } if *code != 0 => *code,
            _ => EXIT_FAILURE,
        }
    }
}
