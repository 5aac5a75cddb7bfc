pub mod annotate;
pub mod args;
pub mod config;
pub mod convert;
pub mod error;
pub mod exif;
pub mod params;
pub mod pipeline;
pub mod rename;
pub mod sidecar;
pub mod utils;
pub mod video;

pub use error::{Error, Result};
