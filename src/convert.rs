use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use image::{codecs::jpeg::JpegEncoder, RgbImage};

use crate::error::{Error, Result};

/// Extension of the delivery frames fed to the encoder
pub const FRAME_EXTENSION: &str = "jpg";
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Frame path for `stem` inside `dir`
pub fn frame_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{stem}.{FRAME_EXTENSION}"))
}

/// Decode any supported raster into RGB, dropping alpha
pub fn load(path: &Path) -> Result<RgbImage> {
    let img = image::open(path).map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.into_rgb8())
}

pub fn save(img: &RgbImage, dest: &Path, quality: u8) -> Result<()> {
    let writer = BufWriter::new(File::create(dest)?);
    JpegEncoder::new_with_quality(writer, quality)
        .encode_image(img)
        .map_err(|source| Error::Encode {
            path: dest.to_path_buf(),
            source,
        })
}

pub fn convert(source: &Path, dest: &Path, quality: u8) -> Result<()> {
    let img = load(source)?;
    save(&img, dest, quality)
}
