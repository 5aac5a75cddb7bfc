//! `<stem>.json` files carrying each image's parameter record between passes.

use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::{
    error::{Error, Result},
    params::ParameterRecord,
};

pub const SIDECAR_EXTENSION: &str = "json";

pub fn sidecar_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{stem}.{SIDECAR_EXTENSION}"))
}

/// Create or truncate the sidecar for `stem`
pub fn write(dir: &Path, stem: &str, record: &ParameterRecord) -> Result<PathBuf> {
    let path = sidecar_path(dir, stem);
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, record).map_err(|source| Error::Sidecar {
        path: path.clone(),
        source,
    })?;
    writer.flush()?;
    Ok(path)
}

pub fn read(dir: &Path, stem: &str) -> Result<ParameterRecord> {
    let path = sidecar_path(dir, stem);
    let file = match File::open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(Error::MissingSidecar(path)),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_reader(BufReader::new(file)).map_err(|source| Error::Sidecar { path, source })
}

/// Delete the sidecar for `stem`, returning whether there was one
pub fn remove(dir: &Path, stem: &str) -> Result<bool> {
    match fs::remove_file(sidecar_path(dir, stem)) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
