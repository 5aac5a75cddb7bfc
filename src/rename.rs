use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, FixedOffset};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Subdirectory of the input directory holding originals of renamed images
pub const BACKUP_DIR: &str = "bak";

/// `YYMMDDHHMMSS`
pub const CANONICAL_NAME_FORMAT: &str = "%y%m%d%H%M%S";

#[derive(Debug, Clone, Copy, Default)]
pub struct RenameOptions {
    pub enabled: bool,
    pub backup: bool,
}

/// Name derived from the modify date, keeping the original extension
pub fn canonical_name(path: &Path, modify_date: &DateTime<FixedOffset>) -> String {
    let stamp = modify_date.format(CANONICAL_NAME_FORMAT).to_string();
    match path.extension() {
        Some(ext) => format!("{}.{}", stamp, ext.to_string_lossy()),
        None => stamp,
    }
}

/// Rename `path` after its modify date and return where the file now lives.
///
/// Nothing happens when renaming is off or there is no date. An existing file
/// at the new name is never overwritten: it means either two images share a
/// timestamp or the directory was already renamed, and the two can't be told
/// apart.
pub fn canonicalize(
    path: &Path,
    modify_date: Option<&DateTime<FixedOffset>>,
    opts: &RenameOptions,
) -> Result<PathBuf> {
    if !opts.enabled {
        return Ok(path.to_path_buf());
    }
    let Some(modify_date) = modify_date else {
        debug!(
            "{} has no date-based tag, not renaming",
            path.display()
        );
        return Ok(path.to_path_buf());
    };

    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let candidate = dir.join(canonical_name(path, modify_date));
    if candidate.exists() {
        return Err(Error::RenameCollision {
            from: path.to_path_buf(),
            to: candidate,
        });
    }

    if opts.backup {
        if let Err(e) = backup(path, dir) {
            warn!("can't back up {}: {}", path.display(), e);
        }
    }

    fs::rename(path, &candidate)?;
    debug!("{} renamed to {}", path.display(), candidate.display());
    Ok(candidate)
}

/// Copy `path` into `<dir>/bak`, replacing an older copy of the same name
fn backup(path: &Path, dir: &Path) -> io::Result<PathBuf> {
    let backup_dir = dir.join(BACKUP_DIR);
    crate::utils::mkdir(&backup_dir)?;
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no file name"))?;
    let backup_path = backup_dir.join(file_name);
    match fs::remove_file(&backup_path) {
        Ok(()) => debug!("existing backup {} deleted", backup_path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    fs::copy(path, &backup_path)?;
    debug!("backup {} created", backup_path.display());
    Ok(backup_path)
}
