use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::error::Result;

/// Extension of the generator's source images
pub const SOURCE_EXTENSION: &str = "png";

pub fn mkdir(dir: &Path) -> io::Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

pub fn read_dir(dir: &Path) -> io::Result<Vec<PathBuf>> {
    dir.read_dir()?
        .map(|r| r.map(|d| d.path()))
        .collect::<io::Result<Vec<PathBuf>>>()
}

/// Regular files in `dir` with exactly `extension`, sorted by file name
pub fn list_files_with_extension(dir: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
    let mut files = read_dir(dir)?;
    files.retain(|f| f.is_file() && f.extension().is_some_and(|e| e == extension));
    files.sort_unstable();
    Ok(files)
}

pub fn list_source_images(dir: &Path) -> io::Result<Vec<PathBuf>> {
    list_files_with_extension(dir, SOURCE_EXTENSION)
}

pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

/// Absolute path of `name` on PATH, or the bare name for the OS to resolve
pub fn find_program(name: &str) -> PathBuf {
    which::which(name).unwrap_or_else(|_| PathBuf::from(name))
}

/// Per-phase progress on stderr; hidden when per-file debug lines are logged instead
pub fn progress_bar(len: usize, label: &str, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    match ProgressStyle::with_template(&format!(
        "{label} {{bar:40.cyan/blue}} {{pos}}/{{len}} [{{elapsed_precise}}<{{eta_precise}}]"
    )) {
        Ok(style) => pb.set_style(style.progress_chars("##-")),
        Err(e) => debug!("progress style: {e}"),
    }
    pb
}

/// Yes/no questions asked of the user
pub trait Confirm {
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool>;
}

/// Confirmation read from a line of input; an empty answer picks the default
pub struct LineConfirm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl LineConfirm<io::StdinLock<'static>, io::Stderr> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> Confirm for LineConfirm<R, W> {
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        write!(self.output, "{question} {hint}? ")?;
        self.output.flush()?;
        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            debug!("no answer on input, declining");
            return Ok(false);
        }
        Ok(match answer.trim().to_lowercase().as_str() {
            "" => default,
            "y" | "yes" => true,
            "n" | "no" => false,
            _ => !default,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask(answer: &str, default: bool) -> bool {
        let mut out = Vec::new();
        LineConfirm::new(answer.as_bytes(), &mut out)
            .confirm("Continue", default)
            .unwrap()
    }

    #[test]
    fn empty_answer_is_default() {
        assert!(ask("\n", true));
        assert!(!ask("\n", false));
    }

    #[test]
    fn end_of_input_declines() {
        assert!(!ask("", true));
        assert!(!ask("", false));
    }

    #[test]
    fn explicit_answers() {
        assert!(ask("y\n", false));
        assert!(ask("YES\n", false));
        assert!(!ask("n\n", true));
        assert!(!ask("No\n", true));
    }

    #[test]
    fn unrecognised_answer_flips_default() {
        assert!(!ask("maybe\n", true));
        assert!(ask("maybe\n", false));
    }

    #[test]
    fn progress_bar_sized_to_phase() {
        let pb = progress_bar(3, "json", false);
        assert_eq!(pb.length(), Some(3));
        pb.inc(1);
        assert_eq!(pb.position(), 1);
        assert!(progress_bar(3, "json", true).is_hidden());
    }

    #[test]
    fn lists_only_png_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.png", "c.jpg", "d.PNG", "e.json"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.png")).unwrap();
        let files = list_source_images(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["a.png", "b.png"]);
    }
}
