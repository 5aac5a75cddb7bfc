//! Command-line behaviour that needs neither exiftool nor ffmpeg.

#![allow(deprecated)] // cargo_bin deprecation

use std::fs;

use assert_cmd::Command;
use image::{Rgb, RgbImage};
use predicates::prelude::*;

fn rotofy() -> Command {
    Command::cargo_bin("rotofy").expect("binary 'rotofy' should be built")
}

#[test]
fn help_lists_flags() {
    rotofy()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--input-dir")
                .and(predicate::str::contains("--movie-file"))
                .and(predicate::str::contains("--framerate")),
        );
}

#[test]
fn frame_rate_out_of_range() {
    for rate in ["0", "31"] {
        rotofy()
            .args(["--framerate", rate])
            .assert()
            .code(14)
            .stderr(predicate::str::contains("out of range"));
    }
}

#[test]
fn missing_input_directory() {
    rotofy()
        .args(["-i", "/definitely/not/a/directory"])
        .assert()
        .code(11);
}

#[test]
fn movie_file_without_extension() {
    let dir = tempfile::tempdir().unwrap();
    rotofy()
        .arg("-i")
        .arg(dir.path())
        .args(["-m", "movie"])
        .assert()
        .code(12);
}

#[test]
fn unsupported_movie_extension() {
    let dir = tempfile::tempdir().unwrap();
    rotofy()
        .arg("-i")
        .arg(dir.path())
        .args(["-m", "movie.mpg"])
        .assert()
        .code(13)
        .stderr(predicate::str::contains("mpg"));
}

#[test]
fn bad_quality() {
    rotofy().args(["-q", "0"]).assert().code(20);
}

#[test]
fn empty_directory_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    rotofy()
        .arg("-i")
        .arg(dir.path())
        .assert()
        .code(16)
        .stderr(predicate::str::contains("no PNG files"));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn annotate_without_sidecars() {
    let dir = tempfile::tempdir().unwrap();
    RgbImage::from_pixel(8, 8, Rgb([1, 2, 3]))
        .save(dir.path().join("a.png"))
        .unwrap();
    rotofy()
        .arg("-i")
        .arg(dir.path())
        .args(["--skip-json", "-a"])
        .assert()
        .code(18)
        .stderr(predicate::str::contains("a.json"));
    assert!(!dir.path().join("output.mkv").exists());
}

#[test]
fn declining_current_directory() {
    let dir = tempfile::tempdir().unwrap();
    rotofy()
        .current_dir(dir.path())
        .write_stdin("n\n")
        .assert()
        .code(15)
        .stderr(predicate::str::contains("current directory"));
}

#[test]
fn shell_completions() {
    rotofy()
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rotofy"));
}

#[test]
fn closed_stdin_declines_current_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("keep.png"), b"").unwrap();
    rotofy()
        .current_dir(dir.path())
        .arg("--rename")
        .write_stdin("")
        .assert()
        .code(15);
    assert!(dir.path().join("keep.png").exists());
}
