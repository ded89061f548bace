//! Helpers for invoking the built `wirespec` binary in tests.
//!
//! These utilities use `assert_cmd` to locate the current workspace's
//! `wirespec` executable and run it in a controlled working directory,
//! capturing stdout/stderr for assertions.

use anyhow::{Context, Result};
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Captured output from a `wirespec` invocation.
#[derive(Debug)]
pub struct WirespecRun {
    /// Captured stdout (lossy UTF-8).
    pub stdout: String,
    /// Captured stderr (lossy UTF-8).
    pub stderr: String,
    /// Whether the command exited successfully.
    pub success: bool,
}

/// Run `wirespec` in `current_dir` with the supplied args.
///
/// # Errors
///
/// Returns an error when `wirespec` cannot be located or the process cannot
/// be spawned.
pub fn run_wirespec_in(current_dir: &Path, args: &[&str]) -> Result<WirespecRun> {
    let mut cmd = Command::cargo_bin("wirespec").context("locate wirespec binary")?;
    let output = cmd
        .current_dir(current_dir)
        .args(args)
        .output()
        .context("run wirespec command")?;
    Ok(WirespecRun {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        success: output.status.success(),
    })
}

/// Write `yaml` to `dir/Wiringfile`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_wiringfile(dir: &Path, yaml: &str) -> Result<PathBuf> {
    let path = dir.join("Wiringfile");
    fs::write(&path, yaml).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

/// Copy `tests/data/{fixture}` into a fresh temporary directory as its
/// `Wiringfile`.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the fixture cannot
/// be copied.
pub fn workspace_with(fixture: &str) -> Result<TempDir> {
    let temp = tempfile::tempdir().context("create temp dir")?;
    let target = temp.path().join("Wiringfile");
    fs::copy(Path::new("tests/data").join(fixture), &target)
        .with_context(|| format!("copy {fixture} to {}", target.display()))?;
    Ok(temp)
}
