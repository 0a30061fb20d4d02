use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("command exited without success")]
struct CommandExitStatusError;

/// Adds a `run` method to `std::process::Command` that captures stdout/stderr
/// on failure instead of leaving the caller to inspect an `Output`.
pub trait CommandExt {
    fn run(&mut self) -> Result<()>;
}

impl CommandExt for Command {
    fn run(&mut self) -> Result<()> {
        let output = self.output().context("failed to start command")?;

        match output.status.success() {
            true => Ok(()),
            false => {
                let stdout = std::str::from_utf8(&output.stdout)
                    .context("failed to convert stdout to UTF8")?;
                let stderr = std::str::from_utf8(&output.stderr)
                    .context("failed to convert stderr to UTF8")?;
                eprintln!("stdout: {stdout}");
                eprintln!("stderr: {stderr}");
                Err(CommandExitStatusError.into())
            }
        }
    }
}

/// Adds a `open` method to `PathBuf` for creating/truncating a file the
/// pipeline writes a result or seed file to. `create` ensures the parent
/// directory exists first; the file itself is always truncated-or-created.
pub trait PathBufExt {
    fn open(&self, create: bool) -> Result<File>;
}

impl PathBufExt for Path {
    fn open(&self, create: bool) -> Result<File> {
        if create {
            if let Some(parent) = self.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create directory: {}", parent.display())
                    })?;
                }
            }
        }
        File::create(self)
            .with_context(|| format!("failed to open file for writing: {}", self.display()))
    }
}

impl PathBufExt for PathBuf {
    fn open(&self, create: bool) -> Result<File> {
        self.as_path().open(create)
    }
}
