// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work area lifecycle
//!
//! A work area is the directory holding one session's job files. It is
//! created empty, filled by the controller, and either removed or retained
//! when the batch settles.

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("work directory already exists and is not empty: {0}")]
    AlreadyExists(PathBuf),
    #[error("work directory I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> WorkspaceError + '_ {
    move |source| WorkspaceError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// What happened to the work area at the end of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Removed,
    Retained(PathBuf),
}

#[derive(Debug)]
pub struct WorkArea {
    path: PathBuf,
}

impl WorkArea {
    /// Create the directory at `dir`, parents included
    ///
    /// Relative paths are resolved against the current directory so job files
    /// stay reachable from execution hosts with a different working directory.
    /// An existing empty directory is reused.
    pub fn create(dir: &Path) -> Result<Self, WorkspaceError> {
        let path = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            std::env::current_dir().map_err(io_err(dir))?.join(dir)
        };

        if path.exists() {
            let mut entries = fs::read_dir(&path).map_err(io_err(&path))?;
            if entries.next().is_some() {
                return Err(WorkspaceError::AlreadyExists(path));
            }
        } else {
            fs::create_dir_all(&path).map_err(io_err(&path))?;
        }

        tracing::debug!(path = %path.display(), "created work area");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write an executable file (mode 0755) into the work area
    pub fn write_script(&self, name: &str, contents: &str) -> Result<PathBuf, WorkspaceError> {
        let path = self.path.join(name);
        fs::write(&path, contents).map_err(io_err(&path))?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).map_err(io_err(&path))?;
        Ok(path)
    }

    /// Remove the work area, or keep it when `retain` is set
    pub fn dispose(self, retain: bool) -> Result<Disposition, WorkspaceError> {
        if retain {
            tracing::info!(path = %self.path.display(), "retaining work area");
            return Ok(Disposition::Retained(self.path));
        }
        fs::remove_dir_all(&self.path).map_err(io_err(&self.path))?;
        tracing::debug!(path = %self.path.display(), "removed work area");
        Ok(Disposition::Removed)
    }
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
