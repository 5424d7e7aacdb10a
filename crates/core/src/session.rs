// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session identity and per-job file layout
//!
//! A session is one batch: one id, one work area, `job_count` jobs. Every
//! job owns a fixed set of files named by its zero-padded index:
//!
//! ```text
//! 000000007.json      input blob
//! 000000007.json.out  output blob, written by the worker
//! 000000007.json.o    captured stdout
//! 000000007.json.e    captured stderr
//! ```

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// File name of the worker entry point shared by all jobs
pub const WORKER_SCRIPT_NAME: &str = "worker_node_script.sh";

/// File name of the resubmission ledger snapshot
pub const LEDGER_FILE_NAME: &str = "num_resubmissions_by_idx.json";

/// Append `suffix` to the final component of `path`
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = OsString::from(path.as_os_str());
    raw.push(suffix);
    PathBuf::from(raw)
}

/// Where the worker writes the result for the input blob at `input`
pub fn output_path(input: &Path) -> PathBuf {
    with_suffix(input, ".out")
}

/// External name of one job: `q{session}.{index:09}`
///
/// The name is stable across resubmissions and parses back to its index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobName {
    pub session: String,
    pub index: usize,
}

impl JobName {
    pub fn new(session: impl Into<String>, index: usize) -> Self {
        Self {
            session: session.into(),
            index,
        }
    }

    /// Parse an external name produced by `Display`
    pub fn parse(name: &str) -> Option<Self> {
        let rest = name.strip_prefix('q')?;
        let (session, index) = rest.rsplit_once('.')?;
        if session.is_empty() || index.len() < 9 || !index.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self {
            session: session.to_string(),
            index: index.parse().ok()?,
        })
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}.{:09}", self.session, self.index)
    }
}

/// Files belonging to one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPaths {
    pub index: usize,
    pub input: PathBuf,
    pub output: PathBuf,
    pub stdout: PathBuf,
    pub stderr: PathBuf,
}

/// One batch invocation
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    work_dir: PathBuf,
    job_count: usize,
}

impl Session {
    pub fn new(id: impl Into<String>, work_dir: impl Into<PathBuf>, job_count: usize) -> Self {
        Self {
            id: id.into(),
            work_dir: work_dir.into(),
            job_count,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn job_count(&self) -> usize {
        self.job_count
    }

    pub fn job(&self, index: usize) -> JobPaths {
        let input = self.work_dir.join(format!("{:09}.json", index));
        JobPaths {
            index,
            output: output_path(&input),
            stdout: with_suffix(&input, ".o"),
            stderr: with_suffix(&input, ".e"),
            input,
        }
    }

    pub fn jobs(&self) -> impl Iterator<Item = JobPaths> + '_ {
        (0..self.job_count).map(|index| self.job(index))
    }

    pub fn job_name(&self, index: usize) -> JobName {
        JobName::new(self.id.clone(), index)
    }

    /// Index of the job behind an external name, if it belongs to this session
    pub fn owns(&self, name: &str) -> Option<usize> {
        let parsed = JobName::parse(name)?;
        (parsed.session == self.id && parsed.index < self.job_count).then_some(parsed.index)
    }

    pub fn script_path(&self) -> PathBuf {
        self.work_dir.join(WORKER_SCRIPT_NAME)
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.work_dir.join(LEDGER_FILE_NAME)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
