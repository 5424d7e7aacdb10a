// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Result collection and diagnostics

use qmap_core::codec;
use qmap_core::Session;
use serde::de::DeserializeOwned;
use std::fs;

/// Everything read back from a settled session
#[derive(Debug)]
pub struct Collection<O> {
    /// One slot per job, in submission order
    pub results: Vec<Option<O>>,
    /// Jobs whose output was absent or undecodable
    pub missing: Vec<usize>,
    /// Jobs that wrote to stderr
    pub stderr_jobs: Vec<usize>,
}

impl<O> Collection<O> {
    pub fn has_stderr(&self) -> bool {
        !self.stderr_jobs.is_empty()
    }
}

/// Read every job's output and inspect its captured stderr
pub fn collect<O: DeserializeOwned>(session: &Session) -> Collection<O> {
    let mut collection = Collection {
        results: Vec::with_capacity(session.job_count()),
        missing: Vec::new(),
        stderr_jobs: Vec::new(),
    };

    for job in session.jobs() {
        match codec::read_blob::<O>(&job.output) {
            Ok(value) => collection.results.push(Some(value)),
            Err(e) => {
                if e.is_missing() {
                    tracing::warn!(index = job.index, "no result for job");
                } else {
                    tracing::warn!(index = job.index, error = %e, "unreadable result for job");
                }
                collection.missing.push(job.index);
                collection.results.push(None);
            }
        }

        // A missing stderr file counts as empty
        let wrote_stderr = fs::metadata(&job.stderr)
            .map(|meta| meta.len() > 0)
            .unwrap_or(false);
        if wrote_stderr {
            tracing::warn!(
                index = job.index,
                path = %job.stderr.display(),
                "job wrote to stderr"
            );
            collection.stderr_jobs.push(job.index);
        }
    }

    collection
}

#[cfg(test)]
#[path = "collector_tests.rs"]
mod tests;
