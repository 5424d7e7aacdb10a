// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Direct execution without a batch engine
//!
//! Runs the worker script as a local child process and waits for it, so a
//! completed `submit` means a completed job.

use crate::queue::{QueueError, SubmitAdapter, SubmitRequest};
use async_trait::async_trait;
use std::fs::File;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

#[derive(Debug, Clone, Default)]
pub struct DirectAdapter;

impl DirectAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn create(path: &Path) -> Result<File, QueueError> {
    File::create(path).map_err(|source| QueueError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[async_trait]
impl SubmitAdapter for DirectAdapter {
    async fn submit(&self, request: &SubmitRequest) -> Result<(), QueueError> {
        let stdout = create(&request.stdout_path)?;
        let stderr = create(&request.stderr_path)?;

        tracing::debug!(
            job_name = %request.job_name,
            queue = ?request.queue_name,
            "running job locally"
        );

        let status = Command::new(&request.interpreter)
            .arg(&request.script)
            .args(&request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .status()
            .await
            .map_err(|source| QueueError::Spawn {
                program: request.interpreter.clone(),
                source,
            })?;

        // A failing job shows up as a missing result, not as a submit error
        if !status.success() {
            tracing::warn!(job_name = %request.job_name, %status, "job exited unsuccessfully");
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "direct_tests.rs"]
mod tests;
