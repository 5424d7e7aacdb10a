// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sun Grid Engine adapter (`qsub` / `qstat` / `qdel`)

use super::{parse_status, QueueAdapter, QueueError, QueueStatus, SubmitAdapter, SubmitRequest};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;

/// Adapter that drives the engine through its command line tools
#[derive(Debug, Clone)]
pub struct SgeAdapter {
    qsub: PathBuf,
    qstat: PathBuf,
    qdel: PathBuf,
}

impl SgeAdapter {
    pub fn new(qsub: impl Into<PathBuf>, qstat: impl Into<PathBuf>, qdel: impl Into<PathBuf>) -> Self {
        Self {
            qsub: qsub.into(),
            qstat: qstat.into(),
            qdel: qdel.into(),
        }
    }

    pub fn qsub_path(&self) -> &Path {
        &self.qsub
    }

    /// Arguments passed to the submit tool for `request`
    pub fn submit_args(request: &SubmitRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-o".into(),
            request.stdout_path.clone().into(),
            "-e".into(),
            request.stderr_path.clone().into(),
            "-N".into(),
            request.job_name.clone().into(),
            "-V".into(),
        ];
        if let Some(queue) = &request.queue_name {
            args.push("-q".into());
            args.push(queue.into());
        }
        args.push("-S".into());
        args.push(request.interpreter.clone().into());
        args.push(request.script.clone().into());
        args.extend(request.args.iter().map(OsString::from));
        args
    }
}

fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text.trim().to_string()
}

async fn run(program: &Path, args: &[OsString]) -> Result<Output, QueueError> {
    Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|source| QueueError::Spawn {
            program: program.to_path_buf(),
            source,
        })
}

fn is_unknown_job(output: &str) -> bool {
    let lower = output.to_lowercase();
    lower.contains("does not exist") || lower.contains("can not find")
}

#[async_trait]
impl SubmitAdapter for SgeAdapter {
    async fn submit(&self, request: &SubmitRequest) -> Result<(), QueueError> {
        let output = run(&self.qsub, &Self::submit_args(request)).await?;

        if !output.status.success() {
            return Err(QueueError::SubmitFailed {
                code: output.status.code(),
                output: combined_output(&output),
            });
        }

        tracing::debug!(
            job_name = %request.job_name,
            reply = %String::from_utf8_lossy(&output.stdout).trim(),
            "qsub accepted job"
        );
        Ok(())
    }
}

#[async_trait]
impl QueueAdapter for SgeAdapter {
    async fn status(&self) -> Result<QueueStatus, QueueError> {
        let output = run(&self.qstat, &["-r".into()]).await?;

        if !output.status.success() {
            return Err(QueueError::QueryFailed(combined_output(&output)));
        }

        Ok(parse_status(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn cancel(&self, job_number: &str) -> Result<(), QueueError> {
        let output = run(&self.qdel, &[job_number.into()]).await?;

        if !output.status.success() {
            let text = combined_output(&output);
            if is_unknown_job(&text) {
                return Err(QueueError::NotFound(job_number.to_string()));
            }
            return Err(QueueError::CancelFailed(text));
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "sge_tests.rs"]
mod tests;
