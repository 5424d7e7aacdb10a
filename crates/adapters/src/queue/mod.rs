// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batch queue adapters

mod qstat;
mod sge;

pub use qstat::parse_status;
pub use sge::SgeAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{CompletionHook, FakeJob, FakeQueueAdapter, QueueCall};

pub use qmap_core::state::{JobRecord, QueueStatus};

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from queue operations
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("submission failed (exit code {code:?}): {output}")]
    SubmitFailed { code: Option<i32>, output: String },
    #[error("status query failed: {0}")]
    QueryFailed(String),
    #[error("cancel failed: {0}")]
    CancelFailed(String),
    #[error("job not found: {0}")]
    NotFound(String),
    #[error("worker script not found: {0}")]
    ScriptNotFound(PathBuf),
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything needed to start one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub interpreter: PathBuf,
    pub script: PathBuf,
    pub args: Vec<String>,
    pub job_name: String,
    pub stdout_path: PathBuf,
    pub stderr_path: PathBuf,
    pub queue_name: Option<String>,
}

/// Adapter that can start jobs
#[async_trait]
pub trait SubmitAdapter: Clone + Send + Sync + 'static {
    /// Start one job. Not retried by the adapter.
    async fn submit(&self, request: &SubmitRequest) -> Result<(), QueueError>;
}

/// Adapter for an external batch engine
#[async_trait]
pub trait QueueAdapter: SubmitAdapter {
    /// Running and pending jobs as currently reported by the engine
    async fn status(&self) -> Result<QueueStatus, QueueError>;

    /// Cancel the job with engine-assigned `job_number`
    async fn cancel(&self, job_number: &str) -> Result<(), QueueError>;
}
