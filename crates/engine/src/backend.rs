// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Submission backend selection
//!
//! A batch runs either on the external engine (`Queued`) or, when its submit
//! tool is unavailable, as local child processes (`Direct`). The choice is
//! made once per batch.

use async_trait::async_trait;
use qmap_adapters::{
    DirectAdapter, QueueError, SgeAdapter, SubmitAdapter, SubmitRequest, TracedQueueAdapter,
};
use qmap_core::MapConfig;
use std::ffi::OsStr;
use std::fmt;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Production queue adapter
pub type SgeBackend = TracedQueueAdapter<SgeAdapter>;

#[derive(Debug, Clone)]
pub enum Backend<Q> {
    Queued(Q),
    Direct(DirectAdapter),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Queued,
    Direct,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Queued => f.write_str("queued"),
            BackendKind::Direct => f.write_str("direct"),
        }
    }
}

impl<Q> Backend<Q> {
    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Queued(_) => BackendKind::Queued,
            Backend::Direct(_) => BackendKind::Direct,
        }
    }
}

impl Backend<SgeBackend> {
    /// Queued if the configured submit tool can be found, Direct otherwise
    pub fn detect(config: &MapConfig) -> Self {
        match resolve_tool(&config.qsub_path) {
            Some(qsub) => {
                tracing::debug!(qsub = %qsub.display(), "using batch engine");
                Backend::Queued(TracedQueueAdapter::new(SgeAdapter::new(
                    qsub,
                    config.qstat_path.clone(),
                    config.qdel_path.clone(),
                )))
            }
            None => {
                tracing::info!(
                    qsub = %config.qsub_path.display(),
                    "submit tool not found, running jobs directly"
                );
                Backend::Direct(DirectAdapter::new())
            }
        }
    }
}

#[async_trait]
impl<Q: SubmitAdapter> SubmitAdapter for Backend<Q> {
    async fn submit(&self, request: &SubmitRequest) -> Result<(), QueueError> {
        match self {
            Backend::Queued(queue) => queue.submit(request).await,
            Backend::Direct(direct) => direct.submit(request).await,
        }
    }
}

fn is_executable(path: &Path) -> bool {
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Locate `tool` using the process `PATH`
pub fn resolve_tool(tool: &Path) -> Option<PathBuf> {
    resolve_tool_in(tool, std::env::var_os("PATH").as_deref())
}

/// Locate `tool`
///
/// A path with a directory part resolves when it names a file; running it is
/// left to the submit call, which reports a permission problem as an error.
/// Bare names are searched in `search_path` for an executable file.
pub fn resolve_tool_in(tool: &Path, search_path: Option<&OsStr>) -> Option<PathBuf> {
    if tool.as_os_str().is_empty() {
        return None;
    }
    if tool.components().count() > 1 {
        if !tool.is_file() {
            return None;
        }
        if !is_executable(tool) {
            tracing::info!(tool = %tool.display(), "tool is not executable, using it anyway");
        }
        return Some(tool.to_path_buf());
    }
    std::env::split_paths(search_path?)
        .map(|dir| dir.join(tool))
        .find(|candidate| is_executable(candidate))
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;
