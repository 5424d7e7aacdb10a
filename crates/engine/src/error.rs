// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for a batch run

use qmap_adapters::QueueError;
use qmap_core::{CodecError, ConfigError, EntryPointError, WorkspaceError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that end a batch
///
/// Per-job failures never appear here: they surface as a `None` result.
#[derive(Debug, Error)]
pub enum MapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
    #[error("failed to generate worker script: {0}")]
    EntryPoint(#[from] EntryPointError),
    #[error("failed to write job input: {0}")]
    Codec(#[from] CodecError),
    #[error("failed to submit {job_name}: {source}")]
    Submit {
        job_name: String,
        #[source]
        source: QueueError,
    },
    #[error("interrupted; work area kept at {}", work_dir.display())]
    Interrupted { work_dir: PathBuf },
}
