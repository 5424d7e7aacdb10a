// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! qmap-core: shared building blocks for mapping jobs onto a batch queue
//!
//! This crate provides:
//! - The job blob codec and the worker protocol (function registry)
//! - Worker entry-point script generation
//! - Session identity, per-job file layout, and the work area
//! - Pure queue-state classification and the resubmission ledger
//! - Batch configuration

pub mod codec;
pub mod config;
pub mod entrypoint;
pub mod id;
pub mod registry;
pub mod session;
pub mod shell;
pub mod state;
pub mod workspace;

pub use codec::CodecError;
pub use config::{ConfigError, MapConfig};
pub use entrypoint::{capture_environment, render_worker_script, EntryPointError};
pub use id::{IdGen, SequentialIdGen, TimestampIdGen};
pub use registry::{run_job, FunctionRef, Registry, WorkerError, WORKER_PROTOCOL_VERSION};
pub use session::{JobName, JobPaths, Session};
pub use state::{
    Bucket, ErrorAction, JobRecord, ObservedJob, Poll, QueueStatus, ResubmissionLedger,
};
pub use workspace::{Disposition, WorkArea, WorkspaceError};
