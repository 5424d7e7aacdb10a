// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: the batch engine and direct local execution

pub mod direct;
pub mod queue;
pub mod traced;

pub use direct::DirectAdapter;
pub use queue::{
    parse_status, JobRecord, QueueAdapter, QueueError, QueueStatus, SgeAdapter, SubmitAdapter,
    SubmitRequest,
};
pub use traced::TracedQueueAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use queue::{CompletionHook, FakeJob, FakeQueueAdapter, QueueCall};
