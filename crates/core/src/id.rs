// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session id generation

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generates session identifiers
///
/// Ids are embedded in job names, so they must stay within `[0-9A-Za-z_-]`.
pub trait IdGen: Clone + Send + Sync {
    fn next(&self) -> String;
}

/// Wall-clock id with microsecond resolution, e.g. `20260314092653123456`
#[derive(Clone, Default)]
pub struct TimestampIdGen;

impl IdGen for TimestampIdGen {
    fn next(&self) -> String {
        chrono::Utc::now().format("%Y%m%d%H%M%S%6f").to_string()
    }
}

/// Sequential ID generator for testing
#[derive(Clone)]
pub struct SequentialIdGen {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new("session")
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}{}", self.prefix, n)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
