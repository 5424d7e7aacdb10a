// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Simulated batch engine for testing
//!
//! Every submitted job is pending until the first status query, running
//! until the second, and then finishes: the completion hook runs and the job
//! disappears from the queue. Jobs scheduled to fail sit in `Eqw` until
//! cancelled.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{JobRecord, QueueAdapter, QueueError, QueueStatus, SubmitAdapter, SubmitRequest};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Called with the original request when a simulated job finishes
pub type CompletionHook = Arc<dyn Fn(&SubmitRequest) + Send + Sync>;

/// Recorded queue call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueCall {
    Submit { job_name: String },
    Status,
    Cancel { job_number: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pending,
    Running,
    Error,
}

/// A job currently held by the fake engine
#[derive(Debug, Clone)]
pub struct FakeJob {
    pub job_number: String,
    pub request: SubmitRequest,
    phase: Phase,
}

impl FakeJob {
    pub fn state(&self) -> &'static str {
        match self.phase {
            Phase::Pending => "qw",
            Phase::Running => "r",
            Phase::Error => "Eqw",
        }
    }
}

#[derive(Default)]
struct FakeQueueState {
    jobs: Vec<FakeJob>,
    next_number: u64,
    /// Remaining submissions per job name that land in the error state
    errors: HashMap<String, u32>,
    /// Remaining rejected submissions per job name
    rejections: HashMap<String, u32>,
    status_failures: u32,
    cancel_failures: u32,
    foreign: Vec<JobRecord>,
    calls: Vec<QueueCall>,
}

/// Fake queue adapter for testing
#[derive(Clone, Default)]
pub struct FakeQueueAdapter {
    state: Arc<Mutex<FakeQueueState>>,
    on_complete: Option<CompletionHook>,
}

impl fmt::Debug for FakeQueueAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeQueueAdapter")
            .field("jobs", &self.jobs().len())
            .finish()
    }
}

impl FakeQueueAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `hook` whenever a simulated job finishes
    pub fn on_complete(mut self, hook: impl Fn(&SubmitRequest) + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Arc::new(hook));
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeQueueState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Next `times` submissions of `job_name` land in the error state
    pub fn fail_job(&self, job_name: &str, times: u32) {
        self.lock().errors.insert(job_name.to_string(), times);
    }

    /// Next `times` submissions of `job_name` are rejected by the engine
    pub fn reject_submission(&self, job_name: &str, times: u32) {
        self.lock().rejections.insert(job_name.to_string(), times);
    }

    /// Next `times` status queries fail
    pub fn fail_status(&self, times: u32) {
        self.lock().status_failures = times;
    }

    /// Next `times` cancels fail
    pub fn fail_cancel(&self, times: u32) {
        self.lock().cancel_failures = times;
    }

    /// Report a job that belongs to someone else on every status query
    pub fn add_foreign_job(&self, record: JobRecord) {
        self.lock().foreign.push(record);
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<QueueCall> {
        self.lock().calls.clone()
    }

    /// Jobs still held by the engine
    pub fn jobs(&self) -> Vec<FakeJob> {
        self.lock().jobs.clone()
    }

    /// Number of accepted or rejected submissions of `job_name`
    pub fn submissions_of(&self, job_name: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, QueueCall::Submit { job_name: n } if n == job_name))
            .count()
    }
}

#[async_trait]
impl SubmitAdapter for FakeQueueAdapter {
    async fn submit(&self, request: &SubmitRequest) -> Result<(), QueueError> {
        let mut state = self.lock();
        state.calls.push(QueueCall::Submit {
            job_name: request.job_name.clone(),
        });

        if let Some(remaining) = state.rejections.get_mut(&request.job_name) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(QueueError::SubmitFailed {
                    code: Some(1),
                    output: format!("Unable to run job {}", request.job_name),
                });
            }
        }

        let phase = match state.errors.get_mut(&request.job_name) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Phase::Error
            }
            _ => Phase::Pending,
        };

        state.next_number += 1;
        let job_number = state.next_number.to_string();
        state.jobs.push(FakeJob {
            job_number,
            request: request.clone(),
            phase,
        });
        Ok(())
    }
}

#[async_trait]
impl QueueAdapter for FakeQueueAdapter {
    async fn status(&self) -> Result<QueueStatus, QueueError> {
        let finished = {
            let mut state = self.lock();
            state.calls.push(QueueCall::Status);

            if state.status_failures > 0 {
                state.status_failures -= 1;
                return Err(QueueError::QueryFailed("qmaster unreachable".to_string()));
            }

            let mut finished = Vec::new();
            let mut remaining = Vec::with_capacity(state.jobs.len());
            for mut job in std::mem::take(&mut state.jobs) {
                match job.phase {
                    Phase::Pending => {
                        job.phase = Phase::Running;
                        remaining.push(job);
                    }
                    Phase::Running => finished.push(job.request),
                    Phase::Error => remaining.push(job),
                }
            }
            state.jobs = remaining;
            finished
        };

        // Hooks may block; run them outside the lock
        if let Some(hook) = &self.on_complete {
            for request in &finished {
                hook(request);
            }
        }

        let state = self.lock();
        let mut status = QueueStatus::default();
        for job in &state.jobs {
            let record = JobRecord {
                name: job.request.job_name.clone(),
                job_number: job.job_number.clone(),
                state: job.state().to_string(),
            };
            match job.phase {
                Phase::Running => status.running.push(record),
                Phase::Pending | Phase::Error => status.pending.push(record),
            }
        }
        status.running.extend(state.foreign.iter().cloned());
        Ok(status)
    }

    async fn cancel(&self, job_number: &str) -> Result<(), QueueError> {
        let mut state = self.lock();
        state.calls.push(QueueCall::Cancel {
            job_number: job_number.to_string(),
        });

        if state.cancel_failures > 0 {
            state.cancel_failures -= 1;
            return Err(QueueError::CancelFailed("communication error".to_string()));
        }

        let before = state.jobs.len();
        state.jobs.retain(|job| job.job_number != job_number);
        if state.jobs.len() == before {
            return Err(QueueError::NotFound(job_number.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
