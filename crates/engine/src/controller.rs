// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job lifecycle controller
//!
//! Drives a submitted batch on the external engine until nothing of it is
//! running or pending. Each cycle queries the engine, moves jobs whose state
//! carries the error indicator into the error bucket, cancels them, and either
//! resubmits them under the same name or abandons them once the resubmission
//! budget is spent.

use crate::error::MapError;
use qmap_adapters::{QueueAdapter, QueueError, QueueStatus, SubmitRequest};
use qmap_core::{ErrorAction, MapConfig, Poll, ResubmissionLedger, Session};
use std::collections::BTreeSet;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Knobs of the poll loop
#[derive(Debug, Clone)]
pub struct Policy {
    pub poll_interval: Duration,
    pub retry_backoff: Duration,
    pub max_num_resubmissions: u32,
    pub error_state_indicator: String,
    pub verbose: bool,
}

impl Policy {
    pub fn from_config(config: &MapConfig) -> Self {
        Self {
            poll_interval: config.poll_interval,
            retry_backoff: config.retry_backoff,
            max_num_resubmissions: config.max_num_resubmissions,
            error_state_indicator: config.error_state_indicator.clone(),
            verbose: config.verbose,
        }
    }
}

/// Outcome of a settled batch
#[derive(Debug, Clone, Default)]
pub struct Settlement {
    pub cycles: u64,
    /// Jobs abandoned after an error
    pub lost: BTreeSet<usize>,
    pub ledger: ResubmissionLedger,
}

pub struct Controller<Q> {
    queue: Q,
    session: Session,
    policy: Policy,
    interrupt: CancellationToken,
    /// Original request per job index, reused on resubmission
    requests: Vec<SubmitRequest>,
}

impl<Q: QueueAdapter> Controller<Q> {
    pub fn new(
        queue: Q,
        session: Session,
        policy: Policy,
        interrupt: CancellationToken,
        requests: Vec<SubmitRequest>,
    ) -> Self {
        Self {
            queue,
            session,
            policy,
            interrupt,
            requests,
        }
    }

    fn interrupted(&self) -> MapError {
        MapError::Interrupted {
            work_dir: self.session.work_dir().to_path_buf(),
        }
    }

    /// Submit every job once; the first failure ends the batch
    pub async fn submit_all(&self) -> Result<(), MapError> {
        for request in &self.requests {
            if self.interrupt.is_cancelled() {
                return Err(self.interrupted());
            }
            self.queue
                .submit(request)
                .await
                .map_err(|source| MapError::Submit {
                    job_name: request.job_name.clone(),
                    source,
                })?;
        }
        progress!(
            self.policy.verbose,
            session = %self.session.id(),
            jobs = self.requests.len(),
            "submitted"
        );
        Ok(())
    }

    /// Poll until settled
    pub async fn run(&self) -> Result<Settlement, MapError> {
        let mut settlement = Settlement::default();

        loop {
            if self.interrupt.is_cancelled() {
                return Err(self.interrupted());
            }
            settlement.cycles += 1;

            let status = self.query().await?;
            let poll = Poll::partition(&status, &self.session, &self.policy.error_state_indicator);
            if !poll.unrecognized.is_empty() {
                tracing::warn!(states = ?poll.unrecognized, "unrecognized job state codes");
            }

            let resubmitted = self.handle_errors(&poll, &mut settlement).await?;

            if !poll.error.is_empty() {
                settlement.ledger.save(&self.session.ledger_path())?;
            }

            progress!(
                self.policy.verbose,
                session = %self.session.id(),
                cycle = settlement.cycles,
                running = poll.running.len(),
                pending = poll.pending.len(),
                error = poll.error.len(),
                "poll"
            );

            // A resubmitted job is pending again even though this poll missed it
            if poll.is_settled() && resubmitted == 0 {
                break;
            }

            self.pause(self.policy.poll_interval).await?;
        }

        if !settlement.lost.is_empty() {
            tracing::warn!(
                session = %self.session.id(),
                lost = ?settlement.lost,
                "jobs abandoned"
            );
        }
        Ok(settlement)
    }

    /// Cancel every errored job and resubmit or abandon it; returns the
    /// number of jobs resubmitted
    async fn handle_errors(
        &self,
        poll: &Poll,
        settlement: &mut Settlement,
    ) -> Result<usize, MapError> {
        let mut resubmitted = 0;

        for job in &poll.error {
            let action = settlement
                .ledger
                .on_error(job.index, self.policy.max_num_resubmissions);
            self.cancel(&job.job_number).await?;

            let request = match (action, self.requests.get(job.index)) {
                (ErrorAction::Resubmit { count }, Some(request)) => {
                    tracing::info!(
                        index = job.index,
                        state = %job.state,
                        resubmissions = count,
                        "resubmitting errored job"
                    );
                    request
                }
                (ErrorAction::Abandon { count }, _) => {
                    tracing::warn!(
                        index = job.index,
                        state = %job.state,
                        resubmissions = count,
                        "resubmission budget exhausted, job lost"
                    );
                    settlement.lost.insert(job.index);
                    continue;
                }
                (ErrorAction::Resubmit { .. }, None) => {
                    settlement.lost.insert(job.index);
                    continue;
                }
            };

            match self.queue.submit(request).await {
                Ok(()) => resubmitted += 1,
                Err(e) => {
                    tracing::error!(index = job.index, error = %e, "resubmission failed, job lost");
                    settlement.lost.insert(job.index);
                }
            }
        }

        Ok(resubmitted)
    }

    /// Status query, retried until it succeeds or the batch is interrupted
    async fn query(&self) -> Result<QueueStatus, MapError> {
        loop {
            match self.queue.status().await {
                Ok(status) => return Ok(status),
                Err(e) => {
                    tracing::warn!(error = %e, "status query failed, retrying");
                    self.pause(self.policy.retry_backoff).await?;
                }
            }
        }
    }

    /// Cancel, retried until it succeeds, the job is gone, or the batch is
    /// interrupted
    async fn cancel(&self, job_number: &str) -> Result<(), MapError> {
        loop {
            match self.queue.cancel(job_number).await {
                Ok(()) => return Ok(()),
                Err(QueueError::NotFound(_)) => {
                    tracing::info!(job_number, "job already gone");
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(job_number, error = %e, "cancel failed, retrying");
                    self.pause(self.policy.retry_backoff).await?;
                }
            }
        }
    }

    async fn pause(&self, duration: Duration) -> Result<(), MapError> {
        tokio::select! {
            _ = tokio::time::sleep(duration) => Ok(()),
            _ = self.interrupt.cancelled() => Err(self.interrupted()),
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
