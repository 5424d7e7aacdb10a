// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::queue::{QueueAdapter, QueueError, QueueStatus, SubmitAdapter, SubmitRequest};
use async_trait::async_trait;
use tracing::Instrument;

/// Wrapper that adds tracing to any QueueAdapter
#[derive(Clone)]
pub struct TracedQueueAdapter<Q> {
    inner: Q,
}

impl<Q> TracedQueueAdapter<Q> {
    pub fn new(inner: Q) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &Q {
        &self.inner
    }
}

#[async_trait]
impl<Q: SubmitAdapter> SubmitAdapter for TracedQueueAdapter<Q> {
    async fn submit(&self, request: &SubmitRequest) -> Result<(), QueueError> {
        let span = tracing::info_span!("queue.submit", job_name = %request.job_name);

        async {
            tracing::info!(script = %request.script.display(), "starting");

            // Precondition: the worker script must exist
            if !request.script.exists() {
                tracing::error!("worker script does not exist");
                return Err(QueueError::ScriptNotFound(request.script.clone()));
            }

            let start = std::time::Instant::now();
            let result = self.inner.submit(request).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(()) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "job submitted"),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "submit failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }
}

#[async_trait]
impl<Q: QueueAdapter> QueueAdapter for TracedQueueAdapter<Q> {
    async fn status(&self) -> Result<QueueStatus, QueueError> {
        let span = tracing::info_span!("queue.status");

        async {
            let start = std::time::Instant::now();
            let result = self.inner.status().await;
            let elapsed = start.elapsed();

            match &result {
                Ok(status) => tracing::debug!(
                    running = status.running.len(),
                    pending = status.pending.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "queried"
                ),
                Err(e) => tracing::warn!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "status query failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn cancel(&self, job_number: &str) -> Result<(), QueueError> {
        let span = tracing::info_span!("queue.cancel", job_number);

        async {
            let result = self.inner.cancel(job_number).await;
            // NotFound is expected when the engine already dropped the job
            match &result {
                Ok(()) => tracing::info!("cancelled"),
                Err(QueueError::NotFound(_)) => tracing::info!("job already gone"),
                Err(e) => tracing::warn!(error = %e, "cancel failed"),
            }

            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
