// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batch orchestration
//!
//! [`Mapper`] runs one batch end to end: work area, job inputs, worker
//! script, submission, lifecycle, collection, and disposal. [`map`] is the
//! one-call form with backend detection and Ctrl-C handling.

use crate::backend::{Backend, BackendKind, SgeBackend};
use crate::collector::collect;
use crate::controller::{Controller, Policy};
use crate::error::MapError;
use qmap_adapters::{QueueAdapter, SubmitAdapter, SubmitRequest};
use qmap_core::session::WORKER_SCRIPT_NAME;
use qmap_core::{
    codec, render_worker_script, ConfigError, Disposition, FunctionRef, IdGen, MapConfig, Session,
    TimestampIdGen, WorkArea,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Outcome of one batch
#[derive(Debug)]
pub struct MapReport<O> {
    pub session_id: String,
    pub backend: BackendKind,
    /// One slot per input, `None` where no result was produced
    pub results: Vec<Option<O>>,
    /// Jobs abandoned after exhausting their resubmissions
    pub lost: Vec<usize>,
    /// Jobs without a readable result, lost ones included
    pub missing: Vec<usize>,
    /// Set when the work area was kept for inspection
    pub retained_work_dir: Option<PathBuf>,
}

/// Batch runner with injectable backend, id generator, and interrupt
pub struct Mapper<Q, I = TimestampIdGen> {
    config: MapConfig,
    backend: Backend<Q>,
    id_gen: I,
    interrupt: CancellationToken,
}

impl Mapper<SgeBackend> {
    /// Mapper on the batch engine if available, direct execution otherwise
    pub fn detect(config: MapConfig) -> Self {
        let backend = Backend::detect(&config);
        Self::new(config, backend)
    }
}

impl<Q: QueueAdapter> Mapper<Q> {
    pub fn new(config: MapConfig, backend: Backend<Q>) -> Self {
        Self {
            config,
            backend,
            id_gen: TimestampIdGen,
            interrupt: CancellationToken::new(),
        }
    }
}

impl<Q: QueueAdapter, I: IdGen> Mapper<Q, I> {
    pub fn with_id_gen<J: IdGen>(self, id_gen: J) -> Mapper<Q, J> {
        Mapper {
            config: self.config,
            backend: self.backend,
            id_gen,
            interrupt: self.interrupt,
        }
    }

    /// Token that aborts the batch when cancelled
    pub fn with_interrupt(mut self, interrupt: CancellationToken) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn backend(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Run `function` over `jobs`
    ///
    /// On success the work area is removed unless retention was requested or
    /// a job wrote to stderr. On error it is left in place.
    pub async fn run<In, Out>(
        &self,
        function: &FunctionRef,
        jobs: &[In],
    ) -> Result<MapReport<Out>, MapError>
    where
        In: Serialize,
        Out: DeserializeOwned,
    {
        let config = &self.config;
        config.validate()?;

        let session_id = self.id_gen.next();
        let area = WorkArea::create(&config.work_dir_for(&session_id))?;
        let session = Session::new(session_id, area.path(), jobs.len());

        progress!(
            config.verbose,
            session = %session.id(),
            jobs = jobs.len(),
            backend = %self.backend.kind(),
            work_dir = %area.path().display(),
            "starting batch"
        );

        for (job, input) in session.jobs().zip(jobs) {
            codec::write_blob(&job.input, input)?;
        }

        let worker_exe = match &config.worker_exe {
            Some(path) => path.clone(),
            None => std::env::current_exe().map_err(|e| {
                ConfigError::Invalid(format!("cannot determine worker executable: {}", e))
            })?,
        };
        let script = render_worker_script(function, &worker_exe, &config.environment)?;
        area.write_script(WORKER_SCRIPT_NAME, &script)?;

        let requests = self.requests(&session);
        let lost = match &self.backend {
            Backend::Queued(queue) => self.run_queued(queue, &session, requests).await?,
            Backend::Direct(direct) => {
                self.run_direct(direct, &session, &requests).await?;
                Vec::new()
            }
        };

        let collection = collect::<Out>(&session);
        let retain = config.keep_work_dir || collection.has_stderr();
        let retained_work_dir = match area.dispose(retain)? {
            Disposition::Removed => None,
            Disposition::Retained(path) => Some(path),
        };

        progress!(
            config.verbose,
            session = %session.id(),
            completed = jobs.len().saturating_sub(collection.missing.len()),
            missing = collection.missing.len(),
            lost = lost.len(),
            "batch finished"
        );

        Ok(MapReport {
            session_id: session.id().to_string(),
            backend: self.backend.kind(),
            results: collection.results,
            lost,
            missing: collection.missing,
            retained_work_dir,
        })
    }

    fn requests(&self, session: &Session) -> Vec<SubmitRequest> {
        session
            .jobs()
            .map(|job| SubmitRequest {
                interpreter: self.config.interpreter_path.clone(),
                script: session.script_path(),
                args: vec![job.input.to_string_lossy().into_owned()],
                job_name: session.job_name(job.index).to_string(),
                stdout_path: job.stdout,
                stderr_path: job.stderr,
                queue_name: self.config.queue_name.clone(),
            })
            .collect()
    }

    async fn run_queued(
        &self,
        queue: &Q,
        session: &Session,
        requests: Vec<SubmitRequest>,
    ) -> Result<Vec<usize>, MapError> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }
        let controller = Controller::new(
            queue.clone(),
            session.clone(),
            Policy::from_config(&self.config),
            self.interrupt.clone(),
            requests,
        );
        controller.submit_all().await?;
        let settlement = controller.run().await?;
        Ok(settlement.lost.into_iter().collect())
    }

    async fn run_direct<S: SubmitAdapter>(
        &self,
        direct: &S,
        session: &Session,
        requests: &[SubmitRequest],
    ) -> Result<(), MapError> {
        for request in requests {
            if self.interrupt.is_cancelled() {
                return Err(MapError::Interrupted {
                    work_dir: session.work_dir().to_path_buf(),
                });
            }
            direct
                .submit(request)
                .await
                .map_err(|source| MapError::Submit {
                    job_name: request.job_name.clone(),
                    source,
                })?;
            progress!(self.config.verbose, job_name = %request.job_name, "job finished");
        }
        Ok(())
    }
}

/// Run `function` over `jobs` and return one result slot per input
///
/// Uses the batch engine when its submit tool is available and runs the jobs
/// one after another on this host otherwise. Ctrl-C aborts the batch and keeps
/// the work area.
pub async fn map<In, Out>(
    function: &FunctionRef,
    jobs: &[In],
    config: &MapConfig,
) -> Result<Vec<Option<Out>>, MapError>
where
    In: Serialize,
    Out: DeserializeOwned,
{
    let interrupt = CancellationToken::new();
    let watcher = tokio::spawn({
        let interrupt = interrupt.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("received Ctrl-C, stopping batch");
                interrupt.cancel();
            }
        }
    });

    let result = Mapper::detect(config.clone())
        .with_interrupt(interrupt)
        .run(function, jobs)
        .await;
    watcher.abort();

    result.map(|report| report.results)
}

#[cfg(test)]
#[path = "map_tests.rs"]
mod tests;
