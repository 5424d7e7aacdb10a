// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `qmap run` - map a function over a job file

use crate::{demo, shutdown};
use anyhow::{Context, Result};
use clap::Args;
use qmap_core::{capture_environment, FunctionRef, MapConfig};
use qmap_engine::{MapReport, Mapper};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args)]
pub struct RunArgs {
    /// Function to map, as module::function
    #[arg(long)]
    pub function: FunctionRef,
    /// JSON file holding an array of job inputs
    #[arg(long)]
    pub jobs: PathBuf,
    /// TOML configuration file; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Queue to submit to
    #[arg(long)]
    pub queue: Option<String>,
    /// Work area directory (default: ./.qmap_<session>)
    #[arg(long)]
    pub work_dir: Option<PathBuf>,
    /// Keep the work area after a successful run
    #[arg(long)]
    pub keep_work_dir: bool,
    /// Time between status queries (e.g. 5s, 500ms)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub poll_interval: Option<Duration>,
    /// Resubmissions allowed per job before it is abandoned
    #[arg(long)]
    pub max_resubmissions: Option<u32>,
    /// Interpreter the worker script is started with
    #[arg(long)]
    pub interpreter: Option<PathBuf>,
    /// Worker binary (default: this executable)
    #[arg(long)]
    pub worker_exe: Option<PathBuf>,
    #[arg(long)]
    pub qsub_path: Option<PathBuf>,
    #[arg(long)]
    pub qstat_path: Option<PathBuf>,
    #[arg(long)]
    pub qdel_path: Option<PathBuf>,
}

impl RunArgs {
    /// Config file (or defaults) with flag overrides applied
    pub fn to_config(&self, verbose: bool) -> Result<MapConfig> {
        let mut config = match &self.config {
            Some(path) => MapConfig::load(path)?,
            None => MapConfig::default(),
        };

        if let Some(queue) = &self.queue {
            config.queue_name = Some(queue.clone());
        }
        if let Some(work_dir) = &self.work_dir {
            config.work_dir = Some(work_dir.clone());
        }
        if let Some(poll_interval) = self.poll_interval {
            config.poll_interval = poll_interval;
        }
        if let Some(max) = self.max_resubmissions {
            config.max_num_resubmissions = max;
        }
        if let Some(interpreter) = &self.interpreter {
            config.interpreter_path = interpreter.clone();
        }
        if let Some(worker_exe) = &self.worker_exe {
            config.worker_exe = Some(worker_exe.clone());
        }
        if let Some(qsub) = &self.qsub_path {
            config.qsub_path = qsub.clone();
        }
        if let Some(qstat) = &self.qstat_path {
            config.qstat_path = qstat.clone();
        }
        if let Some(qdel) = &self.qdel_path {
            config.qdel_path = qdel.clone();
        }
        config.keep_work_dir |= self.keep_work_dir;
        config.verbose |= verbose;

        if config.environment.is_empty() {
            config.environment = capture_environment();
        }

        config.validate()?;
        Ok(config)
    }
}

pub async fn run(args: RunArgs, verbose: bool) -> Result<()> {
    let config = args.to_config(verbose)?;

    if config.worker_exe.is_none() && !demo::registry().contains(&args.function) {
        anyhow::bail!("unknown function: {}", args.function);
    }

    let content = std::fs::read_to_string(&args.jobs)
        .with_context(|| format!("failed to read jobs from {}", args.jobs.display()))?;
    let jobs: Vec<Value> = serde_json::from_str(&content)
        .with_context(|| format!("{} must hold a JSON array", args.jobs.display()))?;

    let mapper = Mapper::detect(config).with_interrupt(shutdown::install_shutdown_handler());
    let report: MapReport<Value> = mapper.run(&args.function, &jobs).await?;

    if !report.lost.is_empty() {
        tracing::warn!(lost = ?report.lost, "some jobs were abandoned");
    }
    if let Some(dir) = &report.retained_work_dir {
        tracing::warn!(work_dir = %dir.display(), "work area kept");
    }

    println!("{}", serde_json::to_string_pretty(&report.results)?);
    Ok(())
}
