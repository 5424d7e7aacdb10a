// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `qmap worker` - run one job

use crate::demo;
use anyhow::Result;
use clap::Args;
use qmap_core::{run_job, FunctionRef};
use std::path::PathBuf;

#[derive(Args)]
pub struct WorkerArgs {
    /// Protocol version the calling script speaks
    #[arg(long)]
    pub protocol: u32,
    /// Function to call, as module::function
    pub function: FunctionRef,
    /// Job input blob; the result goes to <path>.out
    pub path: PathBuf,
}

pub fn worker(args: WorkerArgs) -> Result<()> {
    run_job(&demo::registry(), args.protocol, &args.function, &args.path)?;
    Ok(())
}
