// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `qmap script` - print a worker script

use anyhow::{Context, Result};
use clap::Args;
use qmap_core::{capture_environment, render_worker_script, FunctionRef};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Args)]
pub struct ScriptArgs {
    /// Function the script runs, as module::function
    #[arg(long)]
    pub function: FunctionRef,
    /// Worker binary (default: this executable)
    #[arg(long)]
    pub worker_exe: Option<PathBuf>,
    /// Leave the current environment out of the script
    #[arg(long)]
    pub no_env: bool,
}

pub fn script(args: ScriptArgs) -> Result<()> {
    let worker_exe = match args.worker_exe {
        Some(path) => path,
        None => std::env::current_exe().context("cannot determine worker executable")?,
    };
    let environment = if args.no_env {
        BTreeMap::new()
    } else {
        capture_environment()
    };

    print!(
        "{}",
        render_worker_script(&args.function, &worker_exe, &environment)?
    );
    Ok(())
}
