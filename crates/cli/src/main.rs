// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! qmap - map jobs onto a batch queue

mod commands;
mod demo;
mod shutdown;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{functions, run, script, worker};

#[derive(Parser)]
#[command(
    name = "qmap",
    version,
    about = "qmap - Map functions over job lists on a Sun Grid Engine style batch queue"
)]
struct Cli {
    /// Log progress at info level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map a function over a JSON array of inputs
    Run(run::RunArgs),
    /// Run one job (invoked by the generated worker script)
    Worker(worker::WorkerArgs),
    /// Print the worker script for a function
    Script(script::ScriptArgs),
    /// List the built-in functions
    Functions,
}

fn setup_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Anything a worker writes to stderr marks the batch for inspection, so
    // the worker runs without a subscriber
    if let Commands::Worker(args) = cli.command {
        return worker::worker(args);
    }

    setup_logging(cli.verbose);

    match cli.command {
        Commands::Run(args) => run::run(args, cli.verbose).await?,
        Commands::Script(args) => script::script(args)?,
        Commands::Functions => functions::functions(),
        Commands::Worker(_) => {}
    }

    Ok(())
}
