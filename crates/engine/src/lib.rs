// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! qmap execution engine: submits a batch, drives it to completion, and
//! collects the results

/// Progress line at `info` when verbose, `debug` otherwise
macro_rules! progress {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!($($arg)+)
        } else {
            tracing::debug!($($arg)+)
        }
    };
}

mod backend;
mod collector;
mod controller;
mod error;
mod map;

pub use backend::{resolve_tool, resolve_tool_in, Backend, BackendKind, SgeBackend};
pub use collector::{collect, Collection};
pub use controller::{Controller, Policy, Settlement};
pub use error::MapError;
pub use map::{map, MapReport, Mapper};
