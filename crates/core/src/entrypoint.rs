// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker entry-point generation
//!
//! Every job of a batch is started through one shared `sh` script. The script
//! re-establishes the environment captured on the submitting side (execution
//! hosts do not reliably inherit it, even when the queue is asked to export
//! it) and then hands the job path to the worker command.

use crate::registry::{FunctionRef, WORKER_PROTOCOL_VERSION};
use crate::shell;
use minijinja::{context, Environment};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

const WORKER_SCRIPT_TEMPLATE: &str = r#"#!/bin/sh
# Generated by qmap. Do not modify.
# worker protocol {{ protocol }}
if [ "$#" -ne 1 ]; then
    echo "usage: $0 <job-path>" >&2
    exit 2
fi
exec env \
{% for assignment in environment %}    {{ assignment | sh }} \
{% endfor %}    {{ worker_exe | sh }} worker --protocol {{ protocol }} {{ function | sh }} "$1"
"#;

#[derive(Debug, Error)]
pub enum EntryPointError {
    #[error("environment variable {key:?} cannot be exported: {reason}")]
    InvalidVariable { key: String, reason: &'static str },
    #[error("worker executable path is not valid UTF-8: {0}")]
    NonUtf8Path(String),
    /// `env` would read the path as another `NAME=value` assignment
    #[error("worker executable path contains '=': {0}")]
    AssignmentLikePath(String),
    #[error("template error: {0}")]
    Template(String),
}

impl From<minijinja::Error> for EntryPointError {
    fn from(err: minijinja::Error) -> Self {
        EntryPointError::Template(err.to_string())
    }
}

/// Snapshot the current process environment
///
/// Variables whose name or value is not valid UTF-8 are skipped.
pub fn capture_environment() -> BTreeMap<String, String> {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

fn check_variable(key: &str, value: &str) -> Result<(), EntryPointError> {
    let reason = if key.is_empty() {
        Some("empty name")
    } else if key.contains('=') {
        Some("name contains '='")
    } else if key.starts_with('-') {
        Some("name starts with '-'")
    } else if key.contains('\0') || value.contains('\0') {
        Some("contains a NUL byte")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(EntryPointError::InvalidVariable {
            key: key.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Render the worker script for `function`
///
/// The output depends only on the arguments: the same inputs always produce
/// byte-identical scripts.
pub fn render_worker_script(
    function: &FunctionRef,
    worker_exe: &Path,
    environment: &BTreeMap<String, String>,
) -> Result<String, EntryPointError> {
    let worker_exe = worker_exe
        .to_str()
        .ok_or_else(|| EntryPointError::NonUtf8Path(worker_exe.display().to_string()))?;
    if worker_exe.contains('=') {
        return Err(EntryPointError::AssignmentLikePath(worker_exe.to_string()));
    }

    let mut assignments = Vec::with_capacity(environment.len());
    for (key, value) in environment {
        check_variable(key, value)?;
        assignments.push(format!("{}={}", key, value));
    }

    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.add_filter("sh", |value: String| shell::quote(&value));
    env.add_template("worker.sh", WORKER_SCRIPT_TEMPLATE)?;

    let script = env.get_template("worker.sh")?.render(context! {
        protocol => WORKER_PROTOCOL_VERSION,
        environment => assignments,
        worker_exe => worker_exe,
        function => function.to_string(),
    })?;

    tracing::debug!(
        function = %function,
        variables = environment.len(),
        bytes = script.len(),
        "rendered worker script"
    );

    Ok(script)
}

#[cfg(test)]
#[path = "entrypoint_tests.rs"]
mod tests;
