// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker protocol
//!
//! A worker is a binary that owns a [`Registry`] of named functions. It is
//! invoked with a function reference and the path of one job blob, and
//! performs decode → invoke → encode, writing the result next to the input.

use crate::codec::{self, CodecError};
use crate::session::output_path;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Version spoken by generated worker scripts and checked by workers
pub const WORKER_PROTOCOL_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("worker protocol mismatch: script speaks {requested}, worker speaks {supported}")]
    ProtocolMismatch { requested: u32, supported: u32 },
    #[error("unknown function: {0}")]
    UnknownFunction(FunctionRef),
    #[error("invalid function reference '{0}', expected module::function")]
    InvalidFunctionRef(String),
    #[error("{function} failed: {message}")]
    Failed {
        function: FunctionRef,
        message: String,
    },
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Reference to a registered function, written `module::function`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FunctionRef {
    pub module: String,
    pub name: String,
}

impl FunctionRef {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.module, self.name)
    }
}

impl FromStr for FunctionRef {
    type Err = WorkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once("::") {
            Some((module, name)) if !module.is_empty() && !name.is_empty() => {
                Ok(Self::new(module, name))
            }
            _ => Err(WorkerError::InvalidFunctionRef(s.to_string())),
        }
    }
}

enum Failure {
    Codec(CodecError),
    Function(String),
}

impl From<CodecError> for Failure {
    fn from(err: CodecError) -> Self {
        Failure::Codec(err)
    }
}

type Handler = Box<dyn Fn(&[u8]) -> Result<Vec<u8>, Failure> + Send + Sync>;

/// Lookup table from function reference to a type-erased handler
#[derive(Default)]
pub struct Registry {
    handlers: BTreeMap<FunctionRef, Handler>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `f` under `function`, replacing any previous entry
    pub fn register<I, O, F>(&mut self, function: FunctionRef, f: F) -> &mut Self
    where
        I: DeserializeOwned,
        O: Serialize,
        F: Fn(I) -> O + Send + Sync + 'static,
    {
        let handler: Handler = Box::new(move |blob: &[u8]| -> Result<Vec<u8>, Failure> {
            let input: I = codec::decode(blob)?;
            Ok(codec::encode(&f(input))?)
        });
        self.handlers.insert(function, handler);
        self
    }

    /// Register a function that can fail
    ///
    /// An `Err` is reported by the worker and no result is written.
    pub fn register_fallible<I, O, E, F>(&mut self, function: FunctionRef, f: F) -> &mut Self
    where
        I: DeserializeOwned,
        O: Serialize,
        E: fmt::Display,
        F: Fn(I) -> Result<O, E> + Send + Sync + 'static,
    {
        let handler: Handler = Box::new(move |blob: &[u8]| -> Result<Vec<u8>, Failure> {
            let input: I = codec::decode(blob)?;
            let output = f(input).map_err(|e| Failure::Function(e.to_string()))?;
            Ok(codec::encode(&output)?)
        });
        self.handlers.insert(function, handler);
        self
    }

    pub fn contains(&self, function: &FunctionRef) -> bool {
        self.handlers.contains_key(function)
    }

    /// Registered functions in sorted order
    pub fn functions(&self) -> impl Iterator<Item = &FunctionRef> {
        self.handlers.keys()
    }

    /// Decode `input`, call the function, and return the encoded result
    pub fn invoke(&self, function: &FunctionRef, input: &[u8]) -> Result<Vec<u8>, WorkerError> {
        let handler = self
            .handlers
            .get(function)
            .ok_or_else(|| WorkerError::UnknownFunction(function.clone()))?;
        handler(input).map_err(|failure| match failure {
            Failure::Codec(err) => WorkerError::Codec(err),
            Failure::Function(message) => WorkerError::Failed {
                function: function.clone(),
                message,
            },
        })
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("functions", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Run one job: the body of the `worker` command
///
/// Returns the path the result was written to.
pub fn run_job(
    registry: &Registry,
    protocol: u32,
    function: &FunctionRef,
    input: &Path,
) -> Result<PathBuf, WorkerError> {
    if protocol != WORKER_PROTOCOL_VERSION {
        return Err(WorkerError::ProtocolMismatch {
            requested: protocol,
            supported: WORKER_PROTOCOL_VERSION,
        });
    }

    let blob = fs::read(input).map_err(|source| CodecError::Io {
        path: input.to_path_buf(),
        source,
    })?;
    let result = registry.invoke(function, &blob)?;

    let output = output_path(input);
    fs::write(&output, result).map_err(|source| CodecError::Io {
        path: output.clone(),
        source,
    })?;

    Ok(output)
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
