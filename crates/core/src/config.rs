// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batch configuration
//!
//! [`MapConfig`] is a plain value: defaults come from `Default`, files are
//! TOML, and durations use humantime syntax (`5s`, `250ms`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    /// Queue to submit to; the engine default when unset
    pub queue_name: Option<String>,
    /// Interpreter the engine starts the worker script with
    pub interpreter_path: PathBuf,
    /// Binary that implements `worker`; the current executable when unset
    pub worker_exe: Option<PathBuf>,
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Pause before retrying a failed status query or cancel
    #[serde(with = "humantime_serde")]
    pub retry_backoff: Duration,
    pub verbose: bool,
    /// Work area location; `./.qmap_<session>` when unset
    pub work_dir: Option<PathBuf>,
    pub keep_work_dir: bool,
    pub max_num_resubmissions: u32,
    pub qsub_path: PathBuf,
    pub qstat_path: PathBuf,
    pub qdel_path: PathBuf,
    /// Substring of a state code that marks a job as failed
    pub error_state_indicator: String,
    /// Variables re-established on execution hosts
    pub environment: BTreeMap<String, String>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            queue_name: None,
            interpreter_path: PathBuf::from("/bin/sh"),
            worker_exe: None,
            poll_interval: Duration::from_secs(5),
            retry_backoff: Duration::from_secs(1),
            verbose: false,
            work_dir: None,
            keep_work_dir: false,
            max_num_resubmissions: 10,
            qsub_path: PathBuf::from("qsub"),
            qstat_path: PathBuf::from("qstat"),
            qdel_path: PathBuf::from("qdel"),
            error_state_indicator: "E".to_string(),
            environment: BTreeMap::new(),
        }
    }
}

impl MapConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.error_state_indicator.is_empty() {
            return Err(ConfigError::Invalid(
                "error_state_indicator must not be empty".to_string(),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "poll_interval must be greater than zero".to_string(),
            ));
        }
        if self.retry_backoff.is_zero() {
            return Err(ConfigError::Invalid(
                "retry_backoff must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Work area for `session_id`, honoring `work_dir`
    pub fn work_dir_for(&self, session_id: &str) -> PathBuf {
        self.work_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!(".qmap_{}", session_id)))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
