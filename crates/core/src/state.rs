// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queue state classification and the resubmission ledger
//!
//! Pure logic behind the lifecycle controller. A [`QueueStatus`] is what the
//! external engine reports on one poll; [`Poll::partition`] turns it into this
//! session's running / pending / error buckets; [`ResubmissionLedger`] decides
//! whether an errored job is resubmitted or abandoned.

use crate::codec::CodecError;
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Letters the engine uses in job state codes (`qw`, `r`, `Eqw`, `hRwq`, ...)
pub const KNOWN_STATE_LETTERS: &str = "dEhqrRsStTw";

/// One job as reported by the engine's status query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub name: String,
    pub job_number: String,
    pub state: String,
}

/// Everything the engine reports on one status query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueStatus {
    pub running: Vec<JobRecord>,
    pub pending: Vec<JobRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Running,
    Pending,
    Error,
}

/// Bucket for a job the engine reported in `reported` with state `state`
///
/// A state containing the error indicator is an error regardless of where it
/// was reported. Anything else stays where the engine put it.
pub fn classify(reported: Bucket, state: &str, error_indicator: &str) -> Bucket {
    if state.contains(error_indicator) {
        Bucket::Error
    } else {
        reported
    }
}

/// True when every letter of `state` belongs to the known alphabet
pub fn is_known_state(state: &str) -> bool {
    !state.is_empty() && state.chars().all(|c| KNOWN_STATE_LETTERS.contains(c))
}

/// A job of this session seen on one poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedJob {
    pub index: usize,
    pub job_number: String,
    pub state: String,
}

/// This session's jobs on one poll, after reclassification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Poll {
    pub running: Vec<ObservedJob>,
    pub pending: Vec<ObservedJob>,
    pub error: Vec<ObservedJob>,
    /// State codes outside [`KNOWN_STATE_LETTERS`], kept in their reported bucket
    pub unrecognized: Vec<String>,
}

impl Poll {
    pub fn partition(status: &QueueStatus, session: &Session, error_indicator: &str) -> Self {
        let mut poll = Poll::default();
        let reported = status
            .running
            .iter()
            .map(|r| (Bucket::Running, r))
            .chain(status.pending.iter().map(|r| (Bucket::Pending, r)));

        for (bucket, record) in reported {
            let Some(index) = session.owns(&record.name) else {
                continue;
            };
            if !is_known_state(&record.state) {
                poll.unrecognized.push(record.state.clone());
            }
            let job = ObservedJob {
                index,
                job_number: record.job_number.clone(),
                state: record.state.clone(),
            };
            match classify(bucket, &record.state, error_indicator) {
                Bucket::Running => poll.running.push(job),
                Bucket::Pending => poll.pending.push(job),
                Bucket::Error => poll.error.push(job),
            }
        }

        poll
    }

    /// Nothing of this session is running or pending
    pub fn is_settled(&self) -> bool {
        self.running.is_empty() && self.pending.is_empty()
    }
}

/// What to do with a job observed in an error state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorAction {
    /// Cancel and resubmit; `count` is the ledger value after this observation
    Resubmit { count: u32 },
    /// Cancel and give up; the job is lost
    Abandon { count: u32 },
}

/// Resubmission count per job index
///
/// An entry appears on the first error observation with a count of 0; every
/// further observation adds one. The count never exceeds the maximum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResubmissionLedger {
    counts: BTreeMap<usize, u32>,
}

impl ResubmissionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error observation for `index` and decide what to do
    pub fn on_error(&mut self, index: usize, max_num_resubmissions: u32) -> ErrorAction {
        let count = match self.counts.get_mut(&index) {
            None => {
                self.counts.insert(index, 0);
                0
            }
            Some(count) => {
                if *count < max_num_resubmissions {
                    *count += 1;
                }
                *count
            }
        };

        if count < max_num_resubmissions {
            ErrorAction::Resubmit { count }
        } else {
            ErrorAction::Abandon { count }
        }
    }

    pub fn count(&self, index: usize) -> Option<u32> {
        self.counts.get(&index).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.counts.iter().map(|(index, count)| (*index, *count))
    }

    /// Write the ledger as a JSON object of index → count
    pub fn save(&self, path: &Path) -> Result<(), CodecError> {
        let json = serde_json::to_string_pretty(self).map_err(CodecError::Encode)?;
        fs::write(path, json).map_err(|source| CodecError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, CodecError> {
        crate::codec::read_blob(path)
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
