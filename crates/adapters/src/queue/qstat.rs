// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parser for `qstat -r` output
//!
//! ```text
//! job-ID  prior   name       user   state submit/start at     queue         slots
//! ---------------------------------------------------------------------------------
//!     101 0.55500 q202603141 alice  r     03/14/2026 09:26:53 all.q@node01  1
//!        Full jobname:     q20260314092653123456.000000000
//!        Master Queue:     all.q@node01
//!     102 0.00000 q202603141 alice  qw    03/14/2026 09:26:50               1
//!        Full jobname:     q20260314092653123456.000000001
//! ```
//!
//! A job row starts with a numeric job id. Rows bound to a queue instance
//! (`queue@host`) are running; the rest are pending. The name column is
//! truncated, so a following `Full jobname:` line replaces it.

use super::{JobRecord, QueueStatus};

const FULL_JOBNAME: &str = "Full jobname:";

struct Row {
    record: JobRecord,
    running: bool,
}

fn parse_row(line: &str) -> Option<Row> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [number, _prior, name, _user, state, rest @ ..] = fields.as_slice() else {
        return None;
    };
    if !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(Row {
        record: JobRecord {
            name: name.to_string(),
            job_number: number.to_string(),
            state: state.to_string(),
        },
        running: rest.iter().any(|field| field.contains('@')),
    })
}

/// Parse the text table printed by `qstat -r`
pub fn parse_status(output: &str) -> QueueStatus {
    let mut rows: Vec<Row> = Vec::new();

    for line in output.lines() {
        let trimmed = line.trim();
        if let Some(full) = trimmed.strip_prefix(FULL_JOBNAME) {
            if let Some(row) = rows.last_mut() {
                row.record.name = full.trim().to_string();
            }
            continue;
        }
        if let Some(row) = parse_row(trimmed) {
            rows.push(row);
        }
    }

    let mut status = QueueStatus::default();
    for row in rows {
        if row.running {
            status.running.push(row.record);
        } else {
            status.pending.push(row.record);
        }
    }
    status
}

#[cfg(test)]
#[path = "qstat_tests.rs"]
mod tests;
