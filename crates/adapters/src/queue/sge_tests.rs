// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use tempfile::TempDir;

fn request(queue_name: Option<&str>) -> SubmitRequest {
    SubmitRequest {
        interpreter: PathBuf::from("/bin/sh"),
        script: PathBuf::from("/work/worker_node_script.sh"),
        args: vec!["/work/000000003.json".to_string()],
        job_name: "q1.000000003".to_string(),
        stdout_path: PathBuf::from("/work/000000003.json.o"),
        stderr_path: PathBuf::from("/work/000000003.json.e"),
        queue_name: queue_name.map(str::to_string),
    }
}

fn strings(args: Vec<OsString>) -> Vec<String> {
    args.into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

/// Write an executable stand-in for one of the engine tools
fn tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn submit_args_in_engine_order() {
    assert_eq!(
        strings(SgeAdapter::submit_args(&request(None))),
        vec![
            "-o",
            "/work/000000003.json.o",
            "-e",
            "/work/000000003.json.e",
            "-N",
            "q1.000000003",
            "-V",
            "-S",
            "/bin/sh",
            "/work/worker_node_script.sh",
            "/work/000000003.json",
        ]
    );
}

#[test]
fn submit_args_include_queue_after_export_flag() {
    let args = strings(SgeAdapter::submit_args(&request(Some("short.q"))));
    assert_eq!(&args[6..9], &["-V", "-q", "short.q"]);
}

#[tokio::test]
async fn submit_passes_arguments_to_tool() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("argv");
    let qsub = tool(
        dir.path(),
        "qsub",
        &format!("printf '%s\\n' \"$@\" > '{}'", log.display()),
    );
    let adapter = SgeAdapter::new(qsub, "qstat", "qdel");

    adapter.submit(&request(None)).await.unwrap();

    let argv = fs::read_to_string(log).unwrap();
    assert!(argv.starts_with("-o\n/work/000000003.json.o\n"));
    assert!(argv.ends_with("/work/000000003.json\n"));
}

#[tokio::test]
async fn submit_failure_carries_code_and_output() {
    let dir = TempDir::new().unwrap();
    let qsub = tool(dir.path(), "qsub", "echo 'Unable to run job'; echo 'denied' >&2; exit 3");
    let adapter = SgeAdapter::new(qsub, "qstat", "qdel");

    let err = adapter.submit(&request(None)).await.unwrap_err();

    match err {
        QueueError::SubmitFailed { code, output } => {
            assert_eq!(code, Some(3));
            assert!(output.contains("Unable to run job"));
            assert!(output.contains("denied"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn missing_tool_is_spawn_error() {
    let adapter = SgeAdapter::new("/nonexistent/qsub", "/nonexistent/qstat", "/nonexistent/qdel");
    assert!(matches!(
        adapter.status().await.unwrap_err(),
        QueueError::Spawn { .. }
    ));
}

#[tokio::test]
async fn status_parses_tool_output() {
    let dir = TempDir::new().unwrap();
    let qstat = tool(
        dir.path(),
        "qstat",
        "[ \"$1\" = -r ] || exit 9\n\
         echo '    5 0.5 q1.00000 me r 01/01/2026 00:00:00 all.q@h 1'\n\
         echo '       Full jobname:     q1.000000000'",
    );
    let adapter = SgeAdapter::new("qsub", qstat, "qdel");

    let status = adapter.status().await.unwrap();

    assert_eq!(status.running.len(), 1);
    assert_eq!(status.running[0].name, "q1.000000000");
    assert_eq!(status.running[0].job_number, "5");
}

#[tokio::test]
async fn status_failure_is_query_failed() {
    let dir = TempDir::new().unwrap();
    let qstat = tool(dir.path(), "qstat", "echo 'cannot reach qmaster' >&2; exit 1");
    let adapter = SgeAdapter::new("qsub", qstat, "qdel");

    let err = adapter.status().await.unwrap_err();

    assert!(matches!(err, QueueError::QueryFailed(ref m) if m.contains("qmaster")));
}

#[tokio::test]
async fn cancel_maps_unknown_job_to_not_found() {
    let dir = TempDir::new().unwrap();
    let qdel = tool(dir.path(), "qdel", "echo \"denied: job \\\"$1\\\" does not exist\" >&2; exit 1");
    let adapter = SgeAdapter::new("qsub", "qstat", qdel);

    let err = adapter.cancel("42").await.unwrap_err();

    assert!(matches!(err, QueueError::NotFound(ref n) if n == "42"));
}

#[tokio::test]
async fn cancel_other_failure_is_cancel_failed() {
    let dir = TempDir::new().unwrap();
    let qdel = tool(dir.path(), "qdel", "echo 'communication error' >&2; exit 1");
    let adapter = SgeAdapter::new("qsub", "qstat", qdel);

    assert!(matches!(
        adapter.cancel("42").await.unwrap_err(),
        QueueError::CancelFailed(_)
    ));
}
