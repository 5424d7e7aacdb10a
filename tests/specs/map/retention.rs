//! Work area retention specs

use crate::prelude::*;
use std::fs;

fn run_direct(project: &Project, function: &str, jobs: &Value, extra: &[&str]) -> RunAssert {
    let jobs = project.jobs(jobs);
    project
        .qmap()
        .args(&["run", "--function", function, "--qsub-path", "/nonexistent/qsub"])
        .arg("--jobs")
        .arg(&jobs)
        .arg("--work-dir")
        .arg(project.work_dir())
        .args(extra)
        .passes()
}

#[test]
fn failing_job_leaves_hole_and_keeps_work_area() {
    let project = Project::empty();

    let run = run_direct(&project, "demo::square", &json!([2, 3037000500i64]), &[]);

    assert_eq!(run.json(), json!([4, null]));
    run.stderr_has("work area kept");
    let stderr = fs::read_to_string(project.work_dir().join("000000001.json.e")).unwrap();
    assert!(stderr.contains("square overflows i64"), "stderr was {stderr:?}");
    let clean = fs::read_to_string(project.work_dir().join("000000000.json.e")).unwrap();
    assert!(clean.is_empty());
}

#[test]
fn fail_function_reports_message_in_job_stderr() {
    let project = Project::empty();

    let run = run_direct(&project, "demo::fail", &json!(["disk on fire"]), &[]);

    assert_eq!(run.json(), json!([null]));
    let stderr = fs::read_to_string(project.work_dir().join("000000000.json.e")).unwrap();
    assert!(stderr.contains("disk on fire"));
    assert!(!project.work_dir().join("000000000.json.out").exists());
}

#[test]
fn keep_work_dir_retains_clean_batch() {
    let project = Project::empty();

    let run = run_direct(&project, "demo::sum", &json!([[1, 2], [3]]), &["--keep-work-dir"]);

    assert_eq!(run.json(), json!([3, 3]));
    let work = project.work_dir();
    for name in [
        "worker_node_script.sh",
        "000000000.json",
        "000000000.json.out",
        "000000001.json",
        "000000001.json.out",
    ] {
        assert!(work.join(name).exists(), "missing {name}");
    }
}
