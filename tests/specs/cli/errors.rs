//! CLI error specs

use crate::prelude::*;

#[test]
fn run_rejects_unknown_function() {
    let project = Project::empty();
    let jobs = project.jobs(&json!([1]));
    project
        .qmap()
        .args(&["run", "--function", "demo::nope", "--jobs"])
        .arg(&jobs)
        .fails()
        .stderr_has("unknown function: demo::nope");
}

#[test]
fn run_rejects_non_array_jobs_file() {
    let project = Project::empty();
    let jobs = project.jobs(&json!({ "not": "an array" }));
    project
        .qmap()
        .args(&["run", "--function", "demo::sum", "--jobs"])
        .arg(&jobs)
        .fails()
        .stderr_has("must hold a JSON array");
}

#[test]
fn run_rejects_unknown_config_keys() {
    let project = Project::empty();
    let jobs = project.jobs(&json!([]));
    let config = project.file("qmap.toml", "poll_intervall = \"1s\"\n");
    project
        .qmap()
        .args(&["run", "--function", "demo::sum", "--jobs"])
        .arg(&jobs)
        .arg("--config")
        .arg(&config)
        .fails()
        .stderr_has("invalid config");
}

#[test]
fn run_refuses_non_empty_work_dir() {
    let project = Project::empty();
    let jobs = project.jobs(&json!([[1]]));
    project.file("work/keep-me", "x");
    project
        .qmap()
        .args(&["run", "--function", "demo::sum", "--qsub-path", "/nonexistent/qsub"])
        .arg("--jobs")
        .arg(&jobs)
        .arg("--work-dir")
        .arg(project.work_dir())
        .fails()
        .stderr_has("already exists and is not empty");
    assert!(project.work_dir().join("keep-me").exists());
}
