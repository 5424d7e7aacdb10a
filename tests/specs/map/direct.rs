//! Direct execution specs: no batch engine, jobs run on this host

use crate::prelude::*;

#[test]
fn sums_ranges_without_engine() {
    let project = Project::empty();
    let (jobs, sums) = range_jobs(10);
    let jobs = project.jobs(&jobs);

    let run = project
        .qmap()
        .args(&["run", "--function", "demo::sum", "--qsub-path", "/nonexistent/qsub"])
        .arg("--jobs")
        .arg(&jobs)
        .arg("--work-dir")
        .arg(project.work_dir())
        .passes();

    assert_eq!(run.json(), sums);
    assert!(!project.work_dir().exists(), "clean run should remove work area");
}

#[test]
fn empty_batch_yields_empty_array() {
    let project = Project::empty();
    let jobs = project.jobs(&json!([]));

    project
        .qmap()
        .args(&["run", "--function", "demo::sum", "--qsub-path", "/nonexistent/qsub"])
        .arg("--jobs")
        .arg(&jobs)
        .arg("--work-dir")
        .arg(project.work_dir())
        .passes()
        .stdout_eq("[]\n");
}

#[test]
fn default_work_area_lives_in_current_directory_and_is_removed() {
    let project = Project::empty();
    let jobs = project.jobs(&json!([1, 2]));

    let run = project
        .qmap()
        .args(&["run", "--function", "demo::square", "--qsub-path", "/nonexistent/qsub"])
        .arg("--jobs")
        .arg(&jobs)
        .passes();

    assert_eq!(run.json(), json!([1, 4]));
    let leftovers: Vec<_> = std::fs::read_dir(project.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(".qmap_"))
        .collect();
    assert!(leftovers.is_empty(), "left behind {leftovers:?}");
}

#[test]
fn config_file_supplies_settings() {
    let project = Project::empty();
    let jobs = project.jobs(&json!([3]));
    let config = project.file(
        "qmap.toml",
        "qsub_path = \"/nonexistent/qsub\"\n\
         work_dir = \"from-config\"\n\
         keep_work_dir = true\n",
    );

    let run = project
        .qmap()
        .args(&["run", "--function", "demo::square", "--jobs"])
        .arg(&jobs)
        .arg("--config")
        .arg(&config)
        .passes();

    assert_eq!(run.json(), json!([9]));
    let area = project.path().join("from-config");
    assert!(area.join("worker_node_script.sh").exists());
    assert_eq!(
        std::fs::read_to_string(area.join("000000000.json.out")).unwrap(),
        "9"
    );
}

#[test]
fn flags_override_config_file() {
    let project = Project::empty();
    let jobs = project.jobs(&json!([3]));
    let config = project.file(
        "qmap.toml",
        "qsub_path = \"/nonexistent/qsub\"\nwork_dir = \"from-config\"\n",
    );

    project
        .qmap()
        .args(&["run", "--function", "demo::square", "--jobs"])
        .arg(&jobs)
        .arg("--config")
        .arg(&config)
        .arg("--work-dir")
        .arg(project.work_dir())
        .arg("--keep-work-dir")
        .passes();

    assert!(project.work_dir().join("000000000.json").exists());
    assert!(!project.path().join("from-config").exists());
}
