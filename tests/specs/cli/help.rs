//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_subcommands() {
    let project = Project::empty();
    project
        .qmap()
        .args(&["--help"])
        .passes()
        .stdout_has("run")
        .stdout_has("worker")
        .stdout_has("script")
        .stdout_has("functions");
}

#[test]
fn run_help_lists_overrides() {
    let project = Project::empty();
    project
        .qmap()
        .args(&["run", "--help"])
        .passes()
        .stdout_has("--poll-interval")
        .stdout_has("--max-resubmissions")
        .stdout_has("--keep-work-dir");
}

#[test]
fn functions_lists_demo_registry() {
    let project = Project::empty();
    project
        .qmap()
        .args(&["functions"])
        .passes()
        .stdout_eq("demo::fail\ndemo::square\ndemo::sum\n");
}
