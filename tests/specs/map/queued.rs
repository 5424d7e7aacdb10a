//! Queued execution specs against stand-in engine tools

use crate::prelude::*;
use std::fs;
use std::path::PathBuf;

fn submissions(project: &Project) -> Vec<String> {
    fs::read_to_string(project.path().join("submitted"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

fn run_queued(project: &Project, tools: &[PathBuf; 3], jobs: &Value, extra: &[&str]) -> RunAssert {
    let jobs = project.jobs(jobs);
    project
        .qmap()
        .args(&["run", "--function", "demo::sum", "--poll-interval", "10ms"])
        .arg("--jobs")
        .arg(&jobs)
        .arg("--work-dir")
        .arg(project.work_dir())
        .arg("--qsub-path")
        .arg(&tools[0])
        .arg("--qstat-path")
        .arg(&tools[1])
        .arg("--qdel-path")
        .arg(&tools[2])
        .args(extra)
        .passes()
}

#[test]
fn runs_every_job_through_the_engine() {
    let project = Project::empty();
    let tools = install_instant_engine(&project);
    let (jobs, sums) = range_jobs(5);

    let run = run_queued(&project, &tools, &jobs, &["--queue", "long.q"]);

    assert_eq!(run.json(), sums);
    let submitted = submissions(&project);
    assert_eq!(submitted.len(), 5);
    for (index, line) in submitted.iter().enumerate() {
        assert!(
            line.ends_with(&format!(".{:09} long.q", index)),
            "unexpected submission {line:?}"
        );
    }
    assert!(!project.work_dir().exists());
}

/// Engine whose `qsub` parks matching jobs in an error state instead of
/// running them; `qstat` reports parked jobs as `Eqw` until `qdel` removes
/// them. `flaky` selects names by suffix, `times` bounds how often (0 is
/// always).
fn install_erroring_engine(project: &Project, flaky: &str, times: u32) -> [PathBuf; 3] {
    let root = project.path().display().to_string();
    fs::create_dir_all(project.path().join("held")).unwrap();
    let qsub = project.executable(
        "bin/qsub",
        &format!(
            r#"root='{root}'
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out=$2; shift 2 ;;
    -e) err=$2; shift 2 ;;
    -N) name=$2; shift 2 ;;
    -V) shift ;;
    -q) shift 2 ;;
    -S) interp=$2; shift 2 ;;
    *) break ;;
  esac
done
echo "$name" >> "$root/submitted"
n=$(wc -l < "$root/submitted" | tr -d ' ')
case "$name" in
  *{flaky})
    parked=$(cat "$root/parked" 2>/dev/null || echo 0)
    if [ {times} -eq 0 ] || [ "$parked" -lt {times} ]; then
      echo $((parked + 1)) > "$root/parked"
      echo "$name" > "$root/held/$n"
      exit 0
    fi
    ;;
esac
"$interp" "$@" > "$out" 2> "$err""#
        ),
    );
    let qstat = project.executable(
        "bin/qstat",
        &format!(
            r#"for f in '{root}'/held/*; do
  [ -e "$f" ] || continue
  n=$(basename "$f")
  echo "  $n 0.00000 short user Eqw 01/01/2026 00:00:00 1"
  echo "       Full jobname:     $(cat "$f")"
done"#
        ),
    );
    let qdel = project.executable(
        "bin/qdel",
        &format!(
            r#"if [ -e '{root}'/held/"$1" ]; then
  rm '{root}'/held/"$1"
  echo "user has deleted job $1"
else
  echo "denied: job \"$1\" does not exist" >&2
  exit 1
fi"#
        ),
    );
    [qsub, qstat, qdel]
}

#[test]
fn errored_job_is_cancelled_and_resubmitted() {
    let project = Project::empty();
    let tools = install_erroring_engine(&project, ".000000001", 1);
    let (jobs, sums) = range_jobs(3);

    let run = run_queued(&project, &tools, &jobs, &["--keep-work-dir"]);

    assert_eq!(run.json(), sums);
    let submitted = submissions(&project);
    assert_eq!(submitted.len(), 4);
    assert_eq!(
        submitted.iter().filter(|n| n.ends_with(".000000001")).count(),
        2
    );
    let ledger: Value = serde_json::from_str(
        &fs::read_to_string(project.work_dir().join("num_resubmissions_by_idx.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(ledger, json!({ "1": 0 }));
}

#[test]
fn job_that_keeps_failing_is_abandoned_after_budget() {
    let project = Project::empty();
    let tools = install_erroring_engine(&project, ".000000000", 0);
    let (jobs, sums) = range_jobs(2);

    let run = run_queued(&project, &tools, &jobs, &["--max-resubmissions", "2"]);

    assert_eq!(run.json(), json!([null, sums[1].clone()]));
    let first_job = submissions(&project)
        .into_iter()
        .filter(|n| n.ends_with(".000000000"))
        .count();
    assert_eq!(first_job, 3, "one submission plus two resubmissions");
    run.stderr_has("abandoned");
    assert!(
        fs::read_dir(project.path().join("held")).unwrap().next().is_none(),
        "abandoned job should be cancelled"
    );
}
