//! Shared helpers for CLI specs

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Output;
use tempfile::TempDir;

pub use serde_json::json;
pub use serde_json::Value;

/// A scratch directory the CLI runs in
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `rel`, creating parent directories
    pub fn file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Write an executable shell script to `rel`
    pub fn executable(&self, rel: &str, body: &str) -> PathBuf {
        let path = self.file(rel, &format!("#!/bin/sh\n{}\n", body));
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Write a jobs file holding `jobs`
    pub fn jobs(&self, jobs: &Value) -> PathBuf {
        self.file("jobs.json", &jobs.to_string())
    }

    pub fn work_dir(&self) -> PathBuf {
        self.path().join("work")
    }

    pub fn qmap(&self) -> CliBuilder {
        let mut cmd = assert_cmd::Command::cargo_bin("qmap").unwrap();
        cmd.current_dir(self.path());
        cmd.env_remove("RUST_LOG");
        CliBuilder { cmd }
    }
}

pub struct CliBuilder {
    cmd: assert_cmd::Command,
}

impl CliBuilder {
    pub fn args<S: AsRef<std::ffi::OsStr>>(mut self, args: &[S]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn arg(mut self, arg: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.arg(arg);
        self
    }

    /// Run and require exit status 0
    pub fn passes(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert { output };
        assert!(
            run.output.status.success(),
            "expected success, got {:?}\nstdout:\n{}\nstderr:\n{}",
            run.output.status,
            run.stdout(),
            run.stderr()
        );
        run
    }

    /// Run and require a non-zero exit status
    pub fn fails(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert { output };
        assert!(
            !run.output.status.success(),
            "expected failure\nstdout:\n{}\nstderr:\n{}",
            run.stdout(),
            run.stderr()
        );
        run
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout(), expected);
        self
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(needle), "stdout missing {needle:?}:\n{stdout}");
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        let stderr = self.stderr();
        assert!(stderr.contains(needle), "stderr missing {needle:?}:\n{stderr}");
        self
    }

    /// Parse stdout as JSON
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.stdout()).unwrap()
    }
}

/// Sums of `[i, i + 100)` for `i` in `0..count`
pub fn range_jobs(count: i64) -> (Value, Value) {
    let jobs: Vec<Vec<i64>> = (0..count).map(|i| (i..i + 100).collect()).collect();
    let sums: Vec<i64> = (0..count).map(|i| (i..i + 100).sum()).collect();
    (json!(jobs), json!(sums))
}

/// Stand-in engine tools: `qsub` runs the job at once, `qstat` reports an
/// empty queue, `qdel` succeeds. Every submitted name goes to `submitted`.
pub fn install_instant_engine(project: &Project) -> [PathBuf; 3] {
    let log = project.path().join("submitted");
    let qsub = project.executable(
        "bin/qsub",
        &format!(
            r#"while [ $# -gt 0 ]; do
  case "$1" in
    -o) out=$2; shift 2 ;;
    -e) err=$2; shift 2 ;;
    -N) name=$2; shift 2 ;;
    -q) queue=$2; shift 2 ;;
    -V) shift ;;
    -S) interp=$2; shift 2 ;;
    *) break ;;
  esac
done
echo "$name ${{queue:-default}}" >> '{log}'
"$interp" "$@" > "$out" 2> "$err"
echo "Your job 1 (\"$name\") has been submitted""#,
            log = log.display()
        ),
    );
    let qstat = project.executable("bin/qstat", "exit 0");
    let qdel = project.executable("bin/qdel", "exit 0");
    [qsub, qstat, qdel]
}
