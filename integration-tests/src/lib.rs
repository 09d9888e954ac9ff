//! Scenario harness for the launcher.
//!
//! Each scenario runs the `probe-launcher` binary as a real child process
//! with a prepared environment and checks the JSON report its runtime prints.
//! The same scenarios back the `test-runner` binary and `cargo test`.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};

use python_launcher::config::DEFAULT_LIB_DIR;
use python_launcher::{Fixup, LauncherConfig};

/// Passed through the launcher untouched; the probe echoes it back.
pub const MARKER_ENV: &str = "PROBE_MARKER";

/// What the probe's runtime saw when it was entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub pid: u32,
    pub argv: Vec<String>,
    pub search_path: Option<String>,
    pub marker: Option<String>,
}

/// Outcome of one probe run
pub struct ProbeRun {
    /// PID of the child as spawned, before any exec
    pub spawned_pid: u32,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProbeRun {
    fn report(&self) -> Result<Report> {
        ensure!(
            self.exit_code == 0,
            "probe failed with exit code {}: {}",
            self.exit_code,
            self.stderr
        );
        let line = self
            .stdout
            .lines()
            .next()
            .with_context(|| format!("probe printed no report, stderr: {}", self.stderr))?;
        serde_json::from_str(line).with_context(|| format!("malformed report: {}", line))
    }
}

pub struct Harness {
    probe: PathBuf,
    variable: &'static str,
    lib_dir: String,
}

pub type Scenario = fn(&Harness) -> Result<()>;

impl Harness {
    pub fn new(probe: impl Into<PathBuf>) -> Result<Self> {
        let probe = probe.into();
        ensure!(probe.exists(), "probe not found: {}", probe.display());

        let variable = match LauncherConfig::for_host().fixup {
            Fixup::PrependLibraryDir { variable } => variable,
            Fixup::Direct => bail!("this platform never rewrites the library search path"),
        };

        Ok(Self {
            probe,
            variable,
            lib_dir: DEFAULT_LIB_DIR.to_string(),
        })
    }

    pub fn probe(&self) -> &Path {
        &self.probe
    }

    /// Runs the probe with the search path set to `search_path` (or unset).
    pub fn run_probe(
        &self,
        search_path: Option<&str>,
        args: &[&str],
        extra_env: &[(&str, &str)],
    ) -> Result<ProbeRun> {
        let mut cmd = Command::new(&self.probe);
        cmd.args(args)
            .env_remove("PROBE_BREAK_SELF_PATH")
            .env_remove("PROBE_RELAUNCH_TARGET")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        match search_path {
            Some(value) => cmd.env(self.variable, value),
            None => cmd.env_remove(self.variable),
        };
        for (key, value) in extra_env {
            cmd.env(key, value);
        }

        let child = cmd
            .spawn()
            .with_context(|| format!("failed to start {}", self.probe.display()))?;
        let spawned_pid = child.id();
        let output = child.wait_with_output().context("failed to wait for probe")?;

        Ok(ProbeRun {
            spawned_pid,
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn prefixed(&self, rest: &str) -> String {
        format!("{}:{}", self.lib_dir, rest)
    }

    fn expect_search_path(&self, initial: Option<&str>, expected: &str) -> Result<Report> {
        let run = self.run_probe(initial, &[], &[])?;
        let report = run.report()?;
        ensure!(
            report.search_path.as_deref() == Some(expected),
            "{} started as {:?}, runtime saw {:?}, expected {:?}",
            self.variable,
            initial,
            report.search_path,
            expected
        );
        ensure!(
            report.pid == run.spawned_pid,
            "runtime ran in pid {}, probe was spawned as {}",
            report.pid,
            run.spawned_pid
        );
        Ok(report)
    }
}

/// Unset search path: relaunch once with `<lib>:`, in the same process.
pub fn absent_search_path(harness: &Harness) -> Result<()> {
    let expected = harness.prefixed("");
    harness.expect_search_path(None, &expected)?;
    Ok(())
}

/// Already prefixed: enter directly with the value untouched.
pub fn prefixed_search_path(harness: &Harness) -> Result<()> {
    let value = harness.prefixed("/opt/foo");
    harness.expect_search_path(Some(&value), &value)?;
    Ok(())
}

/// Directory present but not first: prepend it again.
pub fn directory_not_first(harness: &Harness) -> Result<()> {
    let initial = format!("/opt/foo:{}", harness.lib_dir);
    let expected = harness.prefixed(&initial);
    harness.expect_search_path(Some(&initial), &expected)?;
    Ok(())
}

/// Exact directory with no trailing separator does not count as prefixed.
pub fn directory_without_separator(harness: &Harness) -> Result<()> {
    let initial = harness.lib_dir.clone();
    let expected = harness.prefixed(&initial);
    harness.expect_search_path(Some(&initial), &expected)?;
    Ok(())
}

/// Arguments reach the runtime verbatim through the relaunch.
pub fn arguments_forwarded(harness: &Harness) -> Result<()> {
    let args = ["-c", "print('hi')", "", "with space", "--path=a:b"];
    let run = harness.run_probe(None, &args, &[])?;
    let report = run.report()?;

    let mut expected = vec![harness.probe().to_string_lossy().into_owned()];
    expected.extend(args.iter().map(|arg| arg.to_string()));
    ensure!(
        report.argv == expected,
        "argv mismatch: got {:?}, expected {:?}",
        report.argv,
        expected
    );
    Ok(())
}

/// Other variables survive the relaunch.
pub fn environment_preserved(harness: &Harness) -> Result<()> {
    let run = harness.run_probe(None, &[], &[(MARKER_ENV, "kept=across:relaunch")])?;
    let report = run.report()?;
    ensure!(
        report.marker.as_deref() == Some("kept=across:relaunch"),
        "{} lost across relaunch: {:?}",
        MARKER_ENV,
        report.marker
    );
    Ok(())
}

/// No self path: fail before anything else happens.
pub fn self_path_failure(harness: &Harness) -> Result<()> {
    let run = harness.run_probe(None, &[], &[("PROBE_BREAK_SELF_PATH", "1")])?;
    expect_fatal(&run, "ERROR: cannot resolve executable path")
}

/// Exec rejected: fail without falling back to the runtime.
pub fn relaunch_failure(harness: &Harness) -> Result<()> {
    let missing = std::env::temp_dir().join("python-launcher-tests-missing-binary");
    let run = harness.run_probe(
        None,
        &[],
        &[("PROBE_RELAUNCH_TARGET", missing.to_str().unwrap_or("/nonexistent"))],
    )?;
    expect_fatal(&run, "ERROR: cannot relaunch")
}

fn expect_fatal(run: &ProbeRun, message: &str) -> Result<()> {
    ensure!(run.exit_code != 0, "probe succeeded: {}", run.stdout);
    ensure!(
        run.stdout.is_empty(),
        "runtime was entered: {}",
        run.stdout
    );
    ensure!(
        run.stderr.contains(message),
        "expected {:?} on stderr, got {:?}",
        message,
        run.stderr
    );
    Ok(())
}

pub const SCENARIOS: &[(&str, Scenario)] = &[
    ("absent_search_path", absent_search_path),
    ("prefixed_search_path", prefixed_search_path),
    ("directory_not_first", directory_not_first),
    ("directory_without_separator", directory_without_separator),
    ("arguments_forwarded", arguments_forwarded),
    ("environment_preserved", environment_preserved),
    ("self_path_failure", self_path_failure),
    ("relaunch_failure", relaunch_failure),
];
