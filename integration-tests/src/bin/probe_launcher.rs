//! Demo program: the real launcher with a runtime that reports instead of
//! starting Python.
//!
//! Usage: probe-launcher [args...]
//! Outputs one JSON line on stdout once the runtime is entered:
//!   {"pid":..,"argv":[..],"search_path":..,"marker":..}
//!
//! Two variables break the host on purpose:
//!   PROBE_BREAK_SELF_PATH=1      self path resolution fails
//!   PROBE_RELAUNCH_TARGET=<path> relaunch execs <path> instead of ourselves

use std::env;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use launcher_harness::{Report, MARKER_ENV};
use python_launcher::{run, Environment, Fixup, Host, LaunchError, LauncherConfig, OsHost, Runtime};

struct ProbeHost;

impl Host for ProbeHost {
    fn resolve_self_path(&self) -> Result<PathBuf, LaunchError> {
        if env::var_os("PROBE_BREAK_SELF_PATH").is_some() {
            return Err(LaunchError::PathResolution {
                link: PathBuf::from("/proc/self/exe"),
                source: io::Error::new(io::ErrorKind::NotFound, "self reference disabled by probe"),
            });
        }
        OsHost.resolve_self_path()
    }

    fn environment(&self) -> Environment {
        OsHost.environment()
    }

    fn relaunch(&self, exe: &Path, argv: &[OsString], env: &Environment) -> LaunchError {
        match env::var_os("PROBE_RELAUNCH_TARGET") {
            Some(target) => OsHost.relaunch(Path::new(&target), argv, env),
            None => OsHost.relaunch(exe, argv, env),
        }
    }
}

struct ProbeRuntime {
    variable: Option<&'static str>,
}

impl Runtime for ProbeRuntime {
    fn enter(&self, argv: &[OsString]) -> Result<i32, LaunchError> {
        let lossy = |value: OsString| value.to_string_lossy().into_owned();
        let report = Report {
            pid: process::id(),
            argv: argv.iter().cloned().map(lossy).collect(),
            search_path: self.variable.and_then(|name| env::var_os(name)).map(lossy),
            marker: env::var_os(MARKER_ENV).map(lossy),
        };
        match serde_json::to_string(&report) {
            Ok(line) => {
                println!("{}", line);
                Ok(0)
            }
            Err(e) => Err(LaunchError::Runtime {
                entry: "probe".to_string(),
                source: io::Error::new(io::ErrorKind::InvalidData, e),
            }),
        }
    }
}

fn main() {
    let config = LauncherConfig::for_host();
    let variable = match config.fixup {
        Fixup::Direct => None,
        Fixup::PrependLibraryDir { variable } => Some(variable),
    };

    match run(&ProbeHost, &ProbeRuntime { variable }, &config, env::args_os().collect()) {
        Ok(status) => process::exit(status),
        Err(err) => {
            eprintln!("ERROR: {}", err);
            process::exit(1);
        }
    }
}
