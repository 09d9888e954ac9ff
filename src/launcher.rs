//! The decision procedure: enter the runtime, or fix the library search path
//! and relaunch.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::config::{Fixup, LauncherConfig};
use crate::environment::Environment;
use crate::error::LaunchError;
use crate::runtime::Runtime;
use crate::search_path::{build_rewritten_value, current_library_search_path, needs_rewrite};

/// The OS primitives the launcher depends on.
pub trait Host {
    fn resolve_self_path(&self) -> Result<PathBuf, LaunchError>;

    fn environment(&self) -> Environment;

    /// Replaces the current process image. Returns only on failure.
    fn relaunch(&self, exe: &Path, argv: &[OsString], env: &Environment) -> LaunchError;
}

/// The real process, via the platform module.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsHost;

impl Host for OsHost {
    fn resolve_self_path(&self) -> Result<PathBuf, LaunchError> {
        crate::platform::resolve_self_path()
    }

    fn environment(&self) -> Environment {
        Environment::inherited()
    }

    fn relaunch(&self, exe: &Path, argv: &[OsString], env: &Environment) -> LaunchError {
        crate::platform::relaunch(exe, argv, env)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// The search path already starts with the library directory.
    Enter,
    /// Relaunch with the search path set to this value.
    Relaunch { search_path: OsString },
}

/// Decides what to do with the current search path value.
pub fn plan(current: Option<&OsStr>, lib_dir: &OsStr) -> Result<Plan, LaunchError> {
    if !needs_rewrite(current, lib_dir) {
        return Ok(Plan::Enter);
    }
    let search_path = build_rewritten_value(current, lib_dir)?;
    Ok(Plan::Relaunch { search_path })
}

/// Runs the launcher and returns the runtime's exit status.
///
/// When a relaunch is needed this only returns if the relaunch failed, and
/// the runtime is never entered in that case.
pub fn run<H, R>(
    host: &H,
    runtime: &R,
    config: &LauncherConfig,
    argv: Vec<OsString>,
) -> Result<i32, LaunchError>
where
    H: Host,
    R: Runtime,
{
    let variable = match config.fixup {
        Fixup::Direct => {
            trace!("no search path fixup on this platform");
            return runtime.enter(&argv);
        }
        Fixup::PrependLibraryDir { variable } => variable,
    };

    let exe = host.resolve_self_path()?;
    let env = host.environment();
    let current = current_library_search_path(&env, variable);
    debug!(exe = %exe.display(), variable, current = ?current, "checking library search path");

    match plan(current, &config.lib_dir)? {
        Plan::Enter => {
            debug!("library directory already first, entering runtime");
            runtime.enter(&argv)
        }
        Plan::Relaunch { search_path } => {
            debug!(search_path = ?search_path, "relaunching with library directory first");
            let env = env.with_var(variable, search_path);
            Err(host.relaunch(&exe, &argv, &env))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::io;

    const LIB_DIR: &str = "/usr/lib/scalyr-agent-2/python3/lib";
    const VARIABLE: &str = "LD_LIBRARY_PATH";
    const EXE: &str = "/usr/lib/scalyr-agent-2/python3/bin/python3";

    struct Relaunched {
        exe: PathBuf,
        argv: Vec<OsString>,
        env: Environment,
    }

    struct FakeHost {
        self_path: Option<PathBuf>,
        env: Environment,
        relaunched: RefCell<Option<Relaunched>>,
    }

    impl FakeHost {
        fn with_search_path(value: Option<&str>) -> Self {
            let mut env: Environment = [("HOME", "/root"), ("LANG", "C.UTF-8")].into_iter().collect();
            if let Some(value) = value {
                env = env.with_var(VARIABLE, value);
            }
            Self {
                self_path: Some(PathBuf::from(EXE)),
                env,
                relaunched: RefCell::new(None),
            }
        }

        fn without_self_path(mut self) -> Self {
            self.self_path = None;
            self
        }

        fn relaunched(&self) -> bool {
            self.relaunched.borrow().is_some()
        }
    }

    impl Host for FakeHost {
        fn resolve_self_path(&self) -> Result<PathBuf, LaunchError> {
            self.self_path.clone().ok_or_else(|| {
                LaunchError::path_resolution(
                    "/proc/self/exe",
                    io::Error::new(io::ErrorKind::NotFound, "no proc filesystem"),
                )
            })
        }

        fn environment(&self) -> Environment {
            self.env.clone()
        }

        fn relaunch(&self, exe: &Path, argv: &[OsString], env: &Environment) -> LaunchError {
            *self.relaunched.borrow_mut() = Some(Relaunched {
                exe: exe.to_path_buf(),
                argv: argv.to_vec(),
                env: env.clone(),
            });
            LaunchError::Relaunch {
                exe: exe.to_path_buf(),
                source: io::Error::new(io::ErrorKind::Other, "exec recorded"),
            }
        }
    }

    #[derive(Default)]
    struct FakeRuntime {
        entered_with: RefCell<Option<Vec<OsString>>>,
        calls: Cell<usize>,
    }

    impl Runtime for FakeRuntime {
        fn enter(&self, argv: &[OsString]) -> Result<i32, LaunchError> {
            self.calls.set(self.calls.get() + 1);
            *self.entered_with.borrow_mut() = Some(argv.to_vec());
            Ok(7)
        }
    }

    fn config() -> LauncherConfig {
        LauncherConfig {
            fixup: Fixup::PrependLibraryDir { variable: VARIABLE },
            lib_dir: OsString::from(LIB_DIR),
        }
    }

    fn argv() -> Vec<OsString> {
        ["python3", "-m", "scalyr_agent", "--config", "agent with spaces.json"]
            .into_iter()
            .map(OsString::from)
            .collect()
    }

    #[test]
    fn absent_search_path_relaunches_with_directory() {
        let host = FakeHost::with_search_path(None);
        let runtime = FakeRuntime::default();

        let result = run(&host, &runtime, &config(), argv());

        assert!(matches!(result, Err(LaunchError::Relaunch { .. })));
        assert_eq!(runtime.calls.get(), 0);

        let relaunched = host.relaunched.borrow();
        let relaunched = relaunched.as_ref().unwrap();
        assert_eq!(relaunched.exe, PathBuf::from(EXE));
        assert_eq!(relaunched.argv, argv());
        let value = relaunched.env.get(VARIABLE).unwrap();
        assert_eq!(value, "/usr/lib/scalyr-agent-2/python3/lib:");
        assert!(!needs_rewrite(Some(value), OsStr::new(LIB_DIR)));
    }

    #[test]
    fn relaunched_process_enters_runtime() {
        let host = FakeHost::with_search_path(Some("/usr/lib/scalyr-agent-2/python3/lib:"));
        let runtime = FakeRuntime::default();

        assert_eq!(run(&host, &runtime, &config(), argv()).unwrap(), 7);
        assert_eq!(runtime.calls.get(), 1);
        assert!(!host.relaunched());
    }

    #[test]
    fn prefixed_search_path_enters_runtime_directly() {
        let host = FakeHost::with_search_path(Some("/usr/lib/scalyr-agent-2/python3/lib:/opt/foo"));
        let runtime = FakeRuntime::default();

        let status = run(&host, &runtime, &config(), argv()).unwrap();

        assert_eq!(status, 7);
        assert!(!host.relaunched());
        assert_eq!(runtime.entered_with.borrow().as_deref(), Some(argv().as_slice()));
    }

    #[test]
    fn directory_later_in_path_is_prepended_again() {
        let host = FakeHost::with_search_path(Some("/opt/foo:/usr/lib/scalyr-agent-2/python3/lib"));
        let runtime = FakeRuntime::default();

        let result = run(&host, &runtime, &config(), argv());

        assert!(result.is_err());
        assert_eq!(runtime.calls.get(), 0);
        let relaunched = host.relaunched.borrow();
        assert_eq!(
            relaunched.as_ref().unwrap().env.get(VARIABLE).unwrap(),
            "/usr/lib/scalyr-agent-2/python3/lib:/opt/foo:/usr/lib/scalyr-agent-2/python3/lib"
        );
    }

    #[test]
    fn relaunch_keeps_other_variables() {
        let host = FakeHost::with_search_path(Some("/opt/foo"));
        let runtime = FakeRuntime::default();

        let _ = run(&host, &runtime, &config(), argv());

        let relaunched = host.relaunched.borrow();
        let env = &relaunched.as_ref().unwrap().env;
        assert_eq!(env.len(), host.env.len());
        assert_eq!(env.get("HOME"), host.env.get("HOME"));
        assert_eq!(env.get("LANG"), host.env.get("LANG"));
    }

    #[test]
    fn unresolvable_self_path_is_fatal() {
        let host = FakeHost::with_search_path(None).without_self_path();
        let runtime = FakeRuntime::default();

        let result = run(&host, &runtime, &config(), argv());

        assert!(matches!(result, Err(LaunchError::PathResolution { .. })));
        assert!(!host.relaunched());
        assert_eq!(runtime.calls.get(), 0);
    }

    #[test]
    fn direct_platforms_skip_everything() {
        let host = FakeHost::with_search_path(None).without_self_path();
        let runtime = FakeRuntime::default();
        let config = LauncherConfig {
            fixup: Fixup::Direct,
            ..config()
        };

        assert_eq!(run(&host, &runtime, &config, argv()).unwrap(), 7);
        assert!(!host.relaunched());
        assert_eq!(runtime.calls.get(), 1);
    }

    #[test]
    fn plan_matches_search_path_state() {
        let lib_dir = OsStr::new(LIB_DIR);
        assert_eq!(
            plan(Some(OsStr::new("/usr/lib/scalyr-agent-2/python3/lib:/opt/foo")), lib_dir).unwrap(),
            Plan::Enter
        );
        assert_eq!(
            plan(Some(OsStr::new(LIB_DIR)), lib_dir).unwrap(),
            Plan::Relaunch {
                search_path: OsString::from(
                    "/usr/lib/scalyr-agent-2/python3/lib:/usr/lib/scalyr-agent-2/python3/lib"
                ),
            }
        );
    }
}
