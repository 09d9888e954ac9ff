// Deployment layout, fixed when the launcher is built.

use std::ffi::OsString;

/// Directory holding the interpreter's private shared libraries.
pub const DEFAULT_LIB_DIR: &str = match option_env!("PYTHON_LAUNCHER_LIB_DIR") {
    Some(dir) => dir,
    None => "/usr/lib/scalyr-agent-2/python3/lib",
};

/// Interpreter binary entered by [`crate::runtime::ExecInterpreter`].
pub const DEFAULT_INTERPRETER: &str = match option_env!("PYTHON_LAUNCHER_INTERPRETER") {
    Some(path) => path,
    None => "/usr/lib/scalyr-agent-2/python3/bin/python3",
};

/// Separator between entries of a library search path.
pub const SEPARATOR: &str = ":";

/// How a platform makes the private library directory visible to its loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixup {
    /// Nothing to fix: enter the runtime straight away.
    Direct,
    /// Prepend the directory to `variable` and relaunch so the dynamic
    /// loader sees it before any library is resolved.
    PrependLibraryDir { variable: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherConfig {
    pub fixup: Fixup,
    pub lib_dir: OsString,
}

impl LauncherConfig {
    /// Configuration for the platform this binary was built for.
    pub fn for_host() -> Self {
        Self {
            fixup: crate::platform::FIXUP,
            lib_dir: OsString::from(DEFAULT_LIB_DIR),
        }
    }
}
