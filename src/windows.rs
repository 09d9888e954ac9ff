// Windows: DLLs are searched next to the executable, so the runtime is
// entered directly and the search path is never rewritten.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{self, Command};

use crate::config::Fixup;
use crate::environment::Environment;
use crate::error::LaunchError;

pub const FIXUP: Fixup = Fixup::Direct;

pub fn resolve_self_path() -> Result<PathBuf, LaunchError> {
    env::current_exe().map_err(LaunchError::current_exe)
}

/// There is no exec on Windows: run `exe` as a child, wait for it and exit
/// with its status.
pub fn relaunch(exe: &Path, argv: &[OsString], env: &Environment) -> LaunchError {
    let mut cmd = Command::new(exe);
    cmd.args(argv.iter().skip(1));
    cmd.env_clear().envs(env.iter());

    match cmd.status() {
        Ok(status) => process::exit(status.code().unwrap_or(1)),
        Err(source) => LaunchError::Relaunch {
            exe: exe.to_path_buf(),
            source,
        },
    }
}
