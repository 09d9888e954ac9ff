// Process image replacement shared by the POSIX platforms.

use std::ffi::OsString;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::Command;

use crate::environment::Environment;
use crate::error::LaunchError;

/// Replaces this process with `exe`, keeping `argv` as given and installing
/// exactly `env`. Only returns if the exec call fails.
pub fn replace_image(exe: &Path, argv: &[OsString], env: &Environment) -> LaunchError {
    let mut cmd = Command::new(exe);
    if let Some((arg0, rest)) = argv.split_first() {
        cmd.arg0(arg0).args(rest);
    }
    cmd.env_clear().envs(env.iter());

    let source = cmd.exec();
    LaunchError::Relaunch {
        exe: exe.to_path_buf(),
        source,
    }
}
