// macOS: dyld reads DYLD_LIBRARY_PATH. There is no /proc, so the image path
// comes from _NSGetExecutablePath through std.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Fixup;
use crate::environment::Environment;
use crate::error::LaunchError;

pub const FIXUP: Fixup = Fixup::PrependLibraryDir {
    variable: "DYLD_LIBRARY_PATH",
};

pub fn resolve_self_path() -> Result<PathBuf, LaunchError> {
    let exe = env::current_exe().map_err(LaunchError::current_exe)?;
    fs::canonicalize(&exe).map_err(|e| LaunchError::path_resolution(exe, e))
}

pub fn relaunch(exe: &Path, argv: &[OsString], env: &Environment) -> LaunchError {
    crate::unix::replace_image(exe, argv, env)
}
