// Linux: the loader reads LD_LIBRARY_PATH, and the kernel exposes our own
// image through /proc/self/exe.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use crate::config::Fixup;
use crate::environment::Environment;
use crate::error::LaunchError;

pub const FIXUP: Fixup = Fixup::PrependLibraryDir {
    variable: "LD_LIBRARY_PATH",
};

const SELF_EXE: &str = "/proc/self/exe";

// Appended by the kernel when the binary was unlinked after exec.
const DELETED_SUFFIX: &[u8] = b" (deleted)";

pub fn resolve_self_path() -> Result<PathBuf, LaunchError> {
    resolve_link(Path::new(SELF_EXE))
}

pub(crate) fn resolve_link(link: &Path) -> Result<PathBuf, LaunchError> {
    let metadata =
        fs::symlink_metadata(link).map_err(|e| LaunchError::path_resolution(link, e))?;
    if !metadata.file_type().is_symlink() {
        return Err(LaunchError::path_resolution(
            link,
            io::Error::new(io::ErrorKind::InvalidInput, "not a symbolic link"),
        ));
    }

    let target = fs::read_link(link).map_err(|e| LaunchError::path_resolution(link, e))?;
    if target.as_os_str().as_bytes().ends_with(DELETED_SUFFIX) {
        return Err(LaunchError::path_resolution(
            link,
            io::Error::new(io::ErrorKind::NotFound, "executable has been deleted"),
        ));
    }
    if !target.is_absolute() {
        return Err(LaunchError::path_resolution(
            link,
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("relative target {}", target.display()),
            ),
        ));
    }
    Ok(target)
}

pub fn relaunch(exe: &Path, argv: &[OsString], env: &Environment) -> LaunchError {
    crate::unix::replace_image(exe, argv, env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::symlink;

    #[test]
    fn resolves_own_executable() {
        let path = resolve_self_path().unwrap();
        assert!(path.is_absolute());
        assert_eq!(path, std::env::current_exe().unwrap());
    }

    #[test]
    fn follows_symlink_to_absolute_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("python3");
        fs::write(&target, b"").unwrap();
        let link = dir.path().join("exe");
        symlink(&target, &link).unwrap();

        assert_eq!(resolve_link(&link).unwrap(), target);
    }

    #[test]
    fn missing_self_reference_fails() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("exe");

        let err = resolve_link(&link).unwrap_err();
        match err {
            LaunchError::PathResolution { link: failed, source } => {
                assert_eq!(failed, link);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn deleted_executable_fails() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("exe");
        symlink("/usr/lib/scalyr-agent-2/python3/bin/python3 (deleted)", &link).unwrap();

        assert!(matches!(
            resolve_link(&link),
            Err(LaunchError::PathResolution { .. })
        ));
    }

    #[test]
    fn regular_file_is_not_a_self_reference() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            resolve_link(file.path()),
            Err(LaunchError::PathResolution { .. })
        ));
    }

    #[test]
    fn relative_target_fails() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("exe");
        symlink("bin/python3", &link).unwrap();

        assert!(matches!(
            resolve_link(&link),
            Err(LaunchError::PathResolution { .. })
        ));
    }
}
