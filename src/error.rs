use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that stops the launcher before control reaches the runtime.
///
/// None of these are recoverable: `main` prints the message and exits non-zero.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The running executable's own path could not be determined.
    #[error("cannot resolve executable path from {}: {source}", link.display())]
    PathResolution {
        link: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The OS refused to replace the process image.
    #[error("cannot relaunch {}: {source}", exe.display())]
    Relaunch {
        exe: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot allocate {requested} bytes for {what}")]
    Allocation {
        what: &'static str,
        requested: usize,
        #[source]
        source: TryReserveError,
    },

    /// The runtime entry point could not be started.
    #[error("cannot start {entry}: {source}")]
    Runtime {
        entry: String,
        #[source]
        source: io::Error,
    },
}

impl LaunchError {
    pub(crate) fn path_resolution(link: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::PathResolution {
            link: link.into(),
            source,
        }
    }

    /// Failure of the OS query behind `std::env::current_exe`.
    #[cfg_attr(target_os = "linux", allow(dead_code))]
    pub(crate) fn current_exe(source: io::Error) -> Self {
        Self::path_resolution("the current_exe query", source)
    }
}
