//! Launcher for a bundled Python runtime.
//!
//! Makes sure the runtime's private library directory is the first entry of
//! the dynamic loader's search path before the interpreter starts. When it is
//! not, the launcher prepends it and re-executes itself once so the loader
//! picks it up.

// Platform-specific implementations
// Linux and macOS fix the search path and exec, Windows enters directly

#[cfg(target_os = "linux")]
#[path = "linux.rs"]
mod platform;

#[cfg(target_os = "macos")]
#[path = "macos.rs"]
mod platform;

#[cfg(target_os = "windows")]
#[path = "windows.rs"]
mod platform;

#[cfg(unix)]
mod unix;

pub mod config;
pub mod environment;
pub mod error;
pub mod launcher;
pub mod observability;
pub mod runtime;
pub mod search_path;

pub use config::{Fixup, LauncherConfig};
pub use environment::Environment;
pub use error::LaunchError;
pub use launcher::{run, Host, OsHost, Plan};
pub use runtime::{ExecInterpreter, Runtime};

#[cfg(feature = "embedded")]
pub use runtime::EmbeddedPython;
