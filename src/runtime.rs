//! The program the launcher hands control to once the library path is right.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::config::DEFAULT_INTERPRETER;
use crate::error::LaunchError;

/// Entry point of the program being launched.
pub trait Runtime {
    /// Runs the program in this process with `argv` and returns its exit
    /// status.
    fn enter(&self, argv: &[OsString]) -> Result<i32, LaunchError>;
}

/// Runs the bundled interpreter binary in place of the launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecInterpreter {
    program: PathBuf,
}

impl ExecInterpreter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The interpreter at the path baked in at build time.
    pub fn bundled() -> Self {
        Self::new(DEFAULT_INTERPRETER)
    }

    fn failed(&self, source: io::Error) -> LaunchError {
        LaunchError::Runtime {
            entry: self.program.display().to_string(),
            source,
        }
    }

    /// Refuses a program that is this launcher itself. Entering it would find
    /// the search path already fixed and exec the same program again, forever.
    fn ensure_not_self(&self) -> Result<(), LaunchError> {
        // A program that cannot be resolved is left for exec to report.
        let Ok(program) = fs::canonicalize(&self.program) else {
            return Ok(());
        };
        let own = crate::platform::resolve_self_path()?;
        let own = fs::canonicalize(&own).unwrap_or(own);
        if program == own {
            return Err(self.failed(io::Error::new(
                io::ErrorKind::InvalidInput,
                "interpreter is the launcher itself",
            )));
        }
        Ok(())
    }
}

#[cfg(unix)]
impl Runtime for ExecInterpreter {
    fn enter(&self, argv: &[OsString]) -> Result<i32, LaunchError> {
        use std::os::unix::process::CommandExt;
        use std::process::Command;

        self.ensure_not_self()?;
        tracing::debug!(program = %self.program.display(), "exec interpreter");
        let mut cmd = Command::new(&self.program);
        if let Some((arg0, rest)) = argv.split_first() {
            cmd.arg0(arg0).args(rest);
        }
        Err(self.failed(cmd.exec()))
    }
}

#[cfg(windows)]
impl Runtime for ExecInterpreter {
    fn enter(&self, argv: &[OsString]) -> Result<i32, LaunchError> {
        use std::process::Command;

        self.ensure_not_self()?;
        tracing::debug!(program = %self.program.display(), "spawn interpreter");
        let status = Command::new(&self.program)
            .args(argv.iter().skip(1))
            .status()
            .map_err(|e| self.failed(e))?;
        Ok(status.code().unwrap_or(1))
    }
}

/// The interpreter linked into this binary, entered through its C main.
#[cfg(feature = "embedded")]
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedPython;

#[cfg(all(feature = "embedded", unix))]
mod ffi {
    use std::ffi::{c_char, c_int};

    extern "C" {
        pub fn Py_BytesMain(argc: c_int, argv: *mut *mut c_char) -> c_int;
    }
}

#[cfg(all(feature = "embedded", windows))]
mod ffi {
    use std::ffi::c_int;

    extern "C" {
        pub fn Py_Main(argc: c_int, argv: *mut *mut u16) -> c_int;
    }
}

#[cfg(feature = "embedded")]
fn argc(argv: &[OsString]) -> Result<std::ffi::c_int, LaunchError> {
    std::ffi::c_int::try_from(argv.len()).map_err(|_| LaunchError::Runtime {
        entry: "python".to_string(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "too many arguments"),
    })
}

#[cfg(all(feature = "embedded", unix))]
impl Runtime for EmbeddedPython {
    fn enter(&self, argv: &[OsString]) -> Result<i32, LaunchError> {
        use std::ffi::{c_char, CString};
        use std::os::unix::ffi::OsStrExt;

        let args = argv
            .iter()
            .map(|arg| CString::new(arg.as_bytes()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| LaunchError::Runtime {
                entry: "Py_BytesMain".to_string(),
                source: io::Error::new(io::ErrorKind::InvalidInput, e),
            })?;
        let mut ptrs: Vec<*mut c_char> = args
            .iter()
            .map(|arg| arg.as_ptr() as *mut c_char)
            .chain(std::iter::once(std::ptr::null_mut()))
            .collect();

        let argc = argc(argv)?;
        tracing::debug!(argc, "entering Py_BytesMain");
        // SAFETY: `ptrs` is a NULL-terminated array of `argc` NUL-terminated
        // strings owned by `args`, both alive for the whole call.
        let status = unsafe { ffi::Py_BytesMain(argc, ptrs.as_mut_ptr()) };
        Ok(status)
    }
}

#[cfg(all(feature = "embedded", windows))]
impl Runtime for EmbeddedPython {
    fn enter(&self, argv: &[OsString]) -> Result<i32, LaunchError> {
        use std::os::windows::ffi::OsStrExt;

        let mut args: Vec<Vec<u16>> = argv
            .iter()
            .map(|arg| arg.encode_wide().chain(std::iter::once(0)).collect())
            .collect();
        let mut ptrs: Vec<*mut u16> = args
            .iter_mut()
            .map(|arg| arg.as_mut_ptr())
            .chain(std::iter::once(std::ptr::null_mut()))
            .collect();

        let argc = argc(argv)?;
        tracing::debug!(argc, "entering Py_Main");
        // SAFETY: `ptrs` is a NULL-terminated array of `argc` NUL-terminated
        // wide strings owned by `args`, both alive for the whole call.
        let status = unsafe { ffi::Py_Main(argc, ptrs.as_mut_ptr()) };
        Ok(status)
    }
}
