//! Reading and rewriting the dynamic loader's search path.
//!
//! Values are compared as raw bytes; nothing here assumes UTF-8.

use std::ffi::{OsStr, OsString};

use crate::config::SEPARATOR;
use crate::environment::Environment;
use crate::error::LaunchError;

/// Current value of `variable`, or `None` when it is unset.
pub fn current_library_search_path<'a>(env: &'a Environment, variable: &str) -> Option<&'a OsStr> {
    env.get(variable)
}

/// Whether `current` still lacks `lib_dir` as its first entry.
///
/// Only a value starting with exactly `<lib_dir>:` is accepted. This check is
/// the only thing that stops a relaunched process from relaunching again.
pub fn needs_rewrite(current: Option<&OsStr>, lib_dir: &OsStr) -> bool {
    let Some(current) = current else {
        return true;
    };
    let has_prefix = current
        .as_encoded_bytes()
        .strip_prefix(lib_dir.as_encoded_bytes())
        .is_some_and(|rest| rest.starts_with(SEPARATOR.as_bytes()));
    !has_prefix
}

/// `<lib_dir>:` followed by `current`, or by nothing when unset.
pub fn build_rewritten_value(
    current: Option<&OsStr>,
    lib_dir: &OsStr,
) -> Result<OsString, LaunchError> {
    let current = current.unwrap_or_default();
    let requested = lib_dir.len() + SEPARATOR.len() + current.len();

    let mut value = OsString::new();
    value
        .try_reserve_exact(requested)
        .map_err(|source| LaunchError::Allocation {
            what: "library search path",
            requested,
            source,
        })?;
    value.push(lib_dir);
    value.push(SEPARATOR);
    value.push(current);
    Ok(value)
}
