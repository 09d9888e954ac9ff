//! The process environment as a plain value.
//!
//! The launcher never writes to its own environment. It reads the inherited
//! block once, derives a new block from it and hands that to the exec call.

use std::env;
use std::ffi::{OsStr, OsString};

/// Ordered `NAME=VALUE` entries, in the order they were inherited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: Vec<(OsString, OsString)>,
}

impl Environment {
    /// Snapshot of the environment this process was started with.
    pub fn inherited() -> Self {
        env::vars_os().collect()
    }

    pub fn get(&self, name: impl AsRef<OsStr>) -> Option<&OsStr> {
        let name = name.as_ref();
        self.vars
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_os_str())
    }

    /// Returns this block with `name` set to `value`.
    ///
    /// The first entry for `name` keeps its position and any later duplicates
    /// are dropped, so exec sees exactly one value. A new name goes at the end.
    pub fn with_var(mut self, name: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        let name = name.into();
        let mut value = Some(value.into());
        self.vars.retain_mut(|(key, current)| {
            if *key != name {
                return true;
            }
            match value.take() {
                Some(value) => {
                    *current = value;
                    true
                }
                None => false,
            }
        });
        if let Some(value) = value {
            self.vars.push((name, value));
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars
            .iter()
            .map(|(key, value)| (key.as_os_str(), value.as_os_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Environment
where
    K: Into<OsString>,
    V: Into<OsString>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
