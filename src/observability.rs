//! Opt-in diagnostics for the launcher itself.
//!
//! Nothing is installed unless `PYTHON_LAUNCHER_LOG` is set, so the
//! interpreter's stderr stays clean by default. The variable holds an
//! `EnvFilter` directive such as `debug` or `python_launcher=trace`.

use std::env;
use std::io;

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::{prelude::*, EnvFilter};

pub const LOG_ENV: &str = "PYTHON_LAUNCHER_LOG";

pub fn init_tracing() {
    let Some(directive) = env::var_os(LOG_ENV) else {
        return;
    };
    let directive = directive.to_string_lossy().into_owned();
    let (filter, rejected) = filter_for(&directive);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false),
        )
        .try_init();

    if let Some(err) = rejected {
        tracing::warn!(directive = %directive, error = %err, "invalid {}, logging at debug", LOG_ENV);
    }
}

/// Filter for `directive`, falling back to `debug` and handing back the
/// parse error when the directive is invalid.
fn filter_for(directive: &str) -> (EnvFilter, Option<ParseError>) {
    match EnvFilter::try_new(directive) {
        Ok(filter) => (filter, None),
        Err(err) => (EnvFilter::new("debug"), Some(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_directive_is_used() {
        let (filter, rejected) = filter_for("python_launcher=trace");
        assert!(rejected.is_none());
        assert_eq!(filter.to_string(), "python_launcher=trace");
    }

    #[test]
    fn invalid_directive_is_reported() {
        let (filter, rejected) = filter_for("python_launcher=loudest");
        assert!(rejected.is_some());
        assert_eq!(filter.to_string(), "debug");
    }
}
