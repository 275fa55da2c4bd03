//! Tracing subscriber setup.
//!
//! Filtering follows `MDNAV_LOG` (same syntax as `RUST_LOG`), defaulting to
//! `info`. The TUI owns the terminal, so it only logs when given a file;
//! the one-shot CLI modes log to stderr.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "MDNAV_LOG";

/// Where log lines go.
pub enum LogTarget<'a> {
    /// Discard everything
    Off,
    Stderr,
    File(&'a Path),
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber for `target`.
pub fn init(target: LogTarget<'_>) -> Result<()> {
    match target {
        LogTarget::Off => Ok(()),
        LogTarget::Stderr => {
            let fmt_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
            tracing_subscriber::registry()
                .with(fmt_layer)
                .with(env_filter())
                .try_init()
                .context("failed to install tracing subscriber")
        }
        LogTarget::File(path) => {
            let log_file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            let fmt_layer = fmt::layer().with_writer(Arc::new(log_file)).with_ansi(false);
            tracing_subscriber::registry()
                .with(fmt_layer)
                .with(env_filter())
                .try_init()
                .context("failed to install tracing subscriber")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_off_installs_nothing() {
        assert!(init(LogTarget::Off).is_ok());
    }

    #[test]
    fn test_unwritable_log_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("mdnav.log");
        let err = init(LogTarget::File(&path)).unwrap_err();
        assert!(err.to_string().contains("failed to create log file"));
    }
}
