//! Tracing helpers
// (c) 2024 Ross Younger

use std::{
    fs::File,
    io::Write,
    path::Path,
    sync::{Arc, Mutex},
};

use anyhow::Context;
use indicatif::MultiProgress;
use tracing_subscriber::{fmt, fmt::time::ChronoLocal, prelude::*, EnvFilter, Layer};

const STANDARD_ENV_VAR: &str = "RUST_LOG";
const LOG_FILE_DETAIL_ENV_VAR: &str = "RUST_LOG_FILE_DETAIL";

/// How chatty we are when `RUST_LOG` does not say otherwise
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    /// Progress and results
    #[default]
    Normal,
    /// Everything, including skipped entries and per-file detail
    Debug,
}

impl Verbosity {
    /// Selects a verbosity from the usual pair of CLI flags. `debug` wins.
    #[must_use]
    pub fn from_flags(debug: bool, quiet: bool) -> Self {
        if debug {
            Verbosity::Debug
        } else if quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        }
    }

    fn level(self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "info",
            Verbosity::Debug => "debug",
        }
    }
}

/// Result type for `filter_for()`
struct FilterResult {
    filter: EnvFilter,
    used_env: bool, // Did we use the environment variable we were requested to?
}

/// Uses the given environment variable if set; otherwise logs only our own events at the verbosity's level.
/// A variable that is set but unparseable is an error, not a silent fallback.
fn filter_for(verbosity: Verbosity, key: &str) -> anyhow::Result<FilterResult> {
    match EnvFilter::try_from_env(key) {
        Ok(filter) => Ok(FilterResult {
            filter,
            used_env: true,
        }),
        Err(e) if std::env::var(key).is_ok() => {
            anyhow::bail!("{key} (set in environment) was invalid: {e}")
        }
        Err(_) => Ok(FilterResult {
            filter: EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), verbosity.level())),
            used_env: false,
        }),
    }
}

/// Sets up tracing to the console (through `display`, so progress bars stay intact)
/// and optionally to a log file.
///
/// `RUST_LOG` overrides the console filter; `RUST_LOG_FILE_DETAIL` overrides the file filter.
///
/// **CAUTION:** If this function fails, tracing won't be set up; callers must take extra care to report the error.
pub fn setup(
    verbosity: Verbosity,
    display: &MultiProgress,
    log_file: Option<&Path>,
) -> anyhow::Result<()> {
    let mut layers = Vec::new();

    let console = filter_for(verbosity, STANDARD_ENV_VAR)?;
    // Targets are only interesting when the user asked for events from other crates.
    layers.push(
        fmt::layer()
            .compact()
            .with_target(console.used_env)
            .with_writer(ProgressWriter::wrap(display))
            .with_filter(console.filter)
            .boxed(),
    );

    if let Some(path) = log_file {
        let out_file = Arc::new(
            File::create(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?,
        );
        let file_filter = if std::env::var(LOG_FILE_DETAIL_ENV_VAR).is_ok() {
            FilterResult {
                filter: EnvFilter::try_from_env(LOG_FILE_DETAIL_ENV_VAR)?,
                used_env: true,
            }
        } else {
            filter_for(verbosity, STANDARD_ENV_VAR)?
        };
        layers.push(
            fmt::layer()
                .with_writer(out_file)
                .with_timer(ChronoLocal::rfc_3339())
                .with_target(file_filter.used_env)
                .compact()
                .with_ansi(false)
                .with_filter(file_filter.filter)
                .boxed(),
        );
    }

    tracing_subscriber::registry().with(layers).init();
    Ok(())
}

/// A wrapper type so tracing can output in a way that doesn't mess up `MultiProgress`
struct ProgressWriter {
    display: MultiProgress,
}

impl ProgressWriter {
    fn wrap(display: &MultiProgress) -> Mutex<Self> {
        Mutex::new(Self {
            display: display.clone(),
        })
    }
}

impl Write for ProgressWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let msg = std::str::from_utf8(buf)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        if self.display.is_hidden() {
            eprint!("{msg}");
        } else {
            // println supplies its own newline
            self.display.println(msg.trim_end_matches('\n'))?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::Verbosity;

    #[test]
    fn flags() {
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(true, false), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Debug);
    }

    #[test]
    fn levels() {
        assert_eq!(Verbosity::Quiet.level(), "error");
        assert_eq!(Verbosity::default().level(), "info");
        assert_eq!(Verbosity::Debug.level(), "debug");
    }
}
