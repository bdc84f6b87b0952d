//! Logging configuration for novahr.
//!
//! Storage failures in the keyed stores are never returned to callers, so the
//! log is the only place they surface. Everything goes to stderr; stdout is
//! reserved for tables and JSON.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Crate targets that `-v`/`-q` apply to. Dependencies stay at `warn`.
const TARGET: &str = "novahr";

/// How much of the log reaches stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Errors only, including swallowed store writes.
    Quiet,
    /// Warnings and above: corrupt stored values, failed writes.
    #[default]
    Normal,
    /// Seeding, collection rewrites and refresher ticks.
    Verbose,
    /// Every storage call.
    Trace,
}

impl Verbosity {
    /// Map the `-v` count and `-q` flag onto a level. `-q` wins.
    #[must_use]
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    /// Level applied to the `novahr` targets.
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[must_use]
    pub fn directive(self) -> String {
        let crate_level = self.level().to_string().to_lowercase();
        if self == Self::Quiet {
            format!("error,{TARGET}={crate_level}")
        } else {
            format!("warn,{TARGET}={crate_level}")
        }
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over
/// `verbosity`; later calls are no-ops.
///
/// ```no_run
/// use novahr::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::from_flags(1, false));
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbosity >= Verbosity::Verbose)
                .without_time(),
        )
        .try_init();
}

/// Initialize logging for tests.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(Verbosity::Normal.directive())
        .with_test_writer()
        .try_init();
}
