//! Log output for the command-line front end.
//!
//! The library logs through the `log` facade. The binary installs a
//! `tracing-subscriber` formatter writing to stderr, which also receives
//! `log` records. `-v` and `-q` pick the default level; the
//! `PACKWRIGHT_LOG` variable overrides it with a full filter directive such
//! as `packwright::publish=trace`.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Environment variable holding a filter directive.
pub const LOG_ENV: &str = "PACKWRIGHT_LOG";

/// Error returned when a global subscriber is already installed.
pub type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Map the `-v` count and `-q` flag to a level filter.
///
/// `quiet` wins over any verbosity.
#[must_use]
pub fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Build the event filter: [`LOG_ENV`] when set, else the flag level.
#[must_use]
pub fn env_filter(verbosity: u8, quiet: bool) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level_filter(verbosity, quiet).into())
        .with_env_var(LOG_ENV)
        .from_env_lossy()
}

/// Install the stderr subscriber.
///
/// # Errors
///
/// Returns [`InitError`] if a global subscriber or logger is already set.
pub fn init(verbosity: u8, quiet: bool) -> Result<(), InitError> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity, quiet))
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .try_init()
}
