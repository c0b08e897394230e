//! Logging setup
//!
//! Installs a `tracing-subscriber` formatter filtered by `RUST_LOG`. Without
//! `RUST_LOG` the level is `info`, or `debug` when verbose output was asked
//! for. Log lines go to stderr so they never mix with game output.

use super::error::{AppError, AppResult};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Install the global subscriber; fails if one is already installed
pub fn init_logging(verbose: bool) -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logging {
            message: e.to_string(),
        })
}
