//! Logging infrastructure for the nox CLI.
//!
//! Structured logging through `tracing`: `--verbose` for debug output from
//! the nox crates, `--quiet` for errors only, `RUST_LOG` for anything else.
//!
//! # Example
//!
//! ```rust,no_run
//! use nox_cli::logger::init_logger;
//! use tracing::{debug, info};
//!
//! init_logger(false, false, false);
//!
//! info!("Checking units");
//! debug!("Unit: {}", "widget.json");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "nox_core=debug,nox_cli=debug";
const QUIET_FILTER: &str = "nox_core=error,nox_cli=error";
const DEFAULT_FILTER: &str = "nox_core=warn,nox_cli=info";

/// Initialize the tracing subscriber.
///
/// Call once at the start of the program, before any logging occurs.
///
/// # Verbosity Levels
///
/// 1. `--verbose`: DEBUG for the nox crates
/// 2. `--quiet`: ERROR only
/// 3. `RUST_LOG`: custom filter
/// 4. Default: INFO for the CLI, WARN for the library
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Initialize logger with a custom environment filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .compact();

    // A second initialization (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}
