//! Command-line interface definition for nox.
//!
//! # Command Structure
//!
//! - `nox check <UNIT.json>...` - Run the noexcept destructor check

mod commands;
pub mod enums;
mod validation;

use clap::Parser;

pub use commands::{CheckArgs, Command};
pub use enums::*;
pub use validation::parse_jobs;

/// Nox - flags C++ destructors that may throw
#[derive(Parser, Debug)]
#[command(
    name = "nox",
    version,
    about = "Flags C++ destructors that may throw and adds noexcept",
    long_about = "Nox reads translation unit documents produced by a C++ front-end,\n\
                  decides for every destructor whether it can throw, and reports the ones\n\
                  that should be marked noexcept. With --fix it inserts the specifier."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
