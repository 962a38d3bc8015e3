use clap::{Args, Subcommand};
use std::path::PathBuf;

use super::enums::OutputFormat;
use super::validation::parse_jobs;

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check destructors in one or more translation units
    ///
    /// Each UNIT is a JSON document describing records and destructors of one
    /// source file. The source path inside it is resolved relative to the
    /// document.
    ///
    /// Examples:
    ///   nox check build/widget.json
    ///   nox check build/*.json --fix --backup
    ///   nox check build/*.json --format json
    Check(CheckArgs),
}

/// Arguments for the check command.
///
/// Flags left off the command line fall back to `nox.config.json` and
/// `NOX_*` environment variables.
#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// Translation unit documents to check
    #[arg(value_name = "UNIT", required = true)]
    pub units: Vec<PathBuf>,

    /// Insert noexcept into the source files
    #[arg(long)]
    pub fix: bool,

    /// Keep a .bak copy of every file rewritten by --fix
    #[arg(long, requires = "fix")]
    pub backup: bool,

    /// Treat destructor bodies as potentially throwing
    ///
    /// Without this flag a user-provided destructor body is trusted when its
    /// sub-objects are non-throwing.
    #[arg(long)]
    pub body_throws: bool,

    /// Output format for diagnostics
    #[arg(short, long, value_enum, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Exit with an error when any diagnostic is reported
    #[arg(long)]
    pub warnings_as_errors: bool,

    /// Number of worker threads (defaults to one per CPU)
    #[arg(short, long, value_name = "N", value_parser = parse_jobs)]
    pub jobs: Option<usize>,

    /// Path to a config file (defaults to ./nox.config.json when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
