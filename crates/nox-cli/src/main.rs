//! Nox CLI - flags C++ destructors that may throw.
//!
//! This is the main entry point for the nox binary. It handles command-line
//! argument parsing, logging initialization, and command dispatch.

use clap::Parser;
use miette::Result;
use nox_cli::{cli, commands, error, logger, ui};

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Check(check_args) => commands::check_execute(check_args, args.no_color),
    };

    result.map_err(error::cli_error_to_miette)
}
