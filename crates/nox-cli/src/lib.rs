//! Nox CLI - noexcept checks for C++ destructors.
//!
//! This crate provides the command-line interface over `nox-core`: it reads
//! translation unit documents, runs the `performance-noexcept-destructor`
//! check on them, renders the findings and optionally writes the fix-its back
//! to the source files.
//!
//! # Architecture
//!
//! - [`error`] - Error types with actionable hints
//! - [`logger`] - Structured logging with tracing
//! - [`ui`] - Status messages and the run summary
//! - `cli` - Argument definitions (clap)
//! - `config` - `nox.config.json` / environment / CLI merging (figment)
//! - `commands` - Command implementations
//!
//! # Example
//!
//! ```rust
//! use nox_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, ConfigError, Result, ResultExt};
