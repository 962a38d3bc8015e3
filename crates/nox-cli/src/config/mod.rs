//! Configuration for `nox check` with multi-source loading.
//!
//! Merges settings from CLI args, environment variables, and config files.
//! Priority: CLI > Environment > File > Defaults

mod defaults;
mod loading;
mod validation;

use serde::{Deserialize, Serialize};

use crate::cli::OutputFormat;

pub use defaults::*;
pub use loading::{CONFIG_FILE, ENV_PREFIX};

/// Nox configuration - loaded from nox.config.json, `NOX_*` or CLI args.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NoxConfig {
    /// Output format (text, json)
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Write fix-its back to the source files
    #[serde(default)]
    pub fix: bool,

    /// Keep `.bak` copies of rewritten files (requires fix)
    #[serde(default)]
    pub backup: bool,

    /// Treat user-provided destructor bodies as potentially throwing
    #[serde(default)]
    pub body_throws: bool,

    /// Fail the run when any diagnostic is reported
    #[serde(default)]
    pub warnings_as_errors: bool,

    /// Worker threads; one per CPU when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
}

impl Default for NoxConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            fix: false,
            backup: false,
            body_throws: false,
            warnings_as_errors: false,
            jobs: None,
        }
    }
}

impl NoxConfig {
    pub fn analyzer_options(&self) -> nox_core::AnalyzerOptions {
        nox_core::AnalyzerOptions {
            body_throws: self.body_throws,
        }
    }
}
