use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How diagnostics are written to stdout
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Rendered diagnostics with source snippets
    #[default]
    #[value(name = "text")]
    Text,

    /// One JSON array of per-unit reports
    ///
    /// Stable output for editors and CI tooling.
    #[value(name = "json")]
    Json,
}
