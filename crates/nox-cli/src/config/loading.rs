use crate::cli::{CheckArgs, OutputFormat};
use crate::config::NoxConfig;
use crate::error::{ConfigError, Result};
use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file picked up from the working directory.
pub const CONFIG_FILE: &str = "nox.config.json";

/// Prefix of configuration environment variables (`NOX_FIX`, `NOX_JOBS`, ...).
pub const ENV_PREFIX: &str = "NOX_";

const ENV_KEYS: &[&str] = &[
    "format",
    "fix",
    "backup",
    "body_throws",
    "warnings_as_errors",
    "jobs",
];

/// Only the flags actually given on the command line.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<OutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fix: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    backup: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body_throws: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings_as_errors: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    jobs: Option<usize>,
}

impl From<&CheckArgs> for CliOverrides {
    fn from(args: &CheckArgs) -> Self {
        Self {
            format: args.format,
            fix: args.fix.then_some(true),
            backup: args.backup.then_some(true),
            body_throws: args.body_throws.then_some(true),
            warnings_as_errors: args.warnings_as_errors.then_some(true),
            jobs: args.jobs,
        }
    }
}

/// `NOX_BODY_THROWS` becomes `bodyThrows`; other `NOX_` variables are not
/// configuration.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX)
        .only(ENV_KEYS)
        .map(|key| camel_case(key.as_str()).into())
        .lowercase(false)
}

fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c.to_ascii_lowercase());
        }
    }
    out
}

impl NoxConfig {
    /// Load configuration from multiple sources.
    /// Priority: CLI args > environment variables > config file > defaults
    ///
    /// `config_path` overrides the `nox.config.json` lookup; when given, the
    /// file must exist.
    pub fn load(args: &CheckArgs, config_path: Option<&Path>) -> Result<Self> {
        let config_file = Self::config_file(config_path)?;
        Self::figment(args, config_file.as_deref())
            .extract()
            .map_err(|e| ConfigError::from(e).into())
    }

    fn config_file(config_path: Option<&Path>) -> Result<Option<PathBuf>> {
        match config_path {
            Some(path) if !path.exists() => Err(ConfigError::NotFound(path.to_path_buf()).into()),
            Some(path) => Ok(Some(path.to_path_buf())),
            None => {
                let default_path = Path::new(CONFIG_FILE);
                Ok(default_path.exists().then(|| default_path.to_path_buf()))
            }
        }
    }

    fn figment(args: &CheckArgs, config_file: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = config_file {
            debug!(path = %path.display(), "Loading config file");
            figment = figment.merge(Json::file(path));
        }

        figment = figment.merge(env_provider());

        figment.merge(Serialized::defaults(CliOverrides::from(args)))
    }
}

#[cfg(test)]
mod tests {
    use super::camel_case;

    #[test]
    fn env_keys_become_camel_case() {
        assert_eq!(camel_case("BODY_THROWS"), "bodyThrows");
        assert_eq!(camel_case("warnings_as_errors"), "warningsAsErrors");
        assert_eq!(camel_case("JOBS"), "jobs");
    }
}
