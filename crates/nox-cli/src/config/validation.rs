use crate::config::NoxConfig;
use crate::error::{ConfigError, Result};

impl NoxConfig {
    /// Validate configuration for logical consistency.
    pub fn validate(&self) -> Result<()> {
        if self.jobs == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "jobs".to_string(),
                value: "0".to_string(),
                hint: "Use at least one worker, or leave jobs unset for one per CPU".to_string(),
            }
            .into());
        }

        if self.backup && !self.fix {
            return Err(ConfigError::ConflictingOptions(
                "backup requires fix; nothing is rewritten without it".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
