// Semantic checks that serde cannot express
use crate::error::{ConfigError, Result};
use crate::settings::{AppConfig, StorageBackend};

impl AppConfig {
    /// Reject configurations that would only fail later at runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be non-zero".to_string(),
            ));
        }

        if self.database.backend == StorageBackend::Postgres {
            if self.database.url.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "database.url is required for the postgres backend".to_string(),
                ));
            }
            if self.database.max_connections < self.database.min_connections {
                return Err(ConfigError::ValidationError(format!(
                    "database.max_connections ({}) is below database.min_connections ({})",
                    self.database.max_connections, self.database.min_connections
                )));
            }
        }

        if self.audit.table_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "audit.table_name must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
