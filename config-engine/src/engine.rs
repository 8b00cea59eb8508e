// Layered configuration loading
use config::{Config, Environment, File};
use tracing::debug;

use crate::error::Result;
use crate::settings::AppConfig;

/// Default environment prefix (`LABTRACK__SERVER__PORT=9000`)
pub const ENV_PREFIX: &str = "LABTRACK";

/// Builder over the configuration sources, lowest precedence first:
/// built-in defaults, an optional file, then environment variables.
#[derive(Debug, Clone)]
pub struct ConfigEngine {
    file: Option<String>,
    file_required: bool,
    env_prefix: String,
}

impl Default for ConfigEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigEngine {
    pub fn new() -> Self {
        Self {
            file: Some("labtrack".to_string()),
            file_required: false,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Load from an explicit file; a missing file is an error.
    pub fn with_file(mut self, path: impl Into<String>) -> Self {
        self.file = Some(path.into());
        self.file_required = true;
        self
    }

    pub fn without_file(mut self) -> Self {
        self.file = None;
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Merge all sources and validate the result.
    ///
    /// # Errors
    ///
    /// Fails when a source cannot be parsed, a required file is missing, or
    /// the merged configuration does not pass [`AppConfig::validate`].
    pub fn load(&self) -> Result<AppConfig> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        if let Some(path) = &self.file {
            debug!(path = %path, required = self.file_required, "Adding configuration file source");
            builder = builder.add_source(File::with_name(path).required(self.file_required));
        }

        builder = builder.add_source(
            Environment::with_prefix(&self.env_prefix)
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
