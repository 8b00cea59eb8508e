// Typed configuration sections
use logger_redacted::LoggerConfig;
use serde::{Deserialize, Serialize};

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub audit: AuditSettings,
    pub logging: LoggerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind address
    pub host: String,
    pub port: u16,
    /// Deployment environment name (`development`, `staging`, `production`)
    pub environment: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            environment: "development".to_string(),
        }
    }
}

impl ServerSettings {
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

/// Which store implementation backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    /// Process-local maps; data is lost on restart
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub backend: StorageBackend,
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Apply pending migrations at startup
    pub run_migrations: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Postgres,
            url: "postgresql://localhost:5432/labtrack".to_string(),
            max_connections: 20,
            min_connections: 2,
            acquire_timeout_secs: 30,
            run_migrations: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSettings {
    /// Table registry name that tags analyzer history entries
    pub table_name: String,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            table_name: "analyzers".to_string(),
        }
    }
}
