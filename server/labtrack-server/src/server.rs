use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use audit_engine::{AuditTrail, AuditWorker};
use config_engine::{AppConfig, StorageBackend};
use database_layer::{
    AnalyzerStore, DatabasePool, HistoryStore, MemoryAnalyzerStore, MemoryHistoryStore,
    MemoryTableRegistry, PgAnalyzerStore, PgHistoryStore, PgTableRegistry, TableRegistry,
};
use tracing::info;

use crate::services::AnalyzerService;

/// Backing stores the server runs on
#[derive(Clone)]
pub struct Stores {
    pub analyzers: Arc<dyn AnalyzerStore>,
    pub tables: Arc<dyn TableRegistry>,
    pub history: Arc<dyn HistoryStore>,
    /// Present for the PostgreSQL backend so shutdown can close it
    pub pool: Option<DatabasePool>,
}

impl Stores {
    /// Process-local stores with `table_name` registered for history
    pub fn in_memory(table_name: &str) -> Self {
        Self {
            analyzers: Arc::new(MemoryAnalyzerStore::new()),
            tables: Arc::new(MemoryTableRegistry::with_tables(&[table_name])),
            history: Arc::new(MemoryHistoryStore::new()),
            pool: None,
        }
    }

    /// PostgreSQL stores sharing one pool
    pub fn postgres(pool: DatabasePool) -> Self {
        let pg = pool.pool().clone();
        Self {
            analyzers: Arc::new(PgAnalyzerStore::new(pg.clone())),
            tables: Arc::new(PgTableRegistry::new(pg.clone())),
            history: Arc::new(PgHistoryStore::new(pg)),
            pool: Some(pool),
        }
    }

    /// Build the stores selected by `config.database.backend`
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        match config.database.backend {
            StorageBackend::Memory => {
                info!("Using in-memory storage backend");
                Ok(Self::in_memory(&config.audit.table_name))
            }
            StorageBackend::Postgres => {
                let pool = DatabasePool::connect(&config.database).await?;
                if config.database.run_migrations {
                    pool.migrate().await?;
                }
                Ok(Self::postgres(pool))
            }
        }
    }
}

/// Main LabTrack server state
#[derive(Clone)]
pub struct LabTrackServer {
    /// Loaded configuration
    pub config: Arc<AppConfig>,
    /// Analyzer operations
    pub analyzers: AnalyzerService,
    started_at: Instant,
}

impl LabTrackServer {
    /// Wire the service onto `stores` and start the history worker.
    ///
    /// Must be called inside a tokio runtime. The returned worker finishes
    /// once every clone of the server state has been dropped.
    pub fn new(config: AppConfig, stores: &Stores) -> (Self, AuditWorker) {
        let (audit, worker) = AuditTrail::spawn(
            config.audit.table_name.clone(),
            Arc::clone(&stores.tables),
            Arc::clone(&stores.history),
        );

        let server = Self {
            config: Arc::new(config),
            analyzers: AnalyzerService::new(Arc::clone(&stores.analyzers), audit),
            started_at: Instant::now(),
        };

        (server, worker)
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn backend_name(&self) -> &'static str {
        match self.config.database.backend {
            StorageBackend::Postgres => "postgres",
            StorageBackend::Memory => "memory",
        }
    }
}
