use clap::{Parser, ValueEnum};
use colored::Colorize;
use config_engine::{AppConfig, ConfigEngine, StorageBackend};
use std::io::IsTerminal;
use std::net::SocketAddr;
use tracing::{info, warn};

use error_common::{log_error, LabTrackError, Result};
use labtrack_server::{create_app, LabTrackServer, Stores};

/// Storage backend override
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    Postgres,
    Memory,
}

impl From<Backend> for StorageBackend {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Postgres => StorageBackend::Postgres,
            Backend::Memory => StorageBackend::Memory,
        }
    }
}

/// LabTrack Engine HTTP Server
#[derive(Parser, Debug)]
#[command(name = "labtrack-server")]
#[command(about = "Laboratory analyzer tracking API with audit history")]
struct Args {
    /// Server bind address
    #[arg(long, env = "LABTRACK_HOST")]
    host: Option<String>,

    /// Server port
    #[arg(short, long, env = "LABTRACK_PORT")]
    port: Option<u16>,

    /// Configuration file path (yaml or toml); `labtrack.*` is used when present
    #[arg(short, long, env = "LABTRACK_CONFIG")]
    config: Option<String>,

    /// Storage backend
    #[arg(long, value_enum, env = "LABTRACK_STORAGE")]
    storage: Option<Backend>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn load_config(&self) -> Result<AppConfig> {
        let engine = match &self.config {
            Some(path) => ConfigEngine::new().with_file(path.as_str()),
            None => ConfigEngine::new(),
        };

        let mut config = engine
            .load()
            .map_err(|e| LabTrackError::ConfigError(e.to_string()))?;

        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(storage) = self.storage {
            config.database.backend = storage.into();
        }
        if self.verbose {
            config.logging.log_level = "debug".to_string();
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal outside development
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let config = args.load_config()?;

    logger_redacted::init(&config.logging)
        .map_err(|e| LabTrackError::ConfigError(e.to_string()))?;

    if config.server.is_development() && std::io::stdout().is_terminal() {
        print_startup_banner();
    }

    if let Err(e) = run(config).await {
        log_error("labtrack-server", &e).await;
        return Err(e);
    }

    Ok(())
}

async fn run(config: AppConfig) -> Result<()> {
    info!("🔬 {}", "Starting LabTrack Engine HTTP Server".bright_cyan());
    info!("📋 Version: {}", env!("CARGO_PKG_VERSION").bright_white());
    info!("🌍 Environment: {}", config.server.environment.bright_white());

    let stores = Stores::from_config(&config)
        .await
        .map_err(|e| LabTrackError::DatabaseError(e.to_string()))?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| LabTrackError::ConfigError(format!("Invalid bind address: {e}")))?;

    let (server, audit_worker) = LabTrackServer::new(config, &stores);
    info!("💾 Storage backend: {}", server.backend_name().bright_white());

    let app = create_app(server.clone());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| LabTrackError::NetworkError(format!("Failed to bind to {addr}: {e}")))?;

    info!("🚀 {}", format!("LabTrack Engine server running on http://{addr}").bright_green());
    info!("📋 {}", format!("Health check available at: http://{addr}/health").bright_blue());
    info!("📋 {}", format!("API v1 available at: http://{addr}/api/v1/analyzers").bright_blue());

    let http_result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| LabTrackError::ServerError(format!("HTTP server error: {e}")));

    // The worker drains once the last handle on the history queue is gone
    info!("Draining audit history queue");
    if let Err(e) = server.analyzers.audit().flush().await {
        warn!(error = %e, "Audit history queue already closed");
    }
    drop(server);
    audit_worker.shutdown().await;

    if let Some(pool) = &stores.pool {
        pool.close().await;
    }

    info!("👋 {}", "LabTrack Engine stopped".bright_cyan());
    http_result
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}

fn print_startup_banner() {
    println!("{}", "╔══════════════════════════════════════════════════════════════╗".bright_cyan());
    println!("{}", "║                      🔬 LABTRACK ENGINE                      ║".bright_cyan());
    println!("{}", "║            Laboratory Analyzer Tracking & Audit API          ║".bright_cyan());
    println!("{}", "╚══════════════════════════════════════════════════════════════╝".bright_cyan());
    println!();
}
