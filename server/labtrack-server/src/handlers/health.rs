use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::server::LabTrackServer;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall system health status
    pub status: String,
    /// Current timestamp in RFC3339 format
    pub timestamp: String,
    /// API version
    pub version: String,
    /// Seconds since the server state was built
    pub uptime: u64,
    /// Individual service health checks
    pub checks: HashMap<String, String>,
}

/// Health check handler
///
/// `200` when the analyzer store answers, `503` otherwise.
pub async fn health_check(State(server): State<LabTrackServer>) -> (StatusCode, Json<HealthResponse>) {
    let store_healthy = server.analyzers.is_healthy().await;

    let mut checks = HashMap::new();
    checks.insert(
        "analyzer_store".to_string(),
        if store_healthy { "healthy" } else { "unhealthy" }.to_string(),
    );
    checks.insert("storage_backend".to_string(), server.backend_name().to_string());

    let (status_code, status) = if store_healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    let response = HealthResponse {
        status: status.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: server.uptime().as_secs(),
        checks,
    };

    (status_code, Json(response))
}
