pub mod paths;

use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    handlers::{analyzers, health},
    server::LabTrackServer,
};

/// Create health check routes
pub fn health_routes() -> Router<LabTrackServer> {
    Router::new().route(paths::health::HEALTH, get(health::health_check))
}

/// Create analyzer management routes
pub fn analyzer_routes() -> Router<LabTrackServer> {
    Router::new()
        .route(
            paths::analyzers::ANALYZERS,
            post(analyzers::create_analyzer)
                .get(analyzers::list_analyzers)
                .patch(analyzers::update_analyzers),
        )
        .route(
            paths::analyzers::ANALYZER_BY_ID,
            get(analyzers::get_analyzer)
                .put(analyzers::update_analyzer)
                .delete(analyzers::delete_analyzer),
        )
}

/// Create API v1 routes
pub fn api_v1_routes() -> Router<LabTrackServer> {
    Router::new().merge(analyzer_routes())
}

/// Create all application routes
pub fn create_routes() -> Router<LabTrackServer> {
    Router::new()
        // Health check routes (no acting user required)
        .merge(health_routes())
        .nest(paths::API_V1, api_v1_routes())
}
