//! Centralized API route path constants

/// API base path
pub const API_V1: &str = "/api/v1";

/// Health check endpoints
pub mod health {
    pub const HEALTH: &str = "/health";
}

/// Analyzer endpoints, relative to [`API_V1`](super::API_V1)
pub mod analyzers {
    pub const ANALYZERS: &str = "/analyzers";
    pub const ANALYZER_BY_ID: &str = "/analyzers/:id";
}
