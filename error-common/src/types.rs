use thiserror::Error;

/// Process-level error enum shared by binaries and startup code
#[derive(Error, Debug)]
pub enum LabTrackError {
    /// Network communication errors
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Server runtime errors
    #[error("Server error: {0}")]
    ServerError(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LabTrackError {
    /// Stable error code for this error category
    pub fn code(&self) -> &'static str {
        match self {
            LabTrackError::NetworkError(_) | LabTrackError::ServerError(_) => {
                crate::codes::system::INTERNAL
            }
            LabTrackError::DatabaseError(_) => crate::codes::database::QUERY_FAILED,
            LabTrackError::ConfigError(_) => crate::codes::validation::INVALID_INPUT,
            LabTrackError::Other(_) => crate::codes::system::INTERNAL,
        }
    }
}

/// Result type alias for LabTrack operations
pub type Result<T> = std::result::Result<T, LabTrackError>;

/// Async logging function for errors
pub async fn log_error(context: &str, error: &LabTrackError) {
    tracing::error!(
        context = context,
        error_code = error.code(),
        error = %error,
        "LabTrack error occurred"
    );
}
