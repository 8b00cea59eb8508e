//! Request and response bodies specific to the analyzer endpoints

use database_layer::AnalyzerPatch;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `PATCH /analyzers`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateManyRequest {
    #[serde(default)]
    pub ids: Vec<Uuid>,
    #[serde(default)]
    pub properties: AnalyzerPatch,
}

/// Acknowledgement returned by the update endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorCodeResponse {
    pub error_code: i32,
}

impl ErrorCodeResponse {
    pub fn ok() -> Self {
        Self { error_code: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_many_defaults_to_empty() {
        let request: UpdateManyRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.ids.is_empty());
        assert!(request.properties.is_empty());
    }

    #[test]
    fn test_ok_response_shape() {
        assert_eq!(serde_json::to_value(ErrorCodeResponse::ok()).unwrap(), json!({"error_code": 0}));
    }
}
