//! Acting-user extraction
//!
//! Authentication happens upstream. The gateway forwards the authenticated
//! user's email in [`USER_EMAIL_HEADER`]; mutating handlers take an
//! [`AuthContext`] so history entries can name who made the change.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;

/// Header carrying the authenticated user's email
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Identity of the user performing a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub email: String,
}

impl AuthContext {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

fn extract_email(parts: &Parts) -> Result<String, ApiError> {
    let value = parts
        .headers
        .get(USER_EMAIL_HEADER)
        .ok_or_else(|| ApiError::authentication("Missing acting user"))?;

    let email = value
        .to_str()
        .map_err(|_| ApiError::authentication("Acting user header is not valid text"))?
        .trim();

    if email.is_empty() {
        return Err(ApiError::authentication("Missing acting user"));
    }

    Ok(email.to_string())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_email(parts).map(AuthContext::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    async fn extract(request: Request<()>) -> Result<AuthContext, ApiError> {
        let (mut parts, ()) = request.into_parts();
        AuthContext::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_extracts_trimmed_email() {
        let request = Request::builder()
            .header(USER_EMAIL_HEADER, " tech@lab.example ")
            .body(())
            .unwrap();

        let auth = extract(request).await.unwrap();
        assert_eq!(auth, AuthContext::new("tech@lab.example"));
    }

    #[tokio::test]
    async fn test_missing_or_blank_header_is_unauthorized() {
        let missing = extract(Request::builder().body(()).unwrap()).await.unwrap_err();
        assert_eq!(missing.status_code(), StatusCode::UNAUTHORIZED);

        let blank = Request::builder().header(USER_EMAIL_HEADER, "  ").body(()).unwrap();
        assert_eq!(extract(blank).await.unwrap_err().status_code(), StatusCode::UNAUTHORIZED);
    }
}
