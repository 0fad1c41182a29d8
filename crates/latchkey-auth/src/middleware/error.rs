//! Error response handling.
//!
//! Implements `IntoResponse` for `AuthError`, rendering the RFC 6749
//! Section 5.2 JSON body `{error, error_description}`. 401 responses carry
//! a `WWW-Authenticate: Bearer` challenge (RFC 6750 Section 3).

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AuthError;

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, description) = error_details(&self);
        let oauth_error = self.oauth_error_code();

        if self.is_server_error() {
            tracing::error!(error = %self, "Authorization server failure");
        }

        let mut headers = HeaderMap::new();
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

        if status == StatusCode::UNAUTHORIZED {
            let www_auth = build_www_authenticate_header(&self, &description);
            if let Ok(value) = HeaderValue::from_str(&www_auth) {
                headers.insert(header::WWW_AUTHENTICATE, value);
            }
        }

        (
            status,
            headers,
            Json(oauth_error_json(oauth_error, &description)),
        )
            .into_response()
    }
}

/// Extracts the HTTP status and the client-facing description.
///
/// Infrastructure failures get a fixed description so storage and key
/// details never reach the client.
fn error_details(error: &AuthError) -> (StatusCode, String) {
    match error {
        AuthError::InvalidClient { .. } => (StatusCode::UNAUTHORIZED, error.to_string()),
        AuthError::InvalidRedirectUri
        | AuthError::UnsupportedResponseType { .. }
        | AuthError::InvalidPkceParams { .. }
        | AuthError::UnsupportedGrantType { .. }
        | AuthError::InvalidAuthorizationCode
        | AuthError::InvalidCodeVerifier
        | AuthError::InvalidRefreshToken
        | AuthError::UnauthorizedClient { .. }
        | AuthError::MalformedCredentials { .. }
        | AuthError::InvalidRegistration { .. } => (StatusCode::BAD_REQUEST, error.to_string()),
        AuthError::MalformedToken { .. } => (
            StatusCode::UNAUTHORIZED,
            "The access token is malformed".to_string(),
        ),
        AuthError::SignatureInvalid | AuthError::TokenExpired | AuthError::MissingCredentials => {
            (StatusCode::UNAUTHORIZED, error.to_string())
        }
        AuthError::NotFound { .. } => (StatusCode::NOT_FOUND, error.to_string()),
        AuthError::Storage { .. } | AuthError::Internal { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "The server encountered an unexpected error".to_string(),
        ),
    }
}

/// Builds the `WWW-Authenticate` challenge.
///
/// A request without credentials gets a bare challenge (RFC 6750 Section 3.1).
fn build_www_authenticate_header(error: &AuthError, description: &str) -> String {
    if matches!(error, AuthError::MissingCredentials) {
        return "Bearer realm=\"latchkey\"".to_string();
    }
    let escaped_desc = description.replace('"', "\\\"");
    format!(
        "Bearer realm=\"latchkey\", error=\"{}\", error_description=\"{}\"",
        error.oauth_error_code(),
        escaped_desc
    )
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Creates an OAuth 2.0 error body.
#[must_use]
pub fn oauth_error_json(error: &str, description: &str) -> serde_json::Value {
    json!({
        "error": error,
        "error_description": description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_grant_error_response() {
        let response = AuthError::InvalidAuthorizationCode.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());

        let body = body_json(response).await;
        assert_eq!(body["error"], "invalid_grant");
        assert_eq!(body["error_description"], "Invalid authorization code");
    }

    #[tokio::test]
    async fn test_token_error_has_challenge() {
        let response = AuthError::TokenExpired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let challenge = response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(challenge.starts_with("Bearer realm=\"latchkey\""));
        assert!(challenge.contains("error=\"invalid_token\""));
    }

    #[tokio::test]
    async fn test_missing_credentials_bare_challenge() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer realm=\"latchkey\""
        );
    }

    #[tokio::test]
    async fn test_server_error_hides_cause() {
        let response = AuthError::storage("connection refused to 10.0.0.5").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "server_error");
        assert!(
            !body["error_description"]
                .as_str()
                .unwrap()
                .contains("10.0.0.5")
        );
    }

    #[test]
    fn test_oauth_error_json() {
        let body = oauth_error_json("invalid_request", "bad");
        assert_eq!(body["error"], "invalid_request");
        assert_eq!(body["error_description"], "bad");
    }
}
