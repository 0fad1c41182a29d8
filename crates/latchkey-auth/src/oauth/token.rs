//! Token endpoint types.
//!
//! # Supported Grant Types
//!
//! - `authorization_code` - Exchange an authorization code and PKCE verifier
//! - `refresh_token` - Rotate a refresh token

use serde::{Deserialize, Serialize};

/// Token request parameters.
///
/// Different fields are required depending on the `grant_type`:
///
/// - `authorization_code`: code, code_verifier
/// - `refresh_token`: refresh_token
///
/// `client_id`, when present, must name the client the grant was issued
/// to. `redirect_uri` and `client_secret` are accepted for compatibility
/// and not interpreted here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenRequest {
    /// OAuth 2.0 grant type.
    #[serde(default)]
    pub grant_type: String,

    /// Authorization code (for authorization_code grant).
    #[serde(default)]
    pub code: Option<String>,

    /// Redirect URI used in the authorization request.
    #[serde(default)]
    pub redirect_uri: Option<String>,

    /// Client ID.
    #[serde(default)]
    pub client_id: Option<String>,

    /// Client secret (client_secret_post).
    #[serde(default)]
    pub client_secret: Option<String>,

    /// PKCE code verifier (for authorization_code grant).
    #[serde(default)]
    pub code_verifier: Option<String>,

    /// Refresh token (for refresh_token grant).
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl TokenRequest {
    /// Builds an `authorization_code` grant request.
    #[must_use]
    pub fn authorization_code(code: impl Into<String>, code_verifier: impl Into<String>) -> Self {
        Self {
            grant_type: "authorization_code".to_string(),
            code: Some(code.into()),
            code_verifier: Some(code_verifier.into()),
            ..Self::default()
        }
    }

    /// Builds a `refresh_token` grant request.
    #[must_use]
    pub fn refresh_token(refresh_token: impl Into<String>) -> Self {
        Self {
            grant_type: "refresh_token".to_string(),
            refresh_token: Some(refresh_token.into()),
            ..Self::default()
        }
    }

    /// Sets the client ID.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }
}

/// Successful token response.
///
/// # Example Response
///
/// ```json
/// {
///   "access_token": "eyJhbG...",
///   "token_type": "Bearer",
///   "expires_in": 3600,
///   "refresh_token": "abc123..."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The access token (JWT).
    pub access_token: String,

    /// Token type, always "Bearer".
    pub token_type: String,

    /// Access token lifetime in seconds.
    pub expires_in: u64,

    /// The refresh token replacing any previous one. Absent for clients not
    /// registered for the `refresh_token` grant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl TokenResponse {
    /// Creates a new bearer token response.
    #[must_use]
    pub fn new(access_token: String, refresh_token: Option<String>, expires_in: u64) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            refresh_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_style_request_parses() {
        let json = r#"{
            "grant_type": "authorization_code",
            "code": "abc",
            "redirect_uri": "https://app/cb",
            "client_id": "client",
            "code_verifier": "verifier"
        }"#;
        let request: TokenRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.grant_type, "authorization_code");
        assert_eq!(request.code.as_deref(), Some("abc"));
        assert!(request.refresh_token.is_none());
    }

    #[test]
    fn test_missing_grant_type_is_empty() {
        let request: TokenRequest = serde_json::from_str("{}").unwrap();
        assert!(request.grant_type.is_empty());
    }

    #[test]
    fn test_builders() {
        let request = TokenRequest::authorization_code("c", "v").with_client_id("id");
        assert_eq!(request.grant_type, "authorization_code");
        assert_eq!(request.client_id.as_deref(), Some("id"));

        let request = TokenRequest::refresh_token("r");
        assert_eq!(request.grant_type, "refresh_token");
        assert_eq!(request.refresh_token.as_deref(), Some("r"));
    }

    #[test]
    fn test_response_shape() {
        let response = TokenResponse::new("at".into(), Some("rt".into()), 3600);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["token_type"], "Bearer");
        assert_eq!(json["expires_in"], 3600);
        assert_eq!(json["refresh_token"], "rt");

        let response = TokenResponse::new("at".into(), None, 3600);
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("refresh_token").is_none());
    }
}
