//! Authorization endpoint types.
//!
//! # OAuth 2.0 Authorization Code Flow
//!
//! 1. Client sends the user to the authorization endpoint with a PKCE challenge
//! 2. The session collaborator supplies the authenticated subject
//! 3. Server issues a single-use code bound to client, subject and challenge
//! 4. Client exchanges the code and its verifier at the token endpoint
//!
//! # Security Requirements
//!
//! - PKCE is required (`code_challenge` and `code_challenge_method`)
//! - The redirect URI must exactly match a registered one

use serde::{Deserialize, Serialize};

/// Authorization request parameters.
///
/// Received as query string parameters. Missing parameters deserialize as
/// empty strings so that validation reports them with the proper error
/// instead of a parse failure.
///
/// # Example
///
/// ```ignore
/// GET /authorize?
///   response_type=code
///   &client_id=my-app
///   &redirect_uri=https://app.example.com/callback
///   &state=abc123xyz
///   &code_challenge=E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM
///   &code_challenge_method=S256
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizationRequest {
    /// Must be "code".
    #[serde(default)]
    pub response_type: String,

    /// Client identifier issued during registration.
    #[serde(default)]
    pub client_id: String,

    /// Must exactly match one of the registered redirect URIs.
    #[serde(default)]
    pub redirect_uri: String,

    /// Opaque value echoed back verbatim.
    #[serde(default)]
    pub state: Option<String>,

    /// PKCE code challenge.
    #[serde(default)]
    pub code_challenge: String,

    /// PKCE code challenge method, `S256` or `plain`.
    #[serde(default)]
    pub code_challenge_method: String,
}

/// Successful authorization response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationResponse {
    /// The issued authorization code.
    pub code: String,

    /// The `state` from the request, unchanged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl AuthorizationResponse {
    /// Creates a new authorization response.
    #[must_use]
    pub fn new(code: impl Into<String>, state: Option<String>) -> Self {
        Self {
            code: code.into(),
            state,
        }
    }
}
