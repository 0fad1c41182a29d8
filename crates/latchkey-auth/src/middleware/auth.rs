//! Bearer token authentication.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::AuthResult;
use crate::error::AuthError;
use crate::middleware::types::AuthContext;
use crate::token::jwt::AccessTokenCodec;

// =============================================================================
// Guard
// =============================================================================

/// Authenticates `Authorization` header values.
#[derive(Debug, Clone)]
pub struct BearerAuthGuard {
    codec: Arc<AccessTokenCodec>,
}

impl BearerAuthGuard {
    /// Creates a guard validating tokens with `codec`.
    #[must_use]
    pub fn new(codec: Arc<AccessTokenCodec>) -> Self {
        Self { codec }
    }

    /// Authenticates an `Authorization` header value.
    ///
    /// # Errors
    ///
    /// - `MissingCredentials` if the value is absent or blank
    /// - `MalformedCredentials` if it is not `Bearer <token>`
    /// - `MalformedToken`, `SignatureInvalid` or `TokenExpired` from token
    ///   validation
    pub fn authenticate(&self, header_value: Option<&str>) -> AuthResult<AuthContext> {
        let value = header_value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(AuthError::MissingCredentials)?;

        let token = parse_bearer(value)?;
        let claims = self.codec.validate(token).map_err(|e| {
            tracing::debug!(error = %e, "Bearer token rejected");
            AuthError::from(e)
        })?;

        AuthContext::from_claims(claims)
    }
}

/// Splits `Bearer <token>` and returns the token.
///
/// The scheme is matched case-insensitively (RFC 7235 Section 2.1); the
/// token must be a single non-empty word.
fn parse_bearer(value: &str) -> AuthResult<&str> {
    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| AuthError::malformed_credentials("expected 'Bearer <token>'"))?;

    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AuthError::malformed_credentials(
            "unsupported authorization scheme",
        ));
    }

    let token = token.trim_start();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthError::malformed_credentials("expected 'Bearer <token>'"));
    }

    Ok(token)
}

// =============================================================================
// Auth State
// =============================================================================

/// State needed by the [`BearerAuth`] extractor.
///
/// Embed it in the application state and implement `FromRef` for it.
#[derive(Debug, Clone)]
pub struct AuthState {
    /// Guard validating bearer tokens.
    pub guard: BearerAuthGuard,
}

impl AuthState {
    /// Creates a new auth state.
    #[must_use]
    pub fn new(guard: BearerAuthGuard) -> Self {
        Self { guard }
    }
}

// =============================================================================
// Extractor
// =============================================================================

/// Extractor for authenticated requests.
///
/// Rejects the request with a 401 (or 400 for a malformed header) before
/// the handler runs.
///
/// # Example
///
/// ```ignore
/// async fn userinfo(BearerAuth(auth): BearerAuth) -> String {
///     auth.subject().to_string()
/// }
/// ```
#[derive(Debug, Clone)]
pub struct BearerAuth(pub AuthContext);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let header_value = match parts.headers.get(AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| {
                AuthError::malformed_credentials("Authorization header is not valid ASCII")
            })?),
            None => None,
        };

        auth_state.guard.authenticate(header_value).map(BearerAuth)
    }
}
