//! OAuth 2.0 client domain types.
//!
//! A [`Client`] is immutable once registered. Redirect URIs are compared by
//! exact string match, never by prefix or normalization.

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use time::OffsetDateTime;

// =============================================================================
// Grant Type
// =============================================================================

/// OAuth 2.0 grant types.
///
/// Defines the token endpoint flows a client is allowed to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Authorization Code flow with PKCE.
    AuthorizationCode,
    /// Refresh Token flow with rotation.
    RefreshToken,
}

impl GrantType {
    /// Returns the OAuth 2.0 grant_type parameter value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::RefreshToken => "refresh_token",
        }
    }

    /// Parses a grant_type parameter value. Unknown values yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "authorization_code" => Some(Self::AuthorizationCode),
            "refresh_token" => Some(Self::RefreshToken),
            _ => None,
        }
    }

    /// The grant types a client receives when registration does not name any.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![Self::AuthorizationCode, Self::RefreshToken]
    }
}

impl std::fmt::Display for GrantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Client
// =============================================================================

/// Registered OAuth 2.0 client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Unique client identifier used in OAuth flows.
    pub client_id: String,

    /// Client secret, returned once at registration.
    pub client_secret: String,

    /// Registered redirect URIs (exact-match strings, deduplicated).
    pub redirect_uris: Vec<String>,

    /// Grant types this client is allowed to use.
    pub grant_types: Vec<GrantType>,

    /// When the client was registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Client {
    /// Generates a fresh client identifier (128 bits of entropy).
    #[must_use]
    pub fn generate_client_id() -> String {
        super::random_urlsafe::<16>()
    }

    /// Generates a fresh client secret (256 bits of entropy).
    #[must_use]
    pub fn generate_client_secret() -> String {
        super::random_urlsafe::<32>()
    }

    /// Validates the client record.
    ///
    /// Redirect URIs must be absolute URLs without a fragment
    /// (RFC 6749 Section 3.1.2).
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ClientValidationError> {
        if self.client_id.is_empty() {
            return Err(ClientValidationError::EmptyClientId);
        }
        if self.client_secret.is_empty() {
            return Err(ClientValidationError::MissingSecret);
        }
        if self.grant_types.is_empty() {
            return Err(ClientValidationError::NoGrantTypes);
        }
        if self.redirect_uris.is_empty() {
            return Err(ClientValidationError::NoRedirectUris);
        }
        for uri in &self.redirect_uris {
            match url::Url::parse(uri) {
                Ok(parsed) if parsed.fragment().is_none() => {}
                _ => return Err(ClientValidationError::InvalidRedirectUri(uri.clone())),
            }
        }
        Ok(())
    }

    /// Returns `true` if `uri` is exactly one of the registered redirect URIs.
    #[must_use]
    pub fn is_redirect_uri_allowed(&self, uri: &str) -> bool {
        self.redirect_uris.iter().any(|allowed| allowed == uri)
    }

    /// Returns `true` if the client may use `grant_type`.
    #[must_use]
    pub fn is_grant_type_allowed(&self, grant_type: GrantType) -> bool {
        self.grant_types.contains(&grant_type)
    }

    /// Compares a presented secret against the stored one in constant time.
    #[must_use]
    pub fn verify_secret(&self, presented: &str) -> bool {
        self.client_secret
            .as_bytes()
            .ct_eq(presented.as_bytes())
            .into()
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Errors that can occur during client validation.
#[derive(Debug, thiserror::Error)]
pub enum ClientValidationError {
    /// Client ID cannot be empty.
    #[error("Client ID cannot be empty")]
    EmptyClientId,

    /// Client secret cannot be empty.
    #[error("Client secret cannot be empty")]
    MissingSecret,

    /// At least one grant type is required.
    #[error("At least one grant type is required")]
    NoGrantTypes,

    /// At least one redirect URI is required.
    #[error("At least one redirect URI is required")]
    NoRedirectUris,

    /// A redirect URI is not an absolute URL, or carries a fragment.
    #[error("Invalid redirect URI: {0}")]
    InvalidRedirectUri(String),
}

// =============================================================================
// Tests
// =============================================================================
