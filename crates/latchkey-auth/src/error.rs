//! Authorization server error types.
//!
//! Every failure path of the core returns one [`AuthError`] variant. Protocol
//! errors are grouped into families by [`ErrorCategory`]; storage and
//! signing failures are kept apart as [`ErrorCategory::Infrastructure`] so an
//! HTTP binding can answer them with a generic `server_error`.

use std::fmt;

/// Errors that can occur while registering clients, authorizing, exchanging
/// grants, or authenticating bearer tokens.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    // -------------------------------------------------------------------------
    // Authorization request errors
    // -------------------------------------------------------------------------
    /// The client is unknown or may not use the requested flow.
    #[error("Invalid client: {message}")]
    InvalidClient {
        /// Description of why the client is invalid.
        message: String,
    },

    /// The redirect URI is not an exact member of the registered set.
    #[error("Invalid redirect_uri")]
    InvalidRedirectUri,

    /// The authorization server does not support the requested response type.
    #[error("Unsupported response type: {response_type}")]
    UnsupportedResponseType {
        /// The unsupported response type.
        response_type: String,
    },

    /// The PKCE challenge is empty or uses an unknown method.
    #[error("Invalid PKCE parameters: {message}")]
    InvalidPkceParams {
        /// Description of the PKCE problem.
        message: String,
    },

    // -------------------------------------------------------------------------
    // Grant errors
    // -------------------------------------------------------------------------
    /// The authorization server does not support the requested grant type.
    #[error("Unsupported grant type: {grant_type}")]
    UnsupportedGrantType {
        /// The unsupported grant type.
        grant_type: String,
    },

    /// The authorization code is unknown, already used, or expired.
    #[error("Invalid authorization code")]
    InvalidAuthorizationCode,

    /// The code verifier does not match the stored PKCE challenge.
    #[error("Invalid code verifier")]
    InvalidCodeVerifier,

    /// The refresh token is unknown, already rotated, or expired.
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    /// The client is not registered for the requested grant type.
    #[error("Client is not authorized for grant type: {grant_type}")]
    UnauthorizedClient {
        /// The grant type the client tried to use.
        grant_type: String,
    },

    // -------------------------------------------------------------------------
    // Access token errors
    // -------------------------------------------------------------------------
    /// The access token cannot be parsed.
    #[error("Malformed token: {message}")]
    MalformedToken {
        /// Description of the parse failure.
        message: String,
    },

    /// The access token signature does not verify.
    #[error("Invalid token signature")]
    SignatureInvalid,

    /// The access token has expired.
    #[error("Token expired")]
    TokenExpired,

    // -------------------------------------------------------------------------
    // Credential errors
    // -------------------------------------------------------------------------
    /// No credentials were presented.
    #[error("Missing credentials")]
    MissingCredentials,

    /// The `Authorization` value is not of the form `Bearer <token>`.
    #[error("Malformed credentials: {message}")]
    MalformedCredentials {
        /// Description of the shape problem.
        message: String,
    },

    // -------------------------------------------------------------------------
    // Registry errors
    // -------------------------------------------------------------------------
    /// The client registration metadata is invalid.
    #[error("Invalid registration: {message}")]
    InvalidRegistration {
        /// Description of why the registration was rejected.
        message: String,
    },

    /// The requested record does not exist.
    #[error("Not found: {message}")]
    NotFound {
        /// Description of what was not found.
        message: String,
    },

    // -------------------------------------------------------------------------
    // Infrastructure errors
    // -------------------------------------------------------------------------
    /// An error occurred while storing or retrieving auth data.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// An unexpected internal error occurred (signing, key handling).
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `InvalidClient` error.
    #[must_use]
    pub fn invalid_client(message: impl Into<String>) -> Self {
        Self::InvalidClient {
            message: message.into(),
        }
    }

    /// Creates a new `UnsupportedResponseType` error.
    #[must_use]
    pub fn unsupported_response_type(response_type: impl Into<String>) -> Self {
        Self::UnsupportedResponseType {
            response_type: response_type.into(),
        }
    }

    /// Creates a new `InvalidPkceParams` error.
    #[must_use]
    pub fn invalid_pkce_params(message: impl Into<String>) -> Self {
        Self::InvalidPkceParams {
            message: message.into(),
        }
    }

    /// Creates a new `UnsupportedGrantType` error.
    #[must_use]
    pub fn unsupported_grant_type(grant_type: impl Into<String>) -> Self {
        Self::UnsupportedGrantType {
            grant_type: grant_type.into(),
        }
    }

    /// Creates a new `UnauthorizedClient` error.
    #[must_use]
    pub fn unauthorized_client(grant_type: impl Into<String>) -> Self {
        Self::UnauthorizedClient {
            grant_type: grant_type.into(),
        }
    }

    /// Creates a new `MalformedToken` error.
    #[must_use]
    pub fn malformed_token(message: impl Into<String>) -> Self {
        Self::MalformedToken {
            message: message.into(),
        }
    }

    /// Creates a new `MalformedCredentials` error.
    #[must_use]
    pub fn malformed_credentials(message: impl Into<String>) -> Self {
        Self::MalformedCredentials {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidRegistration` error.
    #[must_use]
    pub fn invalid_registration(message: impl Into<String>) -> Self {
        Self::InvalidRegistration {
            message: message.into(),
        }
    }

    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !self.is_server_error()
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Internal { .. })
    }

    /// Returns `true` if this is a grant error from the token endpoint.
    #[must_use]
    pub fn is_grant_error(&self) -> bool {
        self.category() == ErrorCategory::Grant
    }

    /// Returns `true` if this is an access token error.
    #[must_use]
    pub fn is_token_error(&self) -> bool {
        self.category() == ErrorCategory::Token
    }

    /// Returns the error family for logging and response mapping.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidClient { .. }
            | Self::InvalidRedirectUri
            | Self::UnsupportedResponseType { .. }
            | Self::InvalidPkceParams { .. } => ErrorCategory::Client,
            Self::UnsupportedGrantType { .. }
            | Self::InvalidAuthorizationCode
            | Self::InvalidCodeVerifier
            | Self::InvalidRefreshToken
            | Self::UnauthorizedClient { .. } => ErrorCategory::Grant,
            Self::MalformedToken { .. } | Self::SignatureInvalid | Self::TokenExpired => {
                ErrorCategory::Token
            }
            Self::MissingCredentials | Self::MalformedCredentials { .. } => {
                ErrorCategory::Credential
            }
            Self::InvalidRegistration { .. } | Self::NotFound { .. } => ErrorCategory::Registry,
            Self::Storage { .. } | Self::Internal { .. } => ErrorCategory::Infrastructure,
        }
    }

    /// Returns the OAuth 2.0 error code for this error.
    ///
    /// Codes follow RFC 6749 Section 4.1.2.1 and 5.2, RFC 6750 Section 3.1 and
    /// RFC 7591 Section 3.2.2.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::InvalidClient { .. } => "invalid_client",
            Self::InvalidRedirectUri | Self::InvalidPkceParams { .. } => "invalid_request",
            Self::UnsupportedResponseType { .. } => "unsupported_response_type",
            Self::UnsupportedGrantType { .. } => "unsupported_grant_type",
            Self::InvalidAuthorizationCode
            | Self::InvalidCodeVerifier
            | Self::InvalidRefreshToken => "invalid_grant",
            Self::UnauthorizedClient { .. } => "unauthorized_client",
            Self::MalformedToken { .. } | Self::SignatureInvalid | Self::TokenExpired => {
                "invalid_token"
            }
            Self::MissingCredentials => "unauthorized",
            Self::MalformedCredentials { .. } => "invalid_request",
            Self::InvalidRegistration { .. } => "invalid_client_metadata",
            Self::NotFound { .. } => "not_found",
            Self::Storage { .. } | Self::Internal { .. } => "server_error",
        }
    }
}

/// Error families, used for logging and response mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Authorization request validation failures.
    Client,
    /// Token endpoint grant failures.
    Grant,
    /// Access token validation failures.
    Token,
    /// Bearer credential presence or shape failures.
    Credential,
    /// Client registry failures.
    Registry,
    /// Storage or signing infrastructure failures.
    Infrastructure,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client => write!(f, "client"),
            Self::Grant => write!(f, "grant"),
            Self::Token => write!(f, "token"),
            Self::Credential => write!(f, "credential"),
            Self::Registry => write!(f, "registry"),
            Self::Infrastructure => write!(f, "infrastructure"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::invalid_client("unknown client_id");
        assert_eq!(err.to_string(), "Invalid client: unknown client_id");

        assert_eq!(
            AuthError::InvalidAuthorizationCode.to_string(),
            "Invalid authorization code"
        );
        assert_eq!(
            AuthError::unsupported_grant_type("password").to_string(),
            "Unsupported grant type: password"
        );
    }

    #[test]
    fn test_server_errors_are_infrastructure() {
        for err in [AuthError::storage("db down"), AuthError::internal("hmac")] {
            assert!(err.is_server_error());
            assert!(!err.is_client_error());
            assert_eq!(err.category(), ErrorCategory::Infrastructure);
            assert_eq!(err.oauth_error_code(), "server_error");
        }
    }

    #[test]
    fn test_grant_errors_share_invalid_grant_code() {
        for err in [
            AuthError::InvalidAuthorizationCode,
            AuthError::InvalidCodeVerifier,
            AuthError::InvalidRefreshToken,
        ] {
            assert!(err.is_grant_error());
            assert_eq!(err.oauth_error_code(), "invalid_grant");
        }
        assert!(AuthError::unsupported_grant_type("x").is_grant_error());

        let err = AuthError::unauthorized_client("refresh_token");
        assert!(err.is_grant_error());
        assert_eq!(err.oauth_error_code(), "unauthorized_client");
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(AuthError::InvalidRedirectUri.category(), ErrorCategory::Client);
        assert_eq!(
            AuthError::invalid_pkce_params("empty").category(),
            ErrorCategory::Client
        );
        assert_eq!(AuthError::SignatureInvalid.category(), ErrorCategory::Token);
        assert!(AuthError::TokenExpired.is_token_error());
        assert_eq!(
            AuthError::MissingCredentials.category(),
            ErrorCategory::Credential
        );
        assert_eq!(
            AuthError::not_found("client").category(),
            ErrorCategory::Registry
        );
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ErrorCategory::Grant.to_string(), "grant");
        assert_eq!(ErrorCategory::Infrastructure.to_string(), "infrastructure");
    }
}
