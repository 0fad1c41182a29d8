//! Authentication context types.

use time::OffsetDateTime;

use crate::AuthResult;
use crate::error::AuthError;
use crate::token::jwt::AccessTokenClaims;

/// Authenticated request context.
///
/// Only [`BearerAuthGuard`](super::BearerAuthGuard) constructs this type,
/// so holding one proves the bearer token was validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    subject: String,
    issued_at: OffsetDateTime,
    expires_at: OffsetDateTime,
}

impl AuthContext {
    /// Builds the context from validated claims.
    ///
    /// Fails with `MalformedToken` if `iat` or `exp` is outside the
    /// representable date range.
    pub(crate) fn from_claims(claims: AccessTokenClaims) -> AuthResult<Self> {
        let timestamp = |value: i64, claim: &str| {
            OffsetDateTime::from_unix_timestamp(value)
                .map_err(|_| AuthError::malformed_token(format!("{claim} claim is out of range")))
        };
        Ok(Self {
            issued_at: timestamp(claims.iat, "iat")?,
            expires_at: timestamp(claims.exp, "exp")?,
            subject: claims.sub,
        })
    }

    /// The authenticated subject.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// When the presented access token was issued.
    #[must_use]
    pub fn issued_at(&self) -> OffsetDateTime {
        self.issued_at
    }

    /// When the presented access token expires.
    #[must_use]
    pub fn expires_at(&self) -> OffsetDateTime {
        self.expires_at
    }
}
