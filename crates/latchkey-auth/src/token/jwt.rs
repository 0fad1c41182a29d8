//! Access token encoding and validation.
//!
//! Access tokens are compact JWS values signed with HMAC-SHA256 (`HS256`)
//! under a single process-wide secret. They carry only the subject and
//! the issue and expiry timestamps, so the same inputs always produce the
//! same token. Nothing is persisted; validity is re-derived on every check.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use latchkey_auth::clock::SystemClock;
//! use latchkey_auth::token::jwt::AccessTokenCodec;
//!
//! let codec = AccessTokenCodec::new(b"0123456789abcdef0123456789abcdef", Arc::new(SystemClock)).unwrap();
//! let token = codec.issue("user-1", time::Duration::hours(1)).unwrap();
//! assert_eq!(codec.validate(&token).unwrap().sub, "user-1");
//! ```

use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::AuthError;
use crate::clock::Clock;

/// Minimum signing secret length in bytes (the HS256 output size).
pub const MIN_SECRET_LEN: usize = 32;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during access token operations.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    EncodingError {
        /// Description of the encoding error.
        message: String,
    },

    /// The token cannot be parsed or carries unexpected content.
    #[error("Malformed token: {message}")]
    Malformed {
        /// Description of the decoding error.
        message: String,
    },

    /// The token has expired.
    #[error("Token expired")]
    Expired,

    /// The token signature is invalid.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Invalid key material.
    #[error("Invalid key: {message}")]
    InvalidKey {
        /// Description of why the key is invalid.
        message: String,
    },
}

impl JwtError {
    /// Creates a new `EncodingError`.
    #[must_use]
    pub fn encoding_error(message: impl Into<String>) -> Self {
        Self::EncodingError {
            message: message.into(),
        }
    }

    /// Creates a new `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidKey` error.
    #[must_use]
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidKeyFormat => Self::invalid_key(err.to_string()),
            _ => Self::malformed(err.to_string()),
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Malformed { message } => Self::malformed_token(message),
            JwtError::InvalidSignature => Self::SignatureInvalid,
            JwtError::Expired => Self::TokenExpired,
            JwtError::EncodingError { message } | JwtError::InvalidKey { message } => {
                Self::internal(message)
            }
        }
    }
}

// ============================================================================
// Claims
// ============================================================================

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject the token was issued for.
    pub sub: String,
    /// Issue time (seconds since the Unix epoch).
    pub iat: i64,
    /// Expiry time (seconds since the Unix epoch).
    pub exp: i64,
}

impl AccessTokenClaims {
    /// Returns `true` if the token is past its expiry at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now.unix_timestamp() > self.exp
    }
}

// ============================================================================
// Codec
// ============================================================================

/// Issues and validates HS256 access tokens.
///
/// This type is `Send + Sync` and meant to be shared behind an `Arc`.
pub struct AccessTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl AccessTokenCodec {
    /// Creates a codec for the given signing secret.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::InvalidKey` if the secret is shorter than
    /// [`MIN_SECRET_LEN`] bytes.
    pub fn new(secret: &[u8], clock: Arc<dyn Clock>) -> Result<Self, JwtError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(JwtError::invalid_key(format!(
                "signing secret must be at least {MIN_SECRET_LEN} bytes, got {}",
                secret.len()
            )));
        }

        // Expiry is checked against the injected clock, not the system time.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            clock,
        })
    }

    /// Issues a token for `subject`, valid for `ttl` from now.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, JwtError> {
        self.issue_at(subject, self.clock.now(), ttl)
    }

    /// Issues a token for `subject` as if issued at `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn issue_at(
        &self,
        subject: &str,
        issued_at: OffsetDateTime,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        let claims = AccessTokenClaims {
            sub: subject.to_string(),
            iat: issued_at.unix_timestamp(),
            exp: (issued_at + ttl).unix_timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::encoding_error(e.to_string()))
    }

    /// Validates a token against the current time.
    ///
    /// # Errors
    ///
    /// Returns `Malformed`, `InvalidSignature`, or `Expired`.
    pub fn validate(&self, token: &str) -> Result<AccessTokenClaims, JwtError> {
        self.validate_at(token, self.clock.now())
    }

    /// Validates a token as of `now`.
    ///
    /// The signature is checked before the expiry, so a forged token is
    /// always reported as `InvalidSignature`.
    ///
    /// # Errors
    ///
    /// Returns `Malformed`, `InvalidSignature`, or `Expired`.
    pub fn validate_at(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> Result<AccessTokenClaims, JwtError> {
        let data = decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)?;
        if data.claims.is_expired_at(now) {
            return Err(JwtError::Expired);
        }
        Ok(data.claims)
    }
}

impl fmt::Debug for AccessTokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

    use super::*;
    use crate::clock::ManualClock;

    const SECRET: &[u8] = b"test-secret-that-is-long-enough-for-hs256";

    fn t0() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
    }

    fn codec() -> (AccessTokenCodec, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(t0()));
        let codec = AccessTokenCodec::new(SECRET, clock.clone()).unwrap();
        (codec, clock)
    }

    #[test]
    fn test_issue_and_validate() {
        let (codec, _) = codec();
        let token = codec.issue("user-42", Duration::hours(1)).unwrap();

        let claims = codec.validate(&token).unwrap();
        assert_eq!(claims.sub, "user-42");
        assert_eq!(claims.iat, t0().unix_timestamp());
        assert_eq!(claims.exp, t0().unix_timestamp() + 3600);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let (codec, _) = codec();
        let a = codec.issue_at("user", t0(), Duration::hours(1)).unwrap();
        let b = codec.issue_at("user", t0(), Duration::hours(1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_expiry_boundary() {
        let (codec, clock) = codec();
        let token = codec.issue("user", Duration::hours(1)).unwrap();

        clock.advance(Duration::hours(1));
        assert!(codec.validate(&token).is_ok());

        clock.advance(Duration::seconds(1));
        assert!(matches!(codec.validate(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_every_signature_bit_flip_is_rejected() {
        let (codec, _) = codec();
        let token = codec.issue("user", Duration::hours(1)).unwrap();
        let (message, signature) = token.rsplit_once('.').unwrap();
        let signature = URL_SAFE_NO_PAD.decode(signature).unwrap();

        for bit in 0..signature.len() * 8 {
            let mut flipped = signature.clone();
            flipped[bit / 8] ^= 1 << (bit % 8);
            let forged = format!("{message}.{}", URL_SAFE_NO_PAD.encode(&flipped));

            assert!(
                matches!(codec.validate(&forged), Err(JwtError::InvalidSignature)),
                "bit {bit} flip was not rejected"
            );
        }
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let (codec, _) = codec();
        let token = codec.issue("alice", Duration::hours(1)).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let forged_claims = AccessTokenClaims {
            sub: "mallory".to_string(),
            iat: t0().unix_timestamp(),
            exp: t0().unix_timestamp() + 3600,
        };
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).unwrap());
        let forged = format!("{}.{payload}.{}", parts[0], parts[2]);

        assert!(matches!(
            codec.validate(&forged),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_other_secret_is_rejected() {
        let (codec, clock) = codec();
        let other = AccessTokenCodec::new(b"another-secret-that-is-32-bytes-long!", clock).unwrap();
        let token = other.issue("user", Duration::hours(1)).unwrap();

        assert!(matches!(
            codec.validate(&token),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_forgery_reports_signature() {
        let (codec, clock) = codec();
        let token = codec.issue("user", Duration::hours(1)).unwrap();
        let (message, signature) = token.rsplit_once('.').unwrap();
        let mut signature = URL_SAFE_NO_PAD.decode(signature).unwrap();
        signature[0] ^= 0x80;
        let forged = format!("{message}.{}", URL_SAFE_NO_PAD.encode(&signature));
        clock.advance(Duration::days(1));

        assert!(matches!(codec.validate(&token), Err(JwtError::Expired)));
        assert!(matches!(
            codec.validate(&forged),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_malformed_tokens() {
        let (codec, _) = codec();
        for token in ["", "abc", "a.b", "not.a.jwt", "!!!.###.$$$"] {
            assert!(
                matches!(codec.validate(token), Err(JwtError::Malformed { .. })),
                "{token:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_short_secret_rejected() {
        let clock = Arc::new(ManualClock::new(t0()));
        let err = AccessTokenCodec::new(b"too-short", clock).unwrap_err();
        assert!(matches!(err, JwtError::InvalidKey { .. }));
    }

    #[test]
    fn test_error_mapping_to_auth_error() {
        assert!(matches!(
            AuthError::from(JwtError::InvalidSignature),
            AuthError::SignatureInvalid
        ));
        assert!(matches!(
            AuthError::from(JwtError::Expired),
            AuthError::TokenExpired
        ));
        assert!(AuthError::from(JwtError::invalid_key("k")).is_server_error());
    }
}
