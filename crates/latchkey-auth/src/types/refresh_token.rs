//! Refresh token domain type.
//!
//! # Security
//!
//! - Refresh tokens are stored as SHA-256 hashes, never plaintext
//! - Every use deletes the token and issues exactly one successor
//! - Expired tokens are rejected on read and purged periodically

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Refresh token record.
///
/// The token itself is never stored. Only a SHA-256 hash is persisted; to
/// redeem a token the store is queried with [`RefreshToken::hash_token`] of
/// the presented value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshToken {
    /// SHA-256 hash (hex) of the actual token value.
    pub token_hash: String,

    /// Client ID that this token was issued to.
    pub client_id: String,

    /// Subject the token acts for.
    pub subject: String,

    /// When this token was created.
    #[serde(with = "time::serde::rfc3339")]
    pub issued_at: OffsetDateTime,

    /// When this token stops being redeemable.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl RefreshToken {
    /// Builds the record for a freshly generated token value.
    #[must_use]
    pub fn new(
        token: &str,
        client_id: impl Into<String>,
        subject: impl Into<String>,
        issued_at: OffsetDateTime,
        expires_at: OffsetDateTime,
    ) -> Self {
        Self {
            token_hash: Self::hash_token(token),
            client_id: client_id.into(),
            subject: subject.into(),
            issued_at,
            expires_at,
        }
    }

    /// Returns `true` if this token is past its expiry at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now > self.expires_at
    }

    /// Hash a token value using SHA-256.
    ///
    /// This is used both when storing new tokens and when looking up
    /// tokens for redemption.
    #[must_use]
    pub fn hash_token(token: &str) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Generate a cryptographically secure random token.
    ///
    /// Returns a 256-bit random value encoded as base64url (43 characters).
    #[must_use]
    pub fn generate_token() -> String {
        super::random_urlsafe::<32>()
    }
}

#[cfg(test)]
mod tests {
    use time::Duration;

    use super::*;

    #[test]
    fn test_new_stores_hash_only() {
        let now = OffsetDateTime::now_utc();
        let token = RefreshToken::generate_token();
        let record = RefreshToken::new(&token, "client", "user", now, now + Duration::days(30));

        assert_ne!(record.token_hash, token);
        assert_eq!(record.token_hash, RefreshToken::hash_token(&token));
        assert_eq!(record.token_hash.len(), 64);
    }

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(
            RefreshToken::hash_token("same"),
            RefreshToken::hash_token("same")
        );
        assert_ne!(
            RefreshToken::hash_token("one"),
            RefreshToken::hash_token("two")
        );
    }

    #[test]
    fn test_expiry() {
        let now = OffsetDateTime::now_utc();
        let record = RefreshToken::new("t", "c", "s", now, now + Duration::days(30));
        assert!(!record.is_expired_at(now));
        assert!(!record.is_expired_at(now + Duration::days(30)));
        assert!(record.is_expired_at(now + Duration::days(30) + Duration::seconds(1)));
    }
}
