//! Refresh token storage trait.
//!
//! Records are keyed by [`RefreshToken::hash_token`] of the token value;
//! the plaintext never reaches storage.

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::AuthResult;
use crate::types::RefreshToken;

/// Storage trait for refresh tokens.
#[async_trait]
pub trait RefreshTokenStorage: Send + Sync {
    /// Stores a new refresh token record.
    ///
    /// # Errors
    ///
    /// Returns a storage error if a record with the same hash exists or the
    /// storage operation fails.
    async fn put(&self, token: RefreshToken) -> AuthResult<()>;

    /// Atomically fetches and deletes a token that is valid at `now`.
    ///
    /// Returns `None` if the hash is unknown or the token has expired.
    /// A deleted token can never be returned again.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn take_if_valid(
        &self,
        token_hash: &str,
        now: OffsetDateTime,
    ) -> AuthResult<Option<RefreshToken>>;

    /// Removes tokens expired at `now`.
    ///
    /// Returns the number of removed records.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn cleanup_expired(&self, now: OffsetDateTime) -> AuthResult<u64>;
}
