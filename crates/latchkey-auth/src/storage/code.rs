//! Authorization code storage trait.
//!
//! # Implementation Notes
//!
//! Implementations should:
//!
//! - Support efficient lookup by authorization code
//! - Make `take_if_valid` atomic per code (prevent replay attacks)
//! - Clean up used and expired codes periodically
//!
//! # Security Considerations
//!
//! - Never log authorization codes
//! - For SQL backends, redemption is a single conditional update:
//!
//! ```sql
//! UPDATE authorization_codes
//! SET used = true
//! WHERE code = $1 AND used = false AND expires_at >= $2
//! RETURNING *;
//! ```

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::AuthResult;
use crate::types::AuthorizationCode;

/// Storage trait for authorization codes.
#[async_trait]
pub trait CodeStorage: Send + Sync {
    /// Stores a freshly issued code. Its TTL is carried in `expires_at`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the code value already exists or the
    /// storage operation fails.
    async fn put(&self, code: AuthorizationCode) -> AuthResult<()>;

    /// Atomically fetches a redeemable code and marks it used.
    ///
    /// Returns `None` if the code is unknown, already used, or expired at
    /// `now`. Under concurrent calls for the same code exactly one caller
    /// receives the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn take_if_valid(
        &self,
        code: &str,
        now: OffsetDateTime,
    ) -> AuthResult<Option<AuthorizationCode>>;

    /// Removes used codes and codes expired at `now`.
    ///
    /// Returns the number of removed records.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn cleanup_expired(&self, now: OffsetDateTime) -> AuthResult<u64>;
}
