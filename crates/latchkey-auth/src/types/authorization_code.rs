//! Authorization code domain type.

use time::OffsetDateTime;

use crate::oauth::pkce::PkceChallenge;

/// Single-use authorization code bound to a client, a subject and a PKCE
/// challenge.
///
/// Once `used` is set it never reverts. Codes are not deleted on
/// redemption; the store rejects them lazily on read and purges them in
/// [`cleanup_expired`](crate::storage::CodeStorage::cleanup_expired).
#[derive(Debug, Clone)]
pub struct AuthorizationCode {
    /// Opaque code value handed to the client.
    pub code: String,

    /// Client the code was issued to.
    pub client_id: String,

    /// Subject that authorized the request.
    pub subject: String,

    /// PKCE challenge the code is bound to.
    pub challenge: PkceChallenge,

    /// When the code was issued.
    pub issued_at: OffsetDateTime,

    /// When the code stops being redeemable.
    pub expires_at: OffsetDateTime,

    /// Whether the code has been redeemed.
    pub used: bool,
}

impl AuthorizationCode {
    /// Generate a cryptographically secure code value (256 bits).
    #[must_use]
    pub fn generate_code() -> String {
        super::random_urlsafe::<32>()
    }

    /// Returns `true` if the code is past its expiry at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now > self.expires_at
    }

    /// Returns `true` if the code can still be redeemed at `now`.
    #[must_use]
    pub fn is_redeemable_at(&self, now: OffsetDateTime) -> bool {
        !self.used && !self.is_expired_at(now)
    }
}

#[cfg(test)]
mod tests {
    use time::Duration;

    use super::*;

    fn make_code(issued_at: OffsetDateTime) -> AuthorizationCode {
        AuthorizationCode {
            code: AuthorizationCode::generate_code(),
            client_id: "client".to_string(),
            subject: "user-1".to_string(),
            challenge: PkceChallenge::new("challenge", "plain").unwrap(),
            issued_at,
            expires_at: issued_at + Duration::minutes(10),
            used: false,
        }
    }

    #[test]
    fn test_expiry_boundary() {
        let t = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let code = make_code(t);
        assert!(code.is_redeemable_at(t));
        assert!(code.is_redeemable_at(t + Duration::minutes(10)));
        assert!(code.is_expired_at(t + Duration::minutes(10) + Duration::seconds(1)));
    }

    #[test]
    fn test_used_code_is_not_redeemable() {
        let t = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let mut code = make_code(t);
        code.used = true;
        assert!(!code.is_redeemable_at(t));
    }
}
