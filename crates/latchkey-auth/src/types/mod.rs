//! Domain types shared by the registry, the endpoints, and the stores.
//!
//! ## Domain Types
//!
//! - [`Client`] - OAuth 2.0 client registration
//! - [`GrantType`] - Supported OAuth grant types
//! - [`AuthorizationCode`] - PKCE-bound, single-use authorization code
//! - [`RefreshToken`] - Rotating refresh token record

pub mod authorization_code;
pub mod client;
pub mod refresh_token;

pub use authorization_code::AuthorizationCode;
pub use client::{Client, ClientValidationError, GrantType};
pub use refresh_token::RefreshToken;

/// Generates `N` random bytes and encodes them as unpadded base64url.
///
/// Used for client ids, client secrets, authorization codes and refresh
/// tokens. 16 bytes give 128 bits of entropy, 32 bytes give 256.
#[must_use]
pub(crate) fn random_urlsafe<const N: usize>() -> String {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    let mut bytes = [0u8; N];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
