//! PKCE (Proof Key for Code Exchange) implementation
//!
//! Implements RFC 7636 with the `S256` and `plain` methods. Comparison is
//! byte-for-byte (case-sensitive) and runs in constant time.
//!
//! # Example
//!
//! ```
//! use latchkey_auth::oauth::{PkceChallenge, PkceVerifier};
//!
//! // Client generates a verifier and challenge
//! let verifier = PkceVerifier::generate();
//! let challenge = PkceChallenge::from_verifier(&verifier);
//!
//! // Server stores the challenge, later verifies the verifier from the token request
//! let stored = PkceChallenge::new(challenge.as_str(), "S256").unwrap();
//! assert!(stored.verify(verifier.as_str()));
//! ```

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while accepting PKCE parameters.
#[derive(Debug, thiserror::Error)]
pub enum PkceError {
    /// The challenge is empty.
    #[error("code_challenge is required")]
    EmptyChallenge,

    /// Unsupported challenge method.
    #[error("Unsupported code_challenge_method: {0}")]
    UnsupportedMethod(String),
}

impl PkceError {
    /// Create an `UnsupportedMethod` error.
    #[must_use]
    pub fn unsupported_method(method: impl Into<String>) -> Self {
        Self::UnsupportedMethod(method.into())
    }

    /// Returns `true` if this error concerns the challenge method.
    #[must_use]
    pub fn is_method_error(&self) -> bool {
        matches!(self, Self::UnsupportedMethod(_))
    }
}

impl From<PkceError> for crate::AuthError {
    fn from(err: PkceError) -> Self {
        Self::invalid_pkce_params(err.to_string())
    }
}

// =============================================================================
// PKCE Challenge Method
// =============================================================================

/// PKCE challenge method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PkceChallengeMethod {
    /// SHA-256 hash of the verifier.
    #[default]
    S256,
    /// The verifier itself.
    Plain,
}

impl PkceChallengeMethod {
    /// Parse challenge method from its exact parameter value.
    ///
    /// # Errors
    ///
    /// Returns `PkceError::UnsupportedMethod` for anything but `S256` or `plain`.
    pub fn parse(method: &str) -> Result<Self, PkceError> {
        match method {
            "S256" => Ok(Self::S256),
            "plain" => Ok(Self::Plain),
            other => Err(PkceError::unsupported_method(other)),
        }
    }

    /// Get the method as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S256 => "S256",
            Self::Plain => "plain",
        }
    }
}

impl std::fmt::Display for PkceChallengeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// PKCE Verifier
// =============================================================================

/// PKCE code verifier, as generated by a client.
#[derive(Debug, Clone)]
pub struct PkceVerifier(String);

impl PkceVerifier {
    /// Generate a cryptographically random verifier.
    ///
    /// Generates 32 random bytes and encodes them as base64url (43 characters).
    #[must_use]
    pub fn generate() -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        let bytes: [u8; 32] = rng.r#gen();
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Get the verifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PkceVerifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// PKCE Challenge
// =============================================================================

/// PKCE code challenge together with its method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceChallenge {
    value: String,
    method: PkceChallengeMethod,
}

impl PkceChallenge {
    /// Create an `S256` challenge from a verifier.
    ///
    /// Computes `BASE64URL(SHA256(ASCII(code_verifier)))`.
    #[must_use]
    pub fn from_verifier(verifier: &PkceVerifier) -> Self {
        Self {
            value: s256(verifier.as_str()),
            method: PkceChallengeMethod::S256,
        }
    }

    /// Accept a challenge received from a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the challenge is empty or the method is unknown.
    pub fn new(challenge: impl Into<String>, method: &str) -> Result<Self, PkceError> {
        let value = challenge.into();
        if value.is_empty() {
            return Err(PkceError::EmptyChallenge);
        }
        Ok(Self {
            value,
            method: PkceChallengeMethod::parse(method)?,
        })
    }

    /// Returns `true` if `verifier` matches this challenge.
    #[must_use]
    pub fn verify(&self, verifier: &str) -> bool {
        verify(&self.value, self.method, verifier)
    }

    /// Get the challenge as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Get the challenge method.
    #[must_use]
    pub fn method(&self) -> PkceChallengeMethod {
        self.method
    }
}

/// Checks a presented verifier against a stored challenge.
///
/// `S256` compares `BASE64URL(SHA256(verifier))` with the challenge; `plain`
/// compares the verifier itself. Both comparisons are exact and constant-time.
#[must_use]
pub fn verify(challenge: &str, method: PkceChallengeMethod, verifier: &str) -> bool {
    match method {
        PkceChallengeMethod::S256 => s256(verifier).as_bytes().ct_eq(challenge.as_bytes()).into(),
        PkceChallengeMethod::Plain => verifier.as_bytes().ct_eq(challenge.as_bytes()).into(),
    }
}

fn s256(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

// =============================================================================
// Tests
// =============================================================================
