//! OAuth 2.0 authorization endpoint and client registry.
//!
//! - [`registry`] - Client registration and lookup
//! - [`authorize`] - Request/response types for the authorization endpoint
//! - [`service`] - Authorization service with validation logic
//! - [`pkce`] - PKCE challenge/verifier implementation
//! - [`token`] - Request/response types for the token endpoint
//!
//! # Example
//!
//! ```ignore
//! use latchkey_auth::oauth::{AuthorizationRequest, PkceChallenge, PkceVerifier};
//!
//! // Client generates PKCE verifier and challenge
//! let verifier = PkceVerifier::generate();
//! let challenge = PkceChallenge::from_verifier(&verifier);
//!
//! // Server processes the authorization request for an authenticated subject
//! let response = authorization_service.authorize(&request, "user-1").await?;
//! ```

pub mod authorize;
pub mod pkce;
pub mod registry;
pub mod service;
pub mod token;

pub use authorize::{AuthorizationRequest, AuthorizationResponse};
pub use pkce::{PkceChallenge, PkceChallengeMethod, PkceError, PkceVerifier};
pub use registry::{ClientRegistration, ClientRegistry};
pub use service::{AuthorizationConfig, AuthorizationService};
pub use token::{TokenRequest, TokenResponse};
