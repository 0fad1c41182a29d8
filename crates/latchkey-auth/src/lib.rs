//! # latchkey-auth
//!
//! OAuth 2.0 authorization server core.
//!
//! This crate provides:
//! - A client registry with exact-match redirect URIs
//! - An authorization endpoint issuing PKCE-bound, single-use codes
//! - A token endpoint for the `authorization_code` and `refresh_token`
//!   grants, with refresh token rotation
//! - HS256 access tokens and a bearer guard for protected resources
//! - Storage traits with atomic take-if-valid semantics, and an in-memory
//!   backend
//!
//! ## Modules
//!
//! - [`config`] - Lifetimes and signing configuration
//! - [`oauth`] - Client registry, authorization endpoint, PKCE
//! - [`token`] - Access token codec and token exchange
//! - [`middleware`] - Bearer authentication for axum
//! - [`storage`] - Storage traits and the in-memory backend
//! - [`provider`] - Assembles everything from an [`AuthConfig`]

pub mod clock;
pub mod config;
pub mod error;
pub mod middleware;
pub mod oauth;
pub mod provider;
pub mod storage;
pub mod token;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AuthConfig, ConfigError};
pub use error::{AuthError, ErrorCategory};
pub use middleware::{AuthContext, AuthState, BearerAuth, BearerAuthGuard};
pub use oauth::{
    AuthorizationRequest, AuthorizationResponse, ClientRegistration, ClientRegistry,
    TokenRequest, TokenResponse,
};
pub use provider::{CleanupReport, OAuthProvider, Storages};
pub use storage::{ClientStorage, CodeStorage, RefreshTokenStorage};
pub use types::{AuthorizationCode, Client, ClientValidationError, GrantType, RefreshToken};

/// Type alias for authorization server results.
pub type AuthResult<T> = Result<T, AuthError>;
