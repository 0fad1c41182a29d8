//! HTTP middleware for bearer authentication.
//!
//! - [`BearerAuthGuard`] parses `Authorization: Bearer <token>` values and
//!   validates the token
//! - [`BearerAuth`] is the axum extractor wrapping the guard
//! - `AuthError` renders as an RFC 6749 / RFC 6750 JSON error response
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use latchkey_auth::middleware::{AuthState, BearerAuth};
//!
//! async fn protected_handler(BearerAuth(auth): BearerAuth) -> String {
//!     format!("Hello, {}!", auth.subject())
//! }
//!
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .with_state(AuthState::new(guard));
//! ```

pub mod auth;
pub mod error;
pub mod types;

pub use auth::{AuthState, BearerAuth, BearerAuthGuard};
pub use error::oauth_error_json;
pub use types::AuthContext;
