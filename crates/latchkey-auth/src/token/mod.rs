//! Token issuance and validation.
//!
//! - [`jwt`] - HS256 access token codec
//! - [`service`] - Token endpoint state machine (code exchange and refresh rotation)

pub mod jwt;
pub mod service;

pub use jwt::{AccessTokenClaims, AccessTokenCodec, JwtError};
pub use service::{TokenConfig, TokenService};
