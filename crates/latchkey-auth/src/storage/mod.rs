//! Storage traits for authorization server data.
//!
//! This module defines storage interfaces for:
//!
//! - OAuth client registrations
//! - Authorization codes
//! - Refresh tokens
//!
//! The code and refresh token stores expose an atomic `take_if_valid`
//! primitive: for a given key at most one caller ever receives a usable
//! record. Every implementation must keep that guarantee under concurrent
//! access.
//!
//! # Implementations
//!
//! - [`memory`] - sharded in-memory backend built on `dashmap`

pub mod client;
pub mod code;
pub mod memory;
pub mod refresh_token;

pub use client::ClientStorage;
pub use code::CodeStorage;
pub use memory::{InMemoryClientStorage, InMemoryCodeStorage, InMemoryRefreshTokenStorage};
pub use refresh_token::RefreshTokenStorage;
