//! In-memory storage backend.
//!
//! Each store is a sharded [`DashMap`]. Atomic operations hold the shard
//! lock of a single key for the duration of the check-and-set, so
//! unrelated keys do not contend and no lock is held across an `.await`.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use time::OffsetDateTime;

use super::{ClientStorage, CodeStorage, RefreshTokenStorage};
use crate::types::{AuthorizationCode, Client, RefreshToken};
use crate::{AuthError, AuthResult};

// =============================================================================
// Clients
// =============================================================================

/// In-memory [`ClientStorage`].
#[derive(Debug, Default)]
pub struct InMemoryClientStorage {
    clients: DashMap<String, Client>,
}

impl InMemoryClientStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientStorage for InMemoryClientStorage {
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
        Ok(self.clients.get(client_id).map(|entry| entry.value().clone()))
    }

    async fn create(&self, client: &Client) -> AuthResult<()> {
        match self.clients.entry(client.client_id.clone()) {
            Entry::Occupied(_) => Err(AuthError::storage("duplicate client_id")),
            Entry::Vacant(slot) => {
                slot.insert(client.clone());
                Ok(())
            }
        }
    }
}

// =============================================================================
// Authorization codes
// =============================================================================

/// In-memory [`CodeStorage`].
#[derive(Debug, Default)]
pub struct InMemoryCodeStorage {
    codes: DashMap<String, AuthorizationCode>,
}

impl InMemoryCodeStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held, used or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Returns `true` if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[async_trait]
impl CodeStorage for InMemoryCodeStorage {
    async fn put(&self, code: AuthorizationCode) -> AuthResult<()> {
        match self.codes.entry(code.code.clone()) {
            Entry::Occupied(_) => Err(AuthError::storage("duplicate authorization code")),
            Entry::Vacant(slot) => {
                slot.insert(code);
                Ok(())
            }
        }
    }

    async fn take_if_valid(
        &self,
        code: &str,
        now: OffsetDateTime,
    ) -> AuthResult<Option<AuthorizationCode>> {
        let Some(mut entry) = self.codes.get_mut(code) else {
            return Ok(None);
        };
        if !entry.is_redeemable_at(now) {
            return Ok(None);
        }
        entry.used = true;
        Ok(Some(entry.value().clone()))
    }

    async fn cleanup_expired(&self, now: OffsetDateTime) -> AuthResult<u64> {
        let mut removed = 0u64;
        self.codes.retain(|_, code| {
            let keep = code.is_redeemable_at(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}

// =============================================================================
// Refresh tokens
// =============================================================================

/// In-memory [`RefreshTokenStorage`], keyed by token hash.
#[derive(Debug, Default)]
pub struct InMemoryRefreshTokenStorage {
    tokens: DashMap<String, RefreshToken>,
}

impl InMemoryRefreshTokenStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl RefreshTokenStorage for InMemoryRefreshTokenStorage {
    async fn put(&self, token: RefreshToken) -> AuthResult<()> {
        match self.tokens.entry(token.token_hash.clone()) {
            Entry::Occupied(_) => Err(AuthError::storage("duplicate refresh token")),
            Entry::Vacant(slot) => {
                slot.insert(token);
                Ok(())
            }
        }
    }

    async fn take_if_valid(
        &self,
        token_hash: &str,
        now: OffsetDateTime,
    ) -> AuthResult<Option<RefreshToken>> {
        Ok(self
            .tokens
            .remove_if(token_hash, |_, token| !token.is_expired_at(now))
            .map(|(_, token)| token))
    }

    async fn cleanup_expired(&self, now: OffsetDateTime) -> AuthResult<u64> {
        let mut removed = 0u64;
        self.tokens.retain(|_, token| {
            let keep = !token.is_expired_at(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}
