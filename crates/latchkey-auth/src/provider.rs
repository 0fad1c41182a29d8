//! Wiring of the registry, endpoints and guard over a set of stores.

use std::sync::Arc;

use tracing::debug;

use crate::AuthResult;
use crate::clock::{Clock, SystemClock};
use crate::config::{AuthConfig, ConfigError};
use crate::middleware::BearerAuthGuard;
use crate::oauth::{AuthorizationService, ClientRegistry};
use crate::storage::{
    ClientStorage, CodeStorage, InMemoryClientStorage, InMemoryCodeStorage,
    InMemoryRefreshTokenStorage, RefreshTokenStorage,
};
use crate::token::{AccessTokenCodec, TokenService};

/// Storage backends used by an [`OAuthProvider`].
#[derive(Clone)]
pub struct Storages {
    /// Client registrations.
    pub clients: Arc<dyn ClientStorage>,
    /// Authorization codes.
    pub codes: Arc<dyn CodeStorage>,
    /// Refresh tokens.
    pub refresh_tokens: Arc<dyn RefreshTokenStorage>,
}

impl Storages {
    /// Fresh in-memory stores.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            clients: Arc::new(InMemoryClientStorage::new()),
            codes: Arc::new(InMemoryCodeStorage::new()),
            refresh_tokens: Arc::new(InMemoryRefreshTokenStorage::new()),
        }
    }
}

/// Counts reported by [`OAuthProvider::cleanup_expired`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Used or expired authorization codes removed.
    pub codes: u64,
    /// Expired refresh tokens removed.
    pub refresh_tokens: u64,
}

/// The authorization server core, assembled from configuration.
pub struct OAuthProvider {
    registry: ClientRegistry,
    authorization: AuthorizationService,
    tokens: TokenService,
    guard: BearerAuthGuard,
    storages: Storages,
    clock: Arc<dyn Clock>,
}

impl OAuthProvider {
    /// Builds a provider on the system clock.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the configuration does not validate.
    pub fn new(config: &AuthConfig, storages: Storages) -> Result<Self, ConfigError> {
        Self::with_clock(config, storages, Arc::new(SystemClock))
    }

    /// Builds a provider with an explicit clock.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the configuration does not validate.
    pub fn with_clock(
        config: &AuthConfig,
        storages: Storages,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let codec = Arc::new(
            AccessTokenCodec::new(config.signing.secret.as_bytes(), clock.clone())
                .map_err(|e| ConfigError::InvalidValue(e.to_string()))?,
        );

        let registry = ClientRegistry::new(storages.clients.clone(), clock.clone());
        let authorization = AuthorizationService::new(
            storages.clients.clone(),
            storages.codes.clone(),
            clock.clone(),
            config.oauth.authorization_config()?,
        );
        let tokens = TokenService::new(
            codec.clone(),
            storages.clients.clone(),
            storages.codes.clone(),
            storages.refresh_tokens.clone(),
            clock.clone(),
            config.oauth.token_config()?,
        );

        Ok(Self {
            registry,
            authorization,
            tokens,
            guard: BearerAuthGuard::new(codec),
            storages,
            clock,
        })
    }

    /// Client registry.
    #[must_use]
    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    /// Authorization endpoint service.
    #[must_use]
    pub fn authorization(&self) -> &AuthorizationService {
        &self.authorization
    }

    /// Token endpoint service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Bearer token guard.
    #[must_use]
    pub fn guard(&self) -> &BearerAuthGuard {
        &self.guard
    }

    /// Purges used and expired codes and expired refresh tokens.
    ///
    /// Expiry is always enforced on read, so this only reclaims memory.
    ///
    /// # Errors
    ///
    /// Returns a storage error if either store fails.
    pub async fn cleanup_expired(&self) -> AuthResult<CleanupReport> {
        let now = self.clock.now();
        let report = CleanupReport {
            codes: self.storages.codes.cleanup_expired(now).await?,
            refresh_tokens: self.storages.refresh_tokens.cleanup_expired(now).await?,
        };
        debug!(
            codes = report.codes,
            refresh_tokens = report.refresh_tokens,
            "Expired grant cleanup finished"
        );
        Ok(report)
    }
}
