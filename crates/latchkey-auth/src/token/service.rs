//! Token exchange service.
//!
//! Implements the token endpoint state machine:
//!
//! - `authorization_code`: redeem a PKCE-bound code exactly once
//! - `refresh_token`: rotate a refresh token (the old one is deleted before
//!   its successor is returned)
//!
//! Refresh tokens are only issued to clients registered for the
//! `refresh_token` grant.
//!
//! Every request terminates on its first failure. The only mutation that
//! survives a failure is the consumption of the presented code or refresh
//! token.

use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::oauth::token::{TokenRequest, TokenResponse};
use crate::storage::{ClientStorage, CodeStorage, RefreshTokenStorage};
use crate::token::jwt::AccessTokenCodec;
use crate::types::{GrantType, RefreshToken};
use crate::{AuthError, AuthResult};

/// Configuration for token issuance.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Access token lifetime. Default: 1 hour.
    pub access_token_lifetime: Duration,

    /// Refresh token lifetime. Default: 30 days.
    pub refresh_token_lifetime: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime: Duration::hours(1),
            refresh_token_lifetime: Duration::days(30),
        }
    }
}

impl TokenConfig {
    /// Sets the access token lifetime.
    #[must_use]
    pub fn with_access_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.access_token_lifetime = lifetime;
        self
    }

    /// Sets the refresh token lifetime.
    #[must_use]
    pub fn with_refresh_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.refresh_token_lifetime = lifetime;
        self
    }
}

/// Token endpoint service.
pub struct TokenService {
    codec: Arc<AccessTokenCodec>,
    client_storage: Arc<dyn ClientStorage>,
    code_storage: Arc<dyn CodeStorage>,
    refresh_token_storage: Arc<dyn RefreshTokenStorage>,
    clock: Arc<dyn Clock>,
    config: TokenConfig,
}

impl TokenService {
    /// Creates a new token service.
    #[must_use]
    pub fn new(
        codec: Arc<AccessTokenCodec>,
        client_storage: Arc<dyn ClientStorage>,
        code_storage: Arc<dyn CodeStorage>,
        refresh_token_storage: Arc<dyn RefreshTokenStorage>,
        clock: Arc<dyn Clock>,
        config: TokenConfig,
    ) -> Self {
        Self {
            codec,
            client_storage,
            code_storage,
            refresh_token_storage,
            clock,
            config,
        }
    }

    /// Handles a token request, dispatching on `grant_type`.
    ///
    /// # Errors
    ///
    /// - `UnsupportedGrantType` for anything but `authorization_code` or
    ///   `refresh_token`
    /// - the errors of [`exchange_code`](Self::exchange_code) and
    ///   [`refresh`](Self::refresh)
    pub async fn exchange(&self, request: &TokenRequest) -> AuthResult<TokenResponse> {
        match GrantType::parse(&request.grant_type) {
            Some(GrantType::AuthorizationCode) => self.exchange_code(request).await,
            Some(GrantType::RefreshToken) => self.refresh(request).await,
            None => Err(AuthError::unsupported_grant_type(&request.grant_type)),
        }
    }

    /// Redeems an authorization code.
    ///
    /// The code is consumed before the verifier is checked, so a replay
    /// reports `InvalidAuthorizationCode` whatever verifier it carries.
    ///
    /// # Errors
    ///
    /// - `InvalidAuthorizationCode` if the code is missing, unknown, already
    ///   used, expired, or was issued to a different `client_id`
    /// - `InvalidCodeVerifier` if the verifier is missing or does not match
    ///   (the code stays consumed)
    /// - `Storage` / `Internal` on infrastructure failure
    pub async fn exchange_code(&self, request: &TokenRequest) -> AuthResult<TokenResponse> {
        let now = self.clock.now();

        let code = non_empty(&request.code).ok_or(AuthError::InvalidAuthorizationCode)?;

        // 1. Fetch and invalidate the code in one atomic step
        let Some(record) = self.code_storage.take_if_valid(code, now).await? else {
            warn!("Rejected authorization code: unknown, used or expired");
            return Err(AuthError::InvalidAuthorizationCode);
        };

        // 2. Client binding
        if let Some(client_id) = non_empty(&request.client_id)
            && client_id != record.client_id
        {
            warn!(
                client_id = %client_id,
                "Authorization code was issued to a different client"
            );
            return Err(AuthError::InvalidAuthorizationCode);
        }

        // 3. PKCE; an absent verifier fails like a wrong one
        let verified = non_empty(&request.code_verifier)
            .is_some_and(|verifier| record.challenge.verify(verifier));
        if !verified {
            warn!(client_id = %record.client_id, "PKCE verification failed");
            return Err(AuthError::InvalidCodeVerifier);
        }

        let with_refresh = self
            .allowed_grant(&record.client_id, GrantType::RefreshToken)
            .await?;

        debug!(client_id = %record.client_id, "Authorization code redeemed");
        self.issue_tokens(&record.subject, &record.client_id, now, with_refresh)
            .await
    }

    /// Rotates a refresh token.
    ///
    /// # Errors
    ///
    /// - `InvalidRefreshToken` if the token is missing, unknown, expired,
    ///   or was issued to a different `client_id`
    /// - `UnauthorizedClient` if the client may not use the `refresh_token`
    ///   grant
    /// - `Storage` / `Internal` on infrastructure failure
    pub async fn refresh(&self, request: &TokenRequest) -> AuthResult<TokenResponse> {
        let now = self.clock.now();

        let value = non_empty(&request.refresh_token).ok_or(AuthError::InvalidRefreshToken)?;
        let token_hash = RefreshToken::hash_token(value);

        let Some(stored) = self
            .refresh_token_storage
            .take_if_valid(&token_hash, now)
            .await?
        else {
            warn!("Rejected refresh token: unknown, rotated or expired");
            return Err(AuthError::InvalidRefreshToken);
        };

        if let Some(client_id) = non_empty(&request.client_id)
            && client_id != stored.client_id
        {
            warn!(
                client_id = %client_id,
                "Refresh token was issued to a different client"
            );
            return Err(AuthError::InvalidRefreshToken);
        }

        if !self
            .allowed_grant(&stored.client_id, GrantType::RefreshToken)
            .await?
        {
            warn!(client_id = %stored.client_id, "Client may not use the refresh_token grant");
            return Err(AuthError::unauthorized_client(GrantType::RefreshToken.as_str()));
        }

        debug!(client_id = %stored.client_id, "Refresh token rotated");
        self.issue_tokens(&stored.subject, &stored.client_id, now, true)
            .await
    }

    /// Returns `true` if `client_id` is registered for `grant_type`.
    async fn allowed_grant(&self, client_id: &str, grant_type: GrantType) -> AuthResult<bool> {
        Ok(self
            .client_storage
            .find_by_client_id(client_id)
            .await?
            .is_some_and(|client| client.is_grant_type_allowed(grant_type)))
    }

    /// Issues an access token for `(subject, client_id)`, plus a new refresh
    /// token when `with_refresh` is set.
    async fn issue_tokens(
        &self,
        subject: &str,
        client_id: &str,
        now: OffsetDateTime,
        with_refresh: bool,
    ) -> AuthResult<TokenResponse> {
        let access_token =
            self.codec
                .issue_at(subject, now, self.config.access_token_lifetime)?;

        let refresh_value = if with_refresh {
            let value = RefreshToken::generate_token();
            let record = RefreshToken::new(
                &value,
                client_id,
                subject,
                now,
                now + self.config.refresh_token_lifetime,
            );
            self.refresh_token_storage.put(record).await?;
            Some(value)
        } else {
            None
        };

        info!(
            client_id = %client_id,
            refresh_token = refresh_value.is_some(),
            "Issued tokens"
        );

        let expires_in =
            u64::try_from(self.config.access_token_lifetime.whole_seconds()).unwrap_or_default();
        Ok(TokenResponse::new(access_token, refresh_value, expires_in))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
