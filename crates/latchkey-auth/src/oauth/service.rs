//! Authorization endpoint service.
//!
//! Validates authorization requests against the registered client and
//! issues PKCE-bound authorization codes. Authentication of the resource
//! owner happens elsewhere; the service binds each code to the subject it
//! is handed.

use std::sync::Arc;

use time::Duration;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::oauth::authorize::{AuthorizationRequest, AuthorizationResponse};
use crate::oauth::pkce::PkceChallenge;
use crate::storage::{ClientStorage, CodeStorage};
use crate::types::{AuthorizationCode, Client, GrantType};
use crate::{AuthError, AuthResult};

/// Configuration for the authorization service.
#[derive(Debug, Clone)]
pub struct AuthorizationConfig {
    /// Authorization code lifetime.
    /// Default: 10 minutes (as recommended by RFC 6749 Section 4.1.2).
    pub code_lifetime: Duration,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            code_lifetime: Duration::minutes(10),
        }
    }
}

impl AuthorizationConfig {
    /// Creates a new configuration with custom code lifetime.
    #[must_use]
    pub fn with_code_lifetime(mut self, lifetime: Duration) -> Self {
        self.code_lifetime = lifetime;
        self
    }
}

/// Authorization endpoint service.
pub struct AuthorizationService {
    client_storage: Arc<dyn ClientStorage>,
    code_storage: Arc<dyn CodeStorage>,
    clock: Arc<dyn Clock>,
    config: AuthorizationConfig,
}

impl AuthorizationService {
    /// Creates a new authorization service.
    #[must_use]
    pub fn new(
        client_storage: Arc<dyn ClientStorage>,
        code_storage: Arc<dyn CodeStorage>,
        clock: Arc<dyn Clock>,
        config: AuthorizationConfig,
    ) -> Self {
        Self {
            client_storage,
            code_storage,
            clock,
            config,
        }
    }

    /// Validates and fulfils an authorization request for `subject`.
    ///
    /// Returns the issued code and the request's `state`, unchanged.
    ///
    /// # Errors
    ///
    /// See [`validate_request`](Self::validate_request) and
    /// [`issue_code`](Self::issue_code).
    pub async fn authorize(
        &self,
        request: &AuthorizationRequest,
        subject: &str,
    ) -> AuthResult<AuthorizationResponse> {
        let (client, challenge) = self.validate_request(request).await?;
        let code = self.issue_code(&client.client_id, subject, challenge).await?;
        Ok(AuthorizationResponse::new(code.code, request.state.clone()))
    }

    /// Validates an authorization request.
    ///
    /// Checks run in a fixed order and stop at the first failure.
    ///
    /// # Errors
    ///
    /// - `InvalidClient` if the client is unknown or may not use the
    ///   authorization_code grant
    /// - `InvalidRedirectUri` if the redirect URI is not registered verbatim
    /// - `UnsupportedResponseType` if `response_type` is not `code`
    /// - `InvalidPkceParams` if the challenge is empty or the method unknown
    /// - `Storage` if the client lookup fails
    pub async fn validate_request(
        &self,
        request: &AuthorizationRequest,
    ) -> AuthResult<(Client, PkceChallenge)> {
        debug!(client_id = %request.client_id, "Validating authorization request");

        // 1. Client exists and may use this flow
        let client = self
            .client_storage
            .find_by_client_id(&request.client_id)
            .await?
            .ok_or_else(|| AuthError::invalid_client("Unknown client"))?;

        if !client.is_grant_type_allowed(GrantType::AuthorizationCode) {
            return Err(AuthError::invalid_client(
                "Client is not authorized for authorization_code grant",
            ));
        }

        // 2. Redirect URI is an exact registered match
        if !client.is_redirect_uri_allowed(&request.redirect_uri) {
            return Err(AuthError::InvalidRedirectUri);
        }

        // 3. Response type
        if request.response_type != "code" {
            return Err(AuthError::unsupported_response_type(&request.response_type));
        }

        // 4. PKCE parameters
        let challenge = PkceChallenge::new(
            request.code_challenge.as_str(),
            &request.code_challenge_method,
        )?;

        Ok((client, challenge))
    }

    /// Issues a fresh authorization code.
    ///
    /// The code is stored unused with the configured lifetime. No
    /// authentication happens here.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the code cannot be persisted.
    pub async fn issue_code(
        &self,
        client_id: &str,
        subject: &str,
        challenge: PkceChallenge,
    ) -> AuthResult<AuthorizationCode> {
        let now = self.clock.now();
        let code = AuthorizationCode {
            code: AuthorizationCode::generate_code(),
            client_id: client_id.to_string(),
            subject: subject.to_string(),
            challenge,
            issued_at: now,
            expires_at: now + self.config.code_lifetime,
            used: false,
        };

        self.code_storage.put(code.clone()).await?;

        info!(
            client_id = %client_id,
            method = %code.challenge.method(),
            "Issued authorization code"
        );

        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;
    use crate::clock::ManualClock;
    use crate::oauth::pkce::PkceChallengeMethod;
    use crate::storage::{InMemoryClientStorage, InMemoryCodeStorage};

    const CHALLENGE: &str = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM";

    fn t0() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
    }

    fn client(grant_types: Vec<GrantType>) -> Client {
        Client {
            client_id: "test-client".to_string(),
            client_secret: "secret".to_string(),
            redirect_uris: vec![
                "https://app.example.com/callback".to_string(),
                "https://app.example.com/other".to_string(),
            ],
            grant_types,
            created_at: t0(),
        }
    }

    async fn service_with(client: Client) -> (AuthorizationService, Arc<InMemoryCodeStorage>) {
        let clients = Arc::new(InMemoryClientStorage::new());
        clients.create(&client).await.unwrap();
        let codes = Arc::new(InMemoryCodeStorage::new());
        let service = AuthorizationService::new(
            clients,
            codes.clone(),
            Arc::new(ManualClock::new(t0())),
            AuthorizationConfig::default(),
        );
        (service, codes)
    }

    fn request() -> AuthorizationRequest {
        AuthorizationRequest {
            response_type: "code".to_string(),
            client_id: "test-client".to_string(),
            redirect_uri: "https://app.example.com/callback".to_string(),
            state: Some("xyz".to_string()),
            code_challenge: CHALLENGE.to_string(),
            code_challenge_method: "S256".to_string(),
        }
    }

    #[tokio::test]
    async fn test_authorize_issues_code_and_echoes_state() {
        let (service, codes) = service_with(client(GrantType::defaults())).await;

        let response = service.authorize(&request(), "user-1").await.unwrap();
        assert_eq!(response.state.as_deref(), Some("xyz"));
        assert_eq!(response.code.len(), 43);

        let stored = codes.take_if_valid(&response.code, t0()).await.unwrap().unwrap();
        assert_eq!(stored.subject, "user-1");
        assert_eq!(stored.client_id, "test-client");
        assert_eq!(stored.challenge.as_str(), CHALLENGE);
        assert_eq!(stored.challenge.method(), PkceChallengeMethod::S256);
        assert_eq!(stored.expires_at, t0() + Duration::minutes(10));
    }

    #[tokio::test]
    async fn test_every_registered_redirect_uri_is_accepted() {
        let client = client(GrantType::defaults());
        let (service, _) = service_with(client.clone()).await;

        for uri in &client.redirect_uris {
            let mut req = request();
            req.redirect_uri = uri.clone();
            assert!(service.authorize(&req, "user").await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_unknown_client() {
        let (service, _) = service_with(client(GrantType::defaults())).await;
        let mut req = request();
        req.client_id = "unknown".to_string();

        let err = service.authorize(&req, "user").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidClient { .. }));
    }

    #[tokio::test]
    async fn test_client_without_authorization_code_grant() {
        let (service, _) = service_with(client(vec![GrantType::RefreshToken])).await;
        let err = service.authorize(&request(), "user").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidClient { .. }));
    }

    #[tokio::test]
    async fn test_unregistered_redirect_uri() {
        let (service, _) = service_with(client(GrantType::defaults())).await;

        for uri in [
            "https://app.example.com/callback/",
            "https://app.example.com/callback?x=1",
            "https://evil.example.com/callback",
            "",
        ] {
            let mut req = request();
            req.redirect_uri = uri.to_string();
            let err = service.authorize(&req, "user").await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidRedirectUri), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_redirect_checked_before_response_type() {
        let (service, _) = service_with(client(GrantType::defaults())).await;
        let mut req = request();
        req.redirect_uri = "https://evil.example.com".to_string();
        req.response_type = "token".to_string();

        let err = service.authorize(&req, "user").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidRedirectUri));
    }

    #[tokio::test]
    async fn test_unsupported_response_type() {
        let (service, _) = service_with(client(GrantType::defaults())).await;
        let mut req = request();
        req.response_type = "token".to_string();

        let err = service.authorize(&req, "user").await.unwrap_err();
        assert!(matches!(err, AuthError::UnsupportedResponseType { .. }));
    }

    #[tokio::test]
    async fn test_invalid_pkce_params() {
        let (service, codes) = service_with(client(GrantType::defaults())).await;

        let mut empty_challenge = request();
        empty_challenge.code_challenge = String::new();
        let mut bad_method = request();
        bad_method.code_challenge_method = "S512".to_string();
        let mut missing_method = request();
        missing_method.code_challenge_method = String::new();

        for req in [empty_challenge, bad_method, missing_method] {
            let err = service.authorize(&req, "user").await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidPkceParams { .. }));
        }
        assert!(codes.is_empty());
    }

    #[tokio::test]
    async fn test_plain_method_accepted() {
        let (service, _) = service_with(client(GrantType::defaults())).await;
        let mut req = request();
        req.code_challenge = "plain-verifier".to_string();
        req.code_challenge_method = "plain".to_string();

        assert!(service.authorize(&req, "user").await.is_ok());
    }
}
