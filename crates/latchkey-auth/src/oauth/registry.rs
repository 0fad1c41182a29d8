//! Client registry.
//!
//! Registers OAuth clients with freshly generated credentials and looks
//! them up by ID.

use std::sync::Arc;

use tracing::info;

use crate::clock::Clock;
use crate::storage::ClientStorage;
use crate::types::{Client, ClientValidationError, GrantType};
use crate::{AuthError, AuthResult};

/// Client registration parameters.
#[derive(Debug, Clone, Default)]
pub struct ClientRegistration {
    /// Redirect URIs the client may use. Must be non-empty and absolute.
    pub redirect_uris: Vec<String>,

    /// Allowed grant types. `None` selects [`GrantType::defaults`].
    pub grant_types: Option<Vec<GrantType>>,
}

impl ClientRegistration {
    /// Registration with the default grant types.
    #[must_use]
    pub fn new(redirect_uris: Vec<String>) -> Self {
        Self {
            redirect_uris,
            grant_types: None,
        }
    }

    /// Restricts the client to the given grant types.
    #[must_use]
    pub fn with_grant_types(mut self, grant_types: Vec<GrantType>) -> Self {
        self.grant_types = Some(grant_types);
        self
    }
}

/// Registry of OAuth clients.
#[derive(Clone)]
pub struct ClientRegistry {
    storage: Arc<dyn ClientStorage>,
    clock: Arc<dyn Clock>,
}

impl ClientRegistry {
    /// Creates a registry over the given storage.
    #[must_use]
    pub fn new(storage: Arc<dyn ClientStorage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Registers a new client.
    ///
    /// Generates a client ID (128 bits) and secret (256 bits) and persists
    /// the client with a single atomic insert. Duplicate redirect URIs and
    /// grant types are collapsed.
    ///
    /// # Errors
    ///
    /// - `InvalidRegistration` if no redirect URI is given, a redirect URI is
    ///   not an absolute URL, or an empty grant type list is given
    /// - `Storage` if the client cannot be persisted
    pub async fn register(&self, registration: ClientRegistration) -> AuthResult<Client> {
        let mut redirect_uris = Vec::with_capacity(registration.redirect_uris.len());
        for uri in registration.redirect_uris {
            if !redirect_uris.contains(&uri) {
                redirect_uris.push(uri);
            }
        }

        let mut grant_types = Vec::new();
        for grant_type in registration.grant_types.unwrap_or_else(GrantType::defaults) {
            if !grant_types.contains(&grant_type) {
                grant_types.push(grant_type);
            }
        }

        let client = Client {
            client_id: Client::generate_client_id(),
            client_secret: Client::generate_client_secret(),
            redirect_uris,
            grant_types,
            created_at: self.clock.now(),
        };
        client.validate().map_err(registration_error)?;

        self.storage.create(&client).await?;

        info!(
            client_id = %client.client_id,
            redirect_uris = client.redirect_uris.len(),
            "Registered OAuth client"
        );

        Ok(client)
    }

    /// Looks up a client by ID.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no client has this ID
    /// - `Storage` if the lookup fails
    pub async fn get(&self, client_id: &str) -> AuthResult<Client> {
        self.storage
            .find_by_client_id(client_id)
            .await?
            .ok_or_else(|| AuthError::not_found("client"))
    }
}

fn registration_error(err: ClientValidationError) -> AuthError {
    match err {
        ClientValidationError::EmptyClientId | ClientValidationError::MissingSecret => {
            AuthError::internal(err.to_string())
        }
        _ => AuthError::invalid_registration(err.to_string()),
    }
}
