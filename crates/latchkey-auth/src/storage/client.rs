//! Client storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Client;

/// Storage trait for OAuth client registrations.
///
/// Clients are immutable after registration, so the trait only creates and
/// reads.
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Finds a client by its client ID.
    ///
    /// Returns `None` if the client doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>>;

    /// Stores a new client if no client with the same ID exists.
    ///
    /// The insert is atomic: readers never observe a partially written
    /// client.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the client ID is already taken or the
    /// storage operation fails.
    async fn create(&self, client: &Client) -> AuthResult<()>;
}
