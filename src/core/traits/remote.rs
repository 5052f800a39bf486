use async_trait::async_trait;
use thiserror::Error;

use crate::core::models::public_key::{PublicKey, SealedSecret};

/// Errors from the hosting API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RemoteError {
    /// Token missing, expired, or lacking the required scopes.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("rate limited")]
    RateLimited,

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    /// The API answered, but not with what the operation expects.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Port for the hosting service that stores Actions secrets and variables.
///
/// The owner (user or organization) is fixed when the adapter is built;
/// every method names the repository it acts on. Implementations perform
/// exactly one logical mutation per call and never retry.
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Create the deployment environment, or leave it as is if present.
    async fn upsert_environment(&self, repo: &str, environment: &str) -> Result<(), RemoteError>;

    async fn environment_public_key(
        &self,
        repo: &str,
        environment: &str,
    ) -> Result<PublicKey, RemoteError>;

    async fn repository_public_key(&self, repo: &str) -> Result<PublicKey, RemoteError>;

    async fn put_environment_secret(
        &self,
        repo: &str,
        environment: &str,
        secret: &SealedSecret,
    ) -> Result<(), RemoteError>;

    async fn put_repository_secret(
        &self,
        repo: &str,
        secret: &SealedSecret,
    ) -> Result<(), RemoteError>;

    async fn create_environment_variable(
        &self,
        repo: &str,
        environment: &str,
        name: &str,
        value: &str,
    ) -> Result<(), RemoteError>;

    async fn create_repository_variable(
        &self,
        repo: &str,
        name: &str,
        value: &str,
    ) -> Result<(), RemoteError>;
}
