//! Repository boundary for the Catalog domain
//!
//! Provides the [`EntityRepository`] contract with two implementations:
//! - [`RemoteEntityRepository`]: REST backend over HTTP
//! - [`MockEntityRepository`]: in-memory backend for development and tests

pub mod client;
pub mod mock;

use atrium_common::{Config, RepositoryError};

use crate::domain::entities::{Entity, EntityPatch, ScopeId};

pub use client::RemoteEntityRepository;
pub use mock::{MockEntityRepository, RecordedCall};

/// Data access contract consumed by list screens.
///
/// Any failure is reported as a [`RepositoryError`]; a call either fully
/// succeeds or has no effect.
#[async_trait::async_trait]
pub trait EntityRepository: Send + Sync {
    /// Load the full collection of a scope
    async fn fetch_collection(&self, scope: &ScopeId) -> Result<Vec<Entity>, RepositoryError>;

    /// Update fields of an entity
    async fn mutate(&self, entity_id: &str, patch: &EntityPatch)
        -> Result<Entity, RepositoryError>;

    /// Delete an entity
    async fn remove(&self, entity_id: &str) -> Result<(), RepositoryError>;

    /// Move an entity to a new status
    async fn change_status(
        &self,
        entity_id: &str,
        new_status: &str,
    ) -> Result<Entity, RepositoryError>;
}

/// Factory for creating EntityRepository implementations.
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create an EntityRepository based on configuration.
    pub fn create(config: &Config) -> Result<Box<dyn EntityRepository>, RepositoryError> {
        match config.repository_provider.as_str() {
            "remote" => {
                tracing::info!("Creating remote entity repository");
                let base_url = config.api_base_url.clone().ok_or_else(|| {
                    RepositoryError::InvalidData(
                        "ATRIUM_API_BASE_URL is required for the remote provider".to_string(),
                    )
                })?;
                Ok(Box::new(RemoteEntityRepository::new(
                    base_url,
                    config.api_token.clone(),
                )))
            }
            "mock" => {
                tracing::info!("Creating in-memory entity repository");
                Ok(Box::new(MockEntityRepository::new()))
            }
            other => Err(RepositoryError::InvalidData(format!(
                "Unknown repository provider '{}'",
                other
            ))),
        }
    }
}
