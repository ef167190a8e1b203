//! Mock Entity Repository Implementation
//!
//! In-memory backend for development and tests:
//! - entities stored per tenant, in insertion order
//! - every call recorded for assertions
//! - programmable failures and latency
//!
//! Thread-safe via `Arc<Mutex<>>`. Status changes are checked against the
//! lifecycle like a real backend would; a request that is no longer legal
//! (because the stored status moved on) is answered with a conflict.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use atrium_common::RepositoryError;

use crate::domain::entities::{Entity, EntityPatch, ScopeId};
use crate::repository::EntityRepository;

/// A repository call observed by the mock
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    FetchCollection(ScopeId),
    Mutate {
        entity_id: String,
        patch: EntityPatch,
    },
    Remove(String),
    ChangeStatus {
        entity_id: String,
        new_status: String,
    },
}

impl RecordedCall {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, RecordedCall::FetchCollection(_))
    }
}

#[derive(Debug, Default)]
struct MockState {
    entities: Vec<(String, Entity)>,
    calls: Vec<RecordedCall>,
    fail_next_fetch: Option<RepositoryError>,
    fail_next_mutation: Option<RepositoryError>,
    latency: Duration,
}

/// In-memory entity repository with programmable behavior
#[derive(Debug, Clone, Default)]
pub struct MockEntityRepository {
    state: Arc<Mutex<MockState>>,
}

impl MockEntityRepository {
    /// Create an empty mock repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state
            .lock()
            .expect("mock repository lock poisoned, prior test panicked")
    }

    fn lock(&self) -> Result<MutexGuard<'_, MockState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|e| RepositoryError::Transport(format!("mock repository lock poisoned: {e}")))
    }

    /// Store entities under a tenant, replacing entities with the same id
    pub fn seed(&self, tenant_id: &str, entities: impl IntoIterator<Item = Entity>) {
        let mut state = self.state();
        for entity in entities {
            state.entities.retain(|(_, e)| e.id != entity.id);
            state.entities.push((tenant_id.to_string(), entity));
        }
    }

    /// Current stored entity
    pub fn entity(&self, entity_id: &str) -> Option<Entity> {
        self.state()
            .entities
            .iter()
            .find(|(_, e)| e.id == entity_id)
            .map(|(_, e)| e.clone())
    }

    /// Overwrite a stored status without lifecycle checks, as another client
    /// racing this one would
    pub fn force_status(&self, entity_id: &str, status: &str) {
        if let Some((_, entity)) = self
            .state()
            .entities
            .iter_mut()
            .find(|(_, e)| e.id == entity_id)
        {
            entity.status = status.to_string();
        }
    }

    /// Fail the next `fetch_collection` call with `error`
    pub fn fail_next_fetch(&self, error: RepositoryError) {
        self.state().fail_next_fetch = Some(error);
    }

    /// Fail the next mutate, remove or change-status call with `error`
    pub fn fail_next_mutation(&self, error: RepositoryError) {
        self.state().fail_next_mutation = Some(error);
    }

    /// Delay every call by `latency`
    pub fn set_latency(&self, latency: Duration) {
        self.state().latency = latency;
    }

    /// Return all recorded calls.
    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    /// Number of recorded calls that would have mutated backend state
    pub fn mutation_count(&self) -> usize {
        self.state().calls.iter().filter(|c| c.is_mutation()).count()
    }

    /// Number of recorded collection fetches
    pub fn fetch_count(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| !c.is_mutation())
            .count()
    }

    /// Clear recorded calls and programmed failures, keeping stored entities.
    pub fn reset(&self) {
        let mut state = self.state();
        state.calls.clear();
        state.fail_next_fetch = None;
        state.fail_next_mutation = None;
        state.latency = Duration::ZERO;
    }

    /// Record the call and return the configured latency and pending failure
    fn begin(
        &self,
        call: RecordedCall,
    ) -> Result<(Duration, Option<RepositoryError>), RepositoryError> {
        let mut state = self.lock()?;
        let failure = if call.is_mutation() {
            state.fail_next_mutation.take()
        } else {
            state.fail_next_fetch.take()
        };
        state.calls.push(call);
        Ok((state.latency, failure))
    }

    async fn settle(&self, call: RecordedCall) -> Result<(), RepositoryError> {
        let (latency, failure) = self.begin(call)?;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl EntityRepository for MockEntityRepository {
    async fn fetch_collection(&self, scope: &ScopeId) -> Result<Vec<Entity>, RepositoryError> {
        tracing::debug!(scope = %scope, "Mock repository: fetching collection");
        self.settle(RecordedCall::FetchCollection(scope.clone()))
            .await?;

        let state = self.lock()?;
        Ok(state
            .entities
            .iter()
            .filter(|(tenant, e)| *tenant == scope.tenant_id && e.entity_type == scope.entity_type)
            .map(|(_, e)| e.clone())
            .collect())
    }

    async fn mutate(
        &self,
        entity_id: &str,
        patch: &EntityPatch,
    ) -> Result<Entity, RepositoryError> {
        tracing::debug!(entity_id = %entity_id, "Mock repository: mutating entity");
        self.settle(RecordedCall::Mutate {
            entity_id: entity_id.to_string(),
            patch: patch.clone(),
        })
        .await?;

        let mut state = self.lock()?;
        let (_, entity) = state
            .entities
            .iter_mut()
            .find(|(_, e)| e.id == entity_id)
            .ok_or(RepositoryError::NotFound)?;
        entity
            .apply_patch(patch)
            .map_err(|e| RepositoryError::Rejected {
                status: 422,
                message: e.to_string(),
            })?;
        Ok(entity.clone())
    }

    async fn remove(&self, entity_id: &str) -> Result<(), RepositoryError> {
        tracing::debug!(entity_id = %entity_id, "Mock repository: removing entity");
        self.settle(RecordedCall::Remove(entity_id.to_string()))
            .await?;

        let mut state = self.lock()?;
        let before = state.entities.len();
        state.entities.retain(|(_, e)| e.id != entity_id);
        if state.entities.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn change_status(
        &self,
        entity_id: &str,
        new_status: &str,
    ) -> Result<Entity, RepositoryError> {
        tracing::debug!(
            entity_id = %entity_id,
            new_status = %new_status,
            "Mock repository: changing status"
        );
        self.settle(RecordedCall::ChangeStatus {
            entity_id: entity_id.to_string(),
            new_status: new_status.to_string(),
        })
        .await?;

        let mut state = self.lock()?;
        let (_, entity) = state
            .entities
            .iter_mut()
            .find(|(_, e)| e.id == entity_id)
            .ok_or(RepositoryError::NotFound)?;
        entity
            .transition_to(new_status)
            .map_err(|e| RepositoryError::Conflict(e.to_string()))?;
        Ok(entity.clone())
    }
}
