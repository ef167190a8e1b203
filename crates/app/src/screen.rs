//! List screen: one collection view bound to one repository scope
//!
//! The screen loads its collection, derives the visible page through the
//! collection view engine and dispatches row mutations. Every mutation is
//! keyed by its entity id:
//! - it is validated locally before any I/O
//! - the id is flagged busy until the call settles (a drop guard clears it)
//! - a second mutation on a busy id is rejected
//! - success triggers exactly one refresh, a conflict forces one
//!
//! The view lives behind a `std::sync::Mutex` that is never held across an
//! `.await`. After [`CollectionScreen::unmount`] the view is gone and every
//! call, including late responses of in-flight requests, fails with
//! [`ScreenError::Unmounted`].

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use atrium_catalog::{
    Entity, EntityPatch, EntityRepository, LifecycleResolver, ScopeId, TransitionDescriptor,
};
use atrium_common::{FieldValue, RepositoryError};
use atrium_view::{CollectionView, EmptyState, SortRule, ViewConfig};

use crate::error::{ScreenError, ScreenErrorKind};

// ============================================================================
// Presentation Snapshot
// ============================================================================

/// A transition offered in a row's action menu
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowAction {
    pub target_status: &'static str,
    #[serde(flatten)]
    pub descriptor: TransitionDescriptor,
}

/// One rendered row
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowView {
    pub entity: Entity,
    pub selected: bool,
    /// A mutation on this row is in flight; its actions should be disabled
    pub busy: bool,
    pub actions: Vec<RowAction>,
}

/// Everything the presentation layer renders for a screen
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenSnapshot {
    pub rows: Vec<RowView>,
    pub total_count: usize,
    pub raw_count: usize,
    pub page_index: usize,
    pub page_count: usize,
    pub empty_state: EmptyState,
    pub selected_count: usize,
    pub page_fully_selected: bool,
    pub error: Option<String>,
    pub error_kind: Option<ScreenErrorKind>,
}

fn row_actions(entity: &Entity) -> Vec<RowAction> {
    entity
        .available_transitions()
        .iter()
        .copied()
        .map(|status| RowAction {
            target_status: status,
            descriptor: LifecycleResolver::describe_transition(status),
        })
        .collect()
}

// ============================================================================
// Screen State
// ============================================================================

struct ScreenState {
    view: CollectionView<Entity>,
    busy: BTreeSet<String>,
    /// Generation of the most recently issued refresh
    issued: u64,
    /// Generation of the refresh whose result is shown
    applied: u64,
    last_error: Option<ScreenError>,
}

impl ScreenState {
    fn new(config: &ViewConfig) -> Self {
        Self {
            view: CollectionView::with_config(config),
            busy: BTreeSet::new(),
            issued: 0,
            applied: 0,
            last_error: None,
        }
    }

    /// Apply the result of refresh `generation` unless a newer one already
    /// landed
    fn apply_fetch(
        &mut self,
        scope: &ScopeId,
        generation: u64,
        result: Result<Vec<Entity>, RepositoryError>,
    ) -> Result<(), ScreenError> {
        if generation < self.applied {
            debug!(
                scope = %scope,
                generation,
                applied = self.applied,
                "Discarding out-of-order refresh"
            );
            return Ok(());
        }
        self.applied = generation;

        let failure = match result {
            Ok(rows) => {
                let count = rows.len();
                match self.view.replace_snapshot(rows) {
                    Ok(()) => {
                        info!(scope = %scope, count, "Collection loaded");
                        self.last_error = None;
                        return Ok(());
                    }
                    Err(e) => RepositoryError::InvalidData(e.to_string()),
                }
            }
            Err(e) => e,
        };

        error!(scope = %scope, error = %failure, "Failed to load collection");
        self.view.mark_failed(failure.to_string());
        let err = ScreenError::FetchFailure(failure);
        self.last_error = Some(err.clone());
        Err(err)
    }
}

fn lock(state: &Mutex<Option<ScreenState>>) -> MutexGuard<'_, Option<ScreenState>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears an entity's busy flag once its mutation settles, on every path
struct BusyGuard {
    state: Arc<Mutex<Option<ScreenState>>>,
    entity_id: String,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        if let Some(state) = lock(&self.state).as_mut() {
            state.busy.remove(&self.entity_id);
        }
    }
}

// ============================================================================
// Collection Screen
// ============================================================================

/// A mounted list screen. Clones share the same view.
#[derive(Clone)]
pub struct CollectionScreen {
    scope: ScopeId,
    repository: Arc<dyn EntityRepository>,
    state: Arc<Mutex<Option<ScreenState>>>,
}

impl CollectionScreen {
    /// Mount a screen over `scope`. Nothing is fetched until [`load`](Self::load).
    pub fn mount(
        scope: ScopeId,
        repository: Arc<dyn EntityRepository>,
        config: &ViewConfig,
    ) -> Self {
        debug!(scope = %scope, page_size = config.page_size, "Mounting collection screen");
        Self {
            scope,
            repository,
            state: Arc::new(Mutex::new(Some(ScreenState::new(config)))),
        }
    }

    pub fn scope(&self) -> &ScopeId {
        &self.scope
    }

    pub fn is_mounted(&self) -> bool {
        lock(&self.state).is_some()
    }

    /// Discard the view. In-flight requests settle against nothing.
    pub fn unmount(&self) {
        if lock(&self.state).take().is_some() {
            debug!(scope = %self.scope, "Collection screen unmounted");
        }
    }

    fn with_mounted<T>(&self, f: impl FnOnce(&mut ScreenState) -> T) -> Result<T, ScreenError> {
        let mut guard = lock(&self.state);
        let state = guard.as_mut().ok_or(ScreenError::Unmounted)?;
        Ok(f(state))
    }

    // ------------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------------

    /// Initial fetch
    pub async fn load(&self) -> Result<(), ScreenError> {
        self.refresh().await
    }

    /// Fetch the collection again and replace the snapshot wholesale.
    ///
    /// While the fetch is in flight the previous snapshot keeps being served.
    pub async fn refresh(&self) -> Result<(), ScreenError> {
        let generation = self.with_mounted(|state| {
            state.issued += 1;
            state.issued
        })?;
        debug!(scope = %self.scope, generation, "Refreshing collection");

        let result = self.repository.fetch_collection(&self.scope).await;
        self.with_mounted(|state| state.apply_fetch(&self.scope, generation, result))?
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    /// Request a status change. Illegal transitions never reach the repository.
    pub async fn change_status(&self, entity_id: &str, requested: &str) -> Result<(), ScreenError> {
        let _busy = self.begin_mutation(entity_id, |entity| {
            LifecycleResolver::validate_transition(entity.entity_type, &entity.status, requested)
                .map_err(|e| ScreenError::ValidationFailure(e.to_string()))
        })?;

        info!(entity_id = %entity_id, requested = %requested, "Dispatching status change");
        let result = self
            .repository
            .change_status(entity_id, requested)
            .await
            .map(drop);
        self.settle(entity_id, result).await
    }

    /// Update fields of an entity
    pub async fn mutate(&self, entity_id: &str, patch: &EntityPatch) -> Result<(), ScreenError> {
        let _busy = self.begin_mutation(entity_id, |entity| {
            if patch.is_empty() {
                return Err(ScreenError::ValidationFailure(
                    "Nothing to change".to_string(),
                ));
            }
            entity
                .clone()
                .apply_patch(patch)
                .map_err(|e| ScreenError::ValidationFailure(e.to_string()))
        })?;

        info!(entity_id = %entity_id, fields = patch.fields.len(), "Dispatching update");
        let result = self.repository.mutate(entity_id, patch).await.map(drop);
        self.settle(entity_id, result).await
    }

    /// Delete an entity
    pub async fn remove(&self, entity_id: &str) -> Result<(), ScreenError> {
        let _busy = self.begin_mutation(entity_id, |_| Ok(()))?;

        info!(entity_id = %entity_id, "Dispatching removal");
        let result = self.repository.remove(entity_id).await;
        self.settle(entity_id, result).await
    }

    /// Validate a mutation against the current snapshot and flag its entity
    /// busy
    fn begin_mutation(
        &self,
        entity_id: &str,
        check: impl FnOnce(&Entity) -> Result<(), ScreenError>,
    ) -> Result<BusyGuard, ScreenError> {
        self.with_mounted(|state| -> Result<BusyGuard, ScreenError> {
            let entity = state.view.find(entity_id).ok_or_else(|| {
                ScreenError::ValidationFailure(format!(
                    "Entity '{}' is not in this collection",
                    entity_id
                ))
            })?;

            if let Err(e) = check(entity) {
                warn!(entity_id = %entity_id, error = %e, "Mutation rejected locally");
                state.last_error = Some(e.clone());
                return Err(e);
            }

            if !state.busy.insert(entity_id.to_string()) {
                warn!(entity_id = %entity_id, "Mutation rejected: entity is busy");
                return Err(ScreenError::Busy(entity_id.to_string()));
            }

            Ok(BusyGuard {
                state: Arc::clone(&self.state),
                entity_id: entity_id.to_string(),
            })
        })?
    }

    /// Convert a repository result into the screen outcome and refresh where
    /// required
    async fn settle(
        &self,
        entity_id: &str,
        result: Result<(), RepositoryError>,
    ) -> Result<(), ScreenError> {
        // A response arriving after unmount must not touch anything
        self.with_mounted(|_| ())?;

        match result {
            Ok(()) => {
                info!(entity_id = %entity_id, "Mutation applied");
                self.refresh().await
            }
            Err(source @ (RepositoryError::Conflict(_) | RepositoryError::NotFound)) => {
                warn!(entity_id = %entity_id, error = %source, "Mutation conflicted, refreshing");
                if let Err(e) = self.refresh().await {
                    warn!(entity_id = %entity_id, error = %e, "Refresh after conflict failed");
                }
                let reason = match source {
                    RepositoryError::Conflict(reason) => reason,
                    other => other.to_string(),
                };
                let err = ScreenError::MutationConflict {
                    entity_id: entity_id.to_string(),
                    reason,
                };
                self.with_mounted(|state| state.last_error = Some(err.clone()))?;
                Err(err)
            }
            Err(source) => {
                error!(entity_id = %entity_id, error = %source, "Mutation failed");
                let err = ScreenError::MutationFailure {
                    entity_id: entity_id.to_string(),
                    source,
                };
                self.with_mounted(|state| state.last_error = Some(err.clone()))?;
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Presentation
    // ------------------------------------------------------------------------

    /// Derive everything the screen renders
    pub fn snapshot(&self) -> Result<ScreenSnapshot, ScreenError> {
        self.with_mounted(|state| {
            let model = state.view.derive();
            debug!(
                scope = %self.scope,
                total = model.total_count,
                page = model.page_index,
                "Derived screen snapshot"
            );

            let rows = model
                .visible_rows
                .iter()
                .map(|entity| RowView {
                    entity: (*entity).clone(),
                    selected: state.view.is_selected(&entity.id),
                    busy: state.busy.contains(&entity.id),
                    actions: row_actions(entity),
                })
                .collect();

            ScreenSnapshot {
                rows,
                total_count: model.total_count,
                raw_count: model.raw_count,
                page_index: model.page_index,
                page_count: model.page_count,
                empty_state: model.empty_state,
                selected_count: state.view.state().selected_ids().len(),
                page_fully_selected: state.view.is_page_fully_selected(),
                error: state.last_error.as_ref().map(ScreenError::user_message),
                error_kind: state.last_error.as_ref().map(ScreenError::kind),
            }
        })
    }

    pub fn visible_rows(&self) -> Result<Vec<Entity>, ScreenError> {
        self.with_mounted(|state| state.view.visible_rows().into_iter().cloned().collect())
    }

    pub fn total_count(&self) -> Result<usize, ScreenError> {
        self.with_mounted(|state| state.view.total_count())
    }

    pub fn page_count(&self) -> Result<usize, ScreenError> {
        self.with_mounted(|state| state.view.page_count())
    }

    pub fn page_index(&self) -> Result<usize, ScreenError> {
        self.with_mounted(|state| state.view.derive().page_index)
    }

    pub fn empty_state(&self) -> Result<EmptyState, ScreenError> {
        self.with_mounted(|state| state.view.empty_state())
    }

    /// Transitions offered for one row
    pub fn row_actions(&self, entity_id: &str) -> Result<Vec<RowAction>, ScreenError> {
        self.with_mounted(|state| {
            state
                .view
                .find(entity_id)
                .map(row_actions)
                .unwrap_or_default()
        })
    }

    pub fn is_busy(&self, entity_id: &str) -> Result<bool, ScreenError> {
        self.with_mounted(|state| state.busy.contains(entity_id))
    }

    /// Distinct values of a column, for its filter menu
    pub fn facet_values(&self, field: &str) -> Result<Vec<FieldValue>, ScreenError> {
        self.with_mounted(|state| state.view.facet_values(field))
    }

    pub fn selected_ids(&self) -> Result<Vec<String>, ScreenError> {
        self.with_mounted(|state| {
            state
                .view
                .state()
                .selected_ids()
                .iter()
                .cloned()
                .collect()
        })
    }

    pub fn set_sort(&self, rules: Vec<SortRule>) -> Result<(), ScreenError> {
        self.with_mounted(|state| state.view.set_sort(rules))
    }

    /// Header click: ascending, then descending, then unsorted
    pub fn toggle_sort(&self, field: &str) -> Result<(), ScreenError> {
        self.with_mounted(|state| state.view.toggle_sort(field))
    }

    pub fn set_column_filter(
        &self,
        field: &str,
        accepted: Vec<FieldValue>,
    ) -> Result<(), ScreenError> {
        self.with_mounted(|state| state.view.set_column_filter(field, accepted))
    }

    pub fn clear_column_filter(&self, field: &str) -> Result<(), ScreenError> {
        self.with_mounted(|state| state.view.clear_column_filter(field))
    }

    pub fn set_global_query(&self, query: &str) -> Result<(), ScreenError> {
        self.with_mounted(|state| state.view.set_global_query(query))
    }

    pub fn clear_filters(&self) -> Result<(), ScreenError> {
        self.with_mounted(|state| state.view.clear_filters())
    }

    pub fn set_page(&self, page_index: usize) -> Result<(), ScreenError> {
        self.with_mounted(|state| state.view.set_page(page_index))
    }

    pub fn set_page_size(&self, page_size: usize) -> Result<(), ScreenError> {
        self.with_mounted(|state| state.view.set_page_size(page_size))
    }

    pub fn toggle_selection(&self, entity_id: &str) -> Result<bool, ScreenError> {
        self.with_mounted(|state| state.view.toggle_selection(entity_id))
    }

    pub fn select_all_on_page(&self) -> Result<(), ScreenError> {
        self.with_mounted(|state| state.view.select_all_on_page())
    }

    pub fn clear_selection(&self) -> Result<(), ScreenError> {
        self.with_mounted(|state| state.view.clear_selection())
    }
}
