//! Errors surfaced by list screens to the presentation layer

use atrium_common::RepositoryError;
use serde::Serialize;

/// Stable category of a [`ScreenError`], for picking the UI message style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScreenErrorKind {
    FetchFailure,
    ValidationFailure,
    MutationConflict,
    MutationFailure,
    Busy,
    Unmounted,
}

/// Screen-level error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScreenError {
    #[error("Failed to load collection: {0}")]
    FetchFailure(#[source] RepositoryError),

    #[error("{0}")]
    ValidationFailure(String),

    #[error("Entity '{entity_id}' was changed concurrently: {reason}")]
    MutationConflict { entity_id: String, reason: String },

    #[error("Mutation of entity '{entity_id}' failed: {source}")]
    MutationFailure {
        entity_id: String,
        source: RepositoryError,
    },

    #[error("Entity '{0}' already has a change in flight")]
    Busy(String),

    #[error("Screen has been unmounted")]
    Unmounted,
}

impl ScreenError {
    pub fn kind(&self) -> ScreenErrorKind {
        match self {
            ScreenError::FetchFailure(_) => ScreenErrorKind::FetchFailure,
            ScreenError::ValidationFailure(_) => ScreenErrorKind::ValidationFailure,
            ScreenError::MutationConflict { .. } => ScreenErrorKind::MutationConflict,
            ScreenError::MutationFailure { .. } => ScreenErrorKind::MutationFailure,
            ScreenError::Busy(_) => ScreenErrorKind::Busy,
            ScreenError::Unmounted => ScreenErrorKind::Unmounted,
        }
    }

    /// Message shown to the user
    pub fn user_message(&self) -> String {
        match self {
            ScreenError::FetchFailure(_) => {
                "The list could not be loaded. Retry to try again.".to_string()
            }
            ScreenError::ValidationFailure(message) => message.clone(),
            ScreenError::MutationConflict { .. } => {
                "This item was changed by someone else. The list has been refreshed.".to_string()
            }
            ScreenError::MutationFailure { .. } => "The change could not be saved.".to_string(),
            ScreenError::Busy(_) => "This item is already being updated.".to_string(),
            ScreenError::Unmounted => "This screen is no longer open.".to_string(),
        }
    }

    /// Whether offering a retry action makes sense
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScreenError::FetchFailure(_))
    }
}
