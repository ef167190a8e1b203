//! Common state machine error types
//!
//! Shared across all domain crates that implement lifecycles.

use thiserror::Error;

/// Errors that can occur during status transitions
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    #[error("Invalid transition: a {entity_type} cannot move from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        from: String,
        to: String,
    },

    #[error("Unknown status: {status} is not a {entity_type} status")]
    UnknownStatus { entity_type: String, status: String },

    #[error("Terminal state: {0} is a terminal state and cannot transition")]
    TerminalState(String),
}
