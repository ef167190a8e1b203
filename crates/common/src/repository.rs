//! Shared repository boundary types for Atrium
//!
//! Every backend (remote REST, in-memory mock) reports failures through
//! [`RepositoryError`] so callers never inspect transport details.

use thiserror::Error;

/// Repository-level error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Record was modified concurrently: {0}")]
    Conflict(String),

    #[error("Repository rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Repository transport error: {0}")]
    Transport(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}
