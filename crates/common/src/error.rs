//! Common error types and handling for Atrium

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Atrium core
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),
}
