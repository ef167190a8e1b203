//! Shared records, configuration, and error handling for Atrium
//!
//! This crate provides common functionality used across the Atrium workspace:
//! - Configuration management following 12-factor principles
//! - Error types and handling
//! - The row/field abstraction listed by collection views
//! - Tracing setup

pub mod config;
pub mod error;
pub mod record;
pub mod repository;
pub mod state;
pub mod telemetry;

pub use config::Config;
pub use error::{Error, Result};
pub use record::{FieldValue, Row};
pub use repository::RepositoryError;
pub use state::StateError;
