//! Atrium list screens
//!
//! Binds the collection view engine to an entity repository: loading,
//! per-row transition menus, mutation dispatch with busy tracking, and
//! refresh after every change.

pub mod error;
pub mod screen;

pub use error::{ScreenError, ScreenErrorKind};
pub use screen::{CollectionScreen, RowAction, RowView, ScreenSnapshot};
