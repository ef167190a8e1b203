//! Domain layer for the Catalog domain

pub mod entities;
pub mod state;
