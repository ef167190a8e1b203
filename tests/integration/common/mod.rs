//! Common fixtures for integration tests
//!
//! Screens are mounted against the in-memory mock repository, seeded with
//! small, readable collections.

use std::collections::BTreeMap;
use std::sync::Arc;

use atrium_app::CollectionScreen;
use atrium_catalog::{Entity, EntityType, MockEntityRepository, ScopeId};
use atrium_common::FieldValue;
use atrium_view::ViewConfig;

pub const TENANT: &str = "acme";

/// Build an entity from `(field, value)` pairs, panicking on invalid input
pub fn entity(id: &str, entity_type: EntityType, status: &str, pairs: &[(&str, FieldValue)]) -> Entity {
    let fields: BTreeMap<String, FieldValue> = pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();
    Entity::new(id, entity_type, status, fields).expect("fixture entity must be valid")
}

pub fn resource(id: &str, name: &str, category: &str, status: &str) -> Entity {
    entity(
        id,
        EntityType::Resource,
        status,
        &[
            ("name", FieldValue::text(name)),
            ("category", FieldValue::text(category)),
        ],
    )
}

/// Twelve resources, exactly three of them in the `room` category
pub fn twelve_resources() -> Vec<Entity> {
    let rows = [
        ("Harbor room", "room", "FREE"),
        ("Delivery van", "vehicle", "AFFECTED"),
        ("Projector", "equipment", "IN_USE"),
        ("Garden room", "room", "FREE"),
        ("Forklift", "vehicle", "FREE"),
        ("Sound system", "equipment", "AFFECTED"),
        ("Attic room", "room", "IN_USE"),
        ("Cargo bike", "vehicle", "FREE"),
        ("Camera kit", "equipment", "FREE"),
        ("Minibus", "vehicle", "IN_USE"),
        ("Laptop cart", "equipment", "AFFECTED"),
        ("Tool trailer", "vehicle", "FREE"),
    ];
    rows.iter()
        .enumerate()
        .map(|(i, (name, category, status))| {
            resource(&format!("res-{:02}", i + 1), name, category, status)
        })
        .collect()
}

/// A mounted screen plus a handle on its backend
#[allow(dead_code)]
pub struct TestScreen {
    pub repo: MockEntityRepository,
    pub screen: CollectionScreen,
}

#[allow(dead_code)]
impl TestScreen {
    /// Seed `entities` and mount a screen over them without loading
    pub fn mount(entity_type: EntityType, entities: Vec<Entity>) -> Self {
        let repo = MockEntityRepository::new();
        repo.seed(TENANT, entities);
        let screen = CollectionScreen::mount(
            ScopeId::new(TENANT, entity_type),
            Arc::new(repo.clone()),
            &ViewConfig::default(),
        );
        Self { repo, screen }
    }

    /// Seed, mount and perform the initial load
    pub async fn loaded(entity_type: EntityType, entities: Vec<Entity>) -> Self {
        let test = Self::mount(entity_type, entities);
        test.screen.load().await.expect("initial load must succeed");
        test
    }

    /// Ids of the visible page, in display order
    pub fn visible_ids(&self) -> Vec<String> {
        self.screen
            .visible_rows()
            .expect("screen must be mounted")
            .into_iter()
            .map(|e| e.id)
            .collect()
    }

    /// Current status of a row as the screen shows it
    pub fn status_of(&self, id: &str) -> Option<String> {
        self.screen
            .visible_rows()
            .expect("screen must be mounted")
            .into_iter()
            .find(|e| e.id == id)
            .map(|e| e.status)
    }
}
