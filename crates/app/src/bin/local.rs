// Atrium - Local Development Harness
//
// Usage: atrium-local [ENTITY_TYPE] [QUERY]

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{error, info};

use atrium_app::CollectionScreen;
use atrium_catalog::{
    Entity, EntityRepository, EntityType, MockEntityRepository, RepositoryFactory, ScopeId,
};
use atrium_common::config::Config;
use atrium_common::telemetry::init_tracing;
use atrium_common::FieldValue;
use atrium_view::ViewConfig;

const DEMO_TENANT: &str = "demo";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config);

    info!("Starting Atrium local harness");

    let mut args = std::env::args().skip(1);
    let entity_type: EntityType = match args.next() {
        Some(raw) => raw.parse()?,
        None => EntityType::Resource,
    };
    let query = args.next();

    let repository: Arc<dyn EntityRepository> = if config.repository_provider == "mock" {
        let mock = MockEntityRepository::new();
        mock.seed(DEMO_TENANT, demo_entities()?);
        Arc::new(mock)
    } else {
        Arc::from(RepositoryFactory::create(&config)?)
    };

    let scope = ScopeId::new(DEMO_TENANT, entity_type);
    let screen = CollectionScreen::mount(scope.clone(), repository, &ViewConfig::from(&config));

    if let Err(e) = screen.load().await {
        error!(scope = %scope, error = %e, "Initial load failed");
        return Err(e.into());
    }

    if let Some(query) = query {
        info!(query = %query, "Applying global search");
        screen.set_global_query(&query)?;
    }

    let snapshot = screen.snapshot()?;
    info!(
        scope = %scope,
        total = snapshot.total_count,
        page = snapshot.page_index + 1,
        pages = snapshot.page_count,
        empty_state = ?snapshot.empty_state,
        "First page derived"
    );
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    screen.unmount();
    Ok(())
}

fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, FieldValue> {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), FieldValue::text(*value)))
        .collect()
}

fn demo_entities() -> atrium_common::Result<Vec<Entity>> {
    let mut entities = Vec::new();

    let resources = [
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
    for (i, &(name, category, status)) in resources.iter().enumerate() {
        entities.push(Entity::new(
            format!("res-{:02}", i + 1),
            EntityType::Resource,
            status,
            fields(&[("name", name), ("category", category)]),
        )?);
    }

    let services = [
        ("Harbor tour", "2024-07-01", "PUBLISHED"),
        ("Wine tasting", "2024-07-12", "PLANNED"),
        ("Cooking class", "2024-06-20", "ONGOING"),
        ("City walk", "2024-05-02", "FINISHED"),
    ];
    for (i, &(name, starts_at, status)) in services.iter().enumerate() {
        entities.push(Entity::new(
            format!("svc-{:02}", i + 1),
            EntityType::Service,
            status,
            fields(&[("name", name), ("startsAt", starts_at)]),
        )?);
    }

    Ok(entities)
}
