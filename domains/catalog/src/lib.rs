//! Catalog domain: listed entities, their lifecycles, and the repositories
//! that load and mutate them

pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::*;
pub use domain::state::{
    CertificationState, Lifecycle, LifecycleResolver, ProductState, ResourceState, ServiceState,
    TransitionAction, TransitionDescriptor, TransitionTable,
};
// Re-export repository types
pub use repository::{
    EntityRepository, MockEntityRepository, RecordedCall, RemoteEntityRepository,
    RepositoryFactory,
};
