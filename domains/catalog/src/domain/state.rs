//! Lifecycles of catalog entities
//!
//! Each entity type has a status enum that lists its legal next statuses.
//! The enums are folded once into a process-wide [`TransitionTable`] keyed by
//! entity type, which the [`LifecycleResolver`] consults with plain status
//! strings, as they arrive from the repository. The table is the only source
//! of legal transitions; nothing else keeps a copy.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use serde::Serialize;

pub use atrium_common::StateError;

use crate::domain::entities::EntityType;

/// A status vocabulary with its legal transitions
pub trait Lifecycle: Copy + PartialEq + fmt::Display + 'static {
    /// Entity type the vocabulary belongs to
    const ENTITY_TYPE: EntityType;

    /// Every status, in declaration order
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    /// Legal next statuses, in presentation order
    fn valid_transitions(&self) -> &'static [Self];

    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }

    fn parse(raw: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == raw)
    }
}

macro_rules! display_as_str {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// ============================================================================
// Resource Lifecycle
// ============================================================================

/// Resource availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceState {
    Free,
    Affected,
    InUse,
}

impl Lifecycle for ResourceState {
    const ENTITY_TYPE: EntityType = EntityType::Resource;
    const ALL: &'static [Self] = &[Self::Free, Self::Affected, Self::InUse];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "FREE",
            Self::Affected => "AFFECTED",
            Self::InUse => "IN_USE",
        }
    }

    fn valid_transitions(&self) -> &'static [Self] {
        match self {
            Self::Free => &[Self::Affected],
            Self::Affected => &[Self::Free, Self::InUse],
            Self::InUse => &[Self::Free],
        }
    }
}

display_as_str!(ResourceState);

// ============================================================================
// Service Lifecycle
// ============================================================================

/// Service scheduling state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceState {
    Planned,
    Published,
    Ongoing,
    Finished,
    Cancelled,
}

impl Lifecycle for ServiceState {
    const ENTITY_TYPE: EntityType = EntityType::Service;
    const ALL: &'static [Self] = &[
        Self::Planned,
        Self::Published,
        Self::Ongoing,
        Self::Finished,
        Self::Cancelled,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "PLANNED",
            Self::Published => "PUBLISHED",
            Self::Ongoing => "ONGOING",
            Self::Finished => "FINISHED",
            Self::Cancelled => "CANCELLED",
        }
    }

    fn valid_transitions(&self) -> &'static [Self] {
        match self {
            Self::Planned => &[Self::Published, Self::Cancelled],
            Self::Published => &[Self::Ongoing, Self::Cancelled],
            Self::Ongoing => &[Self::Finished, Self::Cancelled],
            Self::Finished => &[],
            Self::Cancelled => &[],
        }
    }
}

display_as_str!(ServiceState);

// ============================================================================
// Product Lifecycle
// ============================================================================

/// Product catalog state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductState {
    Draft,
    Active,
    Suspended,
    Archived,
}

impl Lifecycle for ProductState {
    const ENTITY_TYPE: EntityType = EntityType::Product;
    const ALL: &'static [Self] = &[Self::Draft, Self::Active, Self::Suspended, Self::Archived];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Active => "ACTIVE",
            Self::Suspended => "SUSPENDED",
            Self::Archived => "ARCHIVED",
        }
    }

    fn valid_transitions(&self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::Active, Self::Archived],
            Self::Active => &[Self::Suspended, Self::Archived],
            Self::Suspended => &[Self::Active, Self::Archived],
            Self::Archived => &[],
        }
    }
}

display_as_str!(ProductState);

// ============================================================================
// Certification Lifecycle
// ============================================================================

/// Certification review state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CertificationState {
    Pending,
    Valid,
    Expired,
    Revoked,
    Rejected,
}

impl Lifecycle for CertificationState {
    const ENTITY_TYPE: EntityType = EntityType::Certification;
    const ALL: &'static [Self] = &[
        Self::Pending,
        Self::Valid,
        Self::Expired,
        Self::Revoked,
        Self::Rejected,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Valid => "VALID",
            Self::Expired => "EXPIRED",
            Self::Revoked => "REVOKED",
            Self::Rejected => "REJECTED",
        }
    }

    fn valid_transitions(&self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Valid, Self::Rejected],
            Self::Valid => &[Self::Expired, Self::Revoked],
            Self::Expired => &[Self::Pending],
            Self::Revoked => &[],
            Self::Rejected => &[Self::Pending],
        }
    }
}

display_as_str!(CertificationState);

// ============================================================================
// Transition Table
// ============================================================================

/// Entity type → current status → ordered legal next statuses
#[derive(Debug)]
pub struct TransitionTable {
    entries: HashMap<EntityType, Vec<(&'static str, Vec<&'static str>)>>,
}

static TRANSITIONS: LazyLock<TransitionTable> = LazyLock::new(TransitionTable::build);

impl TransitionTable {
    /// The process-wide table
    pub fn global() -> &'static TransitionTable {
        &TRANSITIONS
    }

    fn build() -> Self {
        let mut table = Self {
            entries: HashMap::new(),
        };
        table.register::<ResourceState>();
        table.register::<ServiceState>();
        table.register::<ProductState>();
        table.register::<CertificationState>();
        table
    }

    fn register<L: Lifecycle>(&mut self) {
        let rows = L::ALL
            .iter()
            .map(|state| {
                let next = state.valid_transitions().iter().map(L::as_str).collect();
                (state.as_str(), next)
            })
            .collect();
        self.entries.insert(L::ENTITY_TYPE, rows);
    }

    /// Legal next statuses; empty for unknown types and statuses
    pub fn next_statuses(&self, entity_type: EntityType, status: &str) -> &[&'static str] {
        self.entries
            .get(&entity_type)
            .and_then(|rows| rows.iter().find(|(s, _)| *s == status))
            .map(|(_, next)| next.as_slice())
            .unwrap_or(&[])
    }

    /// Status vocabulary of an entity type, in declaration order
    pub fn statuses(&self, entity_type: EntityType) -> Vec<&'static str> {
        self.entries
            .get(&entity_type)
            .map(|rows| rows.iter().map(|(s, _)| *s).collect())
            .unwrap_or_default()
    }

    pub fn has_status(&self, entity_type: EntityType, status: &str) -> bool {
        self.entries
            .get(&entity_type)
            .is_some_and(|rows| rows.iter().any(|(s, _)| *s == status))
    }
}

// ============================================================================
// Transition Descriptors
// ============================================================================

/// The kind of action a transition represents, for row-action menus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionAction {
    Assign,
    Release,
    Activate,
    Publish,
    Start,
    Finalize,
    Validate,
    Suspend,
    Archive,
    Expire,
    Resubmit,
    Reject,
    Revoke,
    Cancel,
    Change,
}

impl TransitionAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Assign => "Assign",
            Self::Release => "Release",
            Self::Activate => "Activate",
            Self::Publish => "Publish",
            Self::Start => "Start",
            Self::Finalize => "Finalize",
            Self::Validate => "Validate",
            Self::Suspend => "Suspend",
            Self::Archive => "Archive",
            Self::Expire => "Mark expired",
            Self::Resubmit => "Resubmit",
            Self::Reject => "Reject",
            Self::Revoke => "Revoke",
            Self::Cancel => "Cancel",
            Self::Change => "Change status",
        }
    }

    pub fn icon_class(&self) -> &'static str {
        match self {
            Self::Assign => "icon-link",
            Self::Release => "icon-unlock",
            Self::Activate => "icon-play",
            Self::Publish => "icon-upload",
            Self::Start => "icon-play-circle",
            Self::Finalize => "icon-check",
            Self::Validate => "icon-check-circle",
            Self::Suspend => "icon-pause",
            Self::Archive => "icon-archive",
            Self::Expire => "icon-clock",
            Self::Resubmit => "icon-refresh",
            Self::Reject => "icon-times-circle",
            Self::Revoke => "icon-ban",
            Self::Cancel => "icon-times",
            Self::Change => "icon-pencil",
        }
    }
}

/// Presentation metadata of a transition to a target status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionDescriptor {
    pub action: TransitionAction,
    pub action_verb_label: &'static str,
    pub icon_class: &'static str,
}

// ============================================================================
// Lifecycle Resolver
// ============================================================================

/// Stateless lookup and validation over the global [`TransitionTable`]
pub struct LifecycleResolver;

impl LifecycleResolver {
    /// Legal next statuses of `(entity_type, current)`, in presentation order.
    ///
    /// Fails closed: an unknown status yields an empty set.
    pub fn available_transitions(entity_type: EntityType, current: &str) -> &'static [&'static str] {
        TransitionTable::global().next_statuses(entity_type, current)
    }

    pub fn is_legal_transition(entity_type: EntityType, current: &str, requested: &str) -> bool {
        Self::available_transitions(entity_type, current).contains(&requested)
    }

    /// Check a requested transition, explaining why it is refused
    pub fn validate_transition(
        entity_type: EntityType,
        current: &str,
        requested: &str,
    ) -> Result<(), StateError> {
        let table = TransitionTable::global();

        if !table.has_status(entity_type, current) {
            return Err(StateError::UnknownStatus {
                entity_type: entity_type.to_string(),
                status: current.to_string(),
            });
        }

        let next = table.next_statuses(entity_type, current);
        if next.is_empty() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        if !next.contains(&requested) {
            return Err(StateError::InvalidTransition {
                entity_type: entity_type.to_string(),
                from: current.to_string(),
                to: requested.to_string(),
            });
        }

        Ok(())
    }

    /// Label and icon for a transition to `requested`; unrecognized statuses
    /// get the generic "change" descriptor.
    pub fn describe_transition(requested: &str) -> TransitionDescriptor {
        let action = match requested {
            "AFFECTED" => TransitionAction::Assign,
            "FREE" => TransitionAction::Release,
            "IN_USE" | "ACTIVE" => TransitionAction::Activate,
            "PUBLISHED" => TransitionAction::Publish,
            "ONGOING" => TransitionAction::Start,
            "FINISHED" => TransitionAction::Finalize,
            "VALID" => TransitionAction::Validate,
            "SUSPENDED" => TransitionAction::Suspend,
            "ARCHIVED" => TransitionAction::Archive,
            "EXPIRED" => TransitionAction::Expire,
            "PENDING" => TransitionAction::Resubmit,
            "REJECTED" => TransitionAction::Reject,
            "REVOKED" => TransitionAction::Revoke,
            "CANCELLED" => TransitionAction::Cancel,
            _ => TransitionAction::Change,
        };

        TransitionDescriptor {
            action,
            action_verb_label: action.label(),
            icon_class: action.icon_class(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
