//! Domain entities for the Catalog domain
//!
//! Every listed business record is an [`Entity`]: a tagged variant whose
//! `entity_type` decides its status vocabulary, its required fields and the
//! fields the free-text search runs against. Entities are validated when they
//! are constructed or decoded at the repository boundary, never while
//! rendering.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atrium_common::{Error, FieldValue, Result, Row, StateError};

use crate::domain::state::{LifecycleResolver, TransitionTable};

/// Maximum length of an entity id
const MAX_ID_LENGTH: usize = 128;

/// Kind of listed record
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Resource,
    Service,
    Product,
    Certification,
}

impl EntityType {
    pub const ALL: &'static [EntityType] = &[
        EntityType::Resource,
        EntityType::Service,
        EntityType::Product,
        EntityType::Certification,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Resource => "RESOURCE",
            EntityType::Service => "SERVICE",
            EntityType::Product => "PRODUCT",
            EntityType::Certification => "CERTIFICATION",
        }
    }

    /// Collection segment used by the REST backend
    pub fn collection_path(&self) -> &'static str {
        match self {
            EntityType::Resource => "resources",
            EntityType::Service => "services",
            EntityType::Product => "products",
            EntityType::Certification => "certifications",
        }
    }

    /// Fields every entity of this type must carry
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            EntityType::Resource => &["name", "category"],
            EntityType::Service => &["name", "startsAt"],
            EntityType::Product => &["name", "price"],
            EntityType::Certification => &["name", "issuer"],
        }
    }

    /// Fields the global search runs against
    pub fn searchable_fields(&self) -> &'static [&'static str] {
        match self {
            EntityType::Resource => &["name", "category", "reference"],
            EntityType::Service => &["name", "location", "description"],
            EntityType::Product => &["name", "sku", "category"],
            EntityType::Certification => &["name", "issuer", "holder"],
        }
    }

    /// Status vocabulary of this type
    pub fn statuses(&self) -> Vec<&'static str> {
        TransitionTable::global().statuses(*self)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        EntityType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::Validation(format!("Unknown entity type '{}'", s)))
    }
}

/// The collection a screen lists: one entity type within one tenant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeId {
    pub tenant_id: String,
    pub entity_type: EntityType,
}

impl ScopeId {
    pub fn new(tenant_id: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            entity_type,
        }
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tenant_id, self.entity_type.collection_path())
    }
}

/// A listed business record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub status: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
    pub updated_at: DateTime<Utc>,
}

impl Entity {
    /// Create a new entity with validation
    pub fn new(
        id: impl Into<String>,
        entity_type: EntityType,
        status: impl Into<String>,
        fields: BTreeMap<String, FieldValue>,
    ) -> Result<Self> {
        let entity = Entity {
            id: id.into(),
            entity_type,
            status: status.into(),
            fields,
            updated_at: Utc::now(),
        };
        entity.validate()?;
        Ok(entity)
    }

    /// Validate invariants: non-empty id, known status, required fields
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation("Entity id must not be empty".to_string()));
        }

        if self.id.len() > MAX_ID_LENGTH {
            return Err(Error::Validation(format!(
                "Entity id must be ≤{} characters",
                MAX_ID_LENGTH
            )));
        }

        if !TransitionTable::global().has_status(self.entity_type, &self.status) {
            return Err(Error::Validation(format!(
                "'{}' is not a valid {} status",
                self.status, self.entity_type
            )));
        }

        if let Some(missing) = self
            .entity_type
            .required_fields()
            .iter()
            .find(|f| !self.fields.contains_key(**f))
        {
            return Err(Error::Validation(format!(
                "{} '{}' is missing required field '{}'",
                self.entity_type, self.id, missing
            )));
        }

        Ok(())
    }

    /// Legal next statuses from the current one
    pub fn available_transitions(&self) -> &'static [&'static str] {
        LifecycleResolver::available_transitions(self.entity_type, &self.status)
    }

    #[mutants::skip] // Delegates to LifecycleResolver::is_legal_transition, tested there
    pub fn can_transition_to(&self, requested: &str) -> bool {
        LifecycleResolver::is_legal_transition(self.entity_type, &self.status, requested)
    }

    /// Move to `requested` if the lifecycle allows it
    pub fn transition_to(&mut self, requested: &str) -> Result<()> {
        LifecycleResolver::validate_transition(self.entity_type, &self.status, requested).map_err(
            |e| match e {
                StateError::InvalidTransition { from, to, .. } => Error::Validation(format!(
                    "Invalid {} transition: cannot move from '{}' to '{}'",
                    self.entity_type, from, to
                )),
                StateError::TerminalState(state) => Error::Validation(format!(
                    "{} is in terminal state '{}' and cannot transition",
                    self.entity_type, state
                )),
                StateError::UnknownStatus { status, .. } => Error::Validation(format!(
                    "'{}' is not a valid {} status",
                    status, self.entity_type
                )),
            },
        )?;

        self.status = requested.to_string();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Apply a field patch, keeping required fields present
    pub fn apply_patch(&mut self, patch: &EntityPatch) -> Result<()> {
        let mut fields = self.fields.clone();
        for (name, change) in &patch.fields {
            match change {
                Some(value) => {
                    fields.insert(name.clone(), value.clone());
                }
                None => {
                    fields.remove(name);
                }
            }
        }

        let candidate = Entity {
            fields,
            updated_at: Utc::now(),
            ..self.clone()
        };
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }
}

impl Row for Entity {
    fn row_id(&self) -> &str {
        &self.id
    }

    /// Record fields plus the `id`, `type`, `status` and `updatedAt` columns
    fn value(&self, field: &str) -> Option<Cow<'_, FieldValue>> {
        match field {
            "id" => Some(Cow::Owned(FieldValue::text(self.id.as_str()))),
            "type" => Some(Cow::Owned(FieldValue::text(self.entity_type.as_str()))),
            "status" => Some(Cow::Owned(FieldValue::text(self.status.as_str()))),
            "updatedAt" => Some(Cow::Owned(FieldValue::Timestamp(self.updated_at))),
            _ => self.fields.get(field).map(Cow::Borrowed),
        }
    }

    fn search_text(&self) -> String {
        self.entity_type
            .searchable_fields()
            .iter()
            .filter_map(|f| self.fields.get(*f))
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Field changes sent to the repository; `None` removes a field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityPatch {
    pub fields: BTreeMap<String, Option<FieldValue>>,
}

impl EntityPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(field.into(), Some(value.into()));
        self
    }

    pub fn unset(mut self, field: impl Into<String>) -> Self {
        self.fields.insert(field.into(), None);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
