//! Minimal [`Row`] implementation for engine tests

use std::borrow::Cow;
use std::collections::BTreeMap;

use atrium_common::{FieldValue, Row};

#[derive(Debug, Clone, PartialEq)]
pub struct TestRow {
    id: String,
    fields: BTreeMap<String, FieldValue>,
}

impl TestRow {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }
}

impl Row for TestRow {
    fn row_id(&self) -> &str {
        &self.id
    }

    fn value(&self, field: &str) -> Option<Cow<'_, FieldValue>> {
        self.fields.get(field).map(Cow::Borrowed)
    }

    fn search_text(&self) -> String {
        self.fields
            .values()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}
