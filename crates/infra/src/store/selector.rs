//! Predicate queries over stored JSON documents.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

/// Field-equality predicate over the top-level fields of a stored document.
///
/// Mirrors a document-database selector: `{"docType": "Account", "bank": "bankA"}`
/// matches every document whose `docType` and `bank` fields equal those values.
/// An empty selector matches every JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selector {
    fields: BTreeMap<String, JsonValue>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn matches(&self, document: &JsonValue) -> bool {
        let Some(map) = document.as_object() else {
            return false;
        };
        self.fields
            .iter()
            .all(|(name, expected)| map.get(name) == Some(expected))
    }
}
