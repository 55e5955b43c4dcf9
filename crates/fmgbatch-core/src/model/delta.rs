// ── Per-record change sets ──

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use super::record::PolicyId;

/// Before/after value of one watched field, both normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub original: Vec<String>,
    pub modified: Vec<String>,
}

impl FieldChange {
    pub fn new(original: Vec<String>, modified: Vec<String>) -> Self {
        Self { original, modified }
    }
}

/// The changed fields of one policy.
///
/// `field_deltas` keeps the order in which fields were compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordDelta {
    pub policy_id: PolicyId,
    pub name: String,
    pub field_deltas: IndexMap<String, FieldChange>,
}

impl RecordDelta {
    pub fn new(policy_id: PolicyId, name: impl Into<String>) -> Self {
        Self {
            policy_id,
            name: name.into(),
            field_deltas: IndexMap::new(),
        }
    }

    pub fn insert(&mut self, field: impl Into<String>, change: FieldChange) {
        self.field_deltas.insert(field.into(), change);
    }

    pub fn is_empty(&self) -> bool {
        self.field_deltas.is_empty()
    }

    /// Update body carrying only the new value of each changed field.
    pub fn update_payload(&self) -> Map<String, Value> {
        self.field_deltas
            .iter()
            .map(|(field, change)| (field.clone(), Value::from(change.modified.clone())))
            .collect()
    }
}
