// ── Policy records ──
//
// A policy is kept as the raw JSON object the appliance returned. Only the
// handful of fields the workflow inspects get typed accessors; everything
// else rides along untouched, in its original key order.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const POLICY_ID_FIELD: &str = "policyid";
pub const NAME_FIELD: &str = "name";
pub const SRCINTF_FIELD: &str = "srcintf";
pub const DSTINTF_FIELD: &str = "dstintf";

/// Shown when a record has no `name`.
pub const UNNAMED: &str = "No Name";

// ── PolicyId ────────────────────────────────────────────────────────

/// Numeric policy identifier, unique within one ADOM + package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyId(u64);

impl PolicyId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── PolicyRecord ────────────────────────────────────────────────────

/// One firewall policy as a field map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyRecord(Map<String, Value>);

impl PolicyRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// The integer `policyid`, if present.
    pub fn policy_id(&self) -> Option<PolicyId> {
        self.0
            .get(POLICY_ID_FIELD)
            .and_then(Value::as_u64)
            .map(PolicyId)
    }

    /// The policy name, or [`UNNAMED`].
    pub fn name(&self) -> &str {
        self.0
            .get(NAME_FIELD)
            .and_then(Value::as_str)
            .unwrap_or(UNNAMED)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set a field, keeping its position if it already exists.
    pub fn set(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// A field read as an interface list (see [`normalize_interfaces`]).
    pub fn interfaces(&self, field: &str) -> Vec<String> {
        normalize_interfaces(self.0.get(field))
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for PolicyRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

// ── Interface normalization ─────────────────────────────────────────

/// Read any interface-field shape as an ordered list of names.
///
/// - missing, `null`, and other blank scalars (`""`, `false`, `0`, `{}`) → `[]`
/// - a string → `[s]`
/// - an array → one name per element: strings as-is, `{"name": ..}` objects by
///   their name, anything else by its JSON text
/// - any other scalar → `[scalar]`
pub fn normalize_interfaces(value: Option<&Value>) -> Vec<String> {
    match value {
        None => Vec::new(),
        Some(v) if is_blank(v) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(interface_name).collect(),
        Some(Value::String(s)) => vec![s.clone()],
        Some(other) => vec![other.to_string()],
    }
}

/// Name of a single interface-list element.
pub fn interface_name(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        Value::Object(obj) => match obj.get(NAME_FIELD) {
            Some(Value::String(name)) => name.clone(),
            _ => item.to_string(),
        },
        other => other.to_string(),
    }
}

/// Whether a list element refers to the interface `name`.
pub fn names_interface(item: &Value, name: &str) -> bool {
    match item {
        Value::String(s) => s == name,
        Value::Object(obj) => obj.get(NAME_FIELD).and_then(Value::as_str) == Some(name),
        _ => false,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() < f64::EPSILON),
        Value::Object(obj) => obj.is_empty(),
        Value::Bool(true) | Value::Array(_) => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(value: Value) -> PolicyRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn normalizes_every_interface_shape() {
        assert_eq!(normalize_interfaces(None), Vec::<String>::new());
        assert_eq!(normalize_interfaces(Some(&json!(null))), Vec::<String>::new());
        assert_eq!(normalize_interfaces(Some(&json!(""))), Vec::<String>::new());
        assert_eq!(normalize_interfaces(Some(&json!("port1"))), vec!["port1"]);
        assert_eq!(
            normalize_interfaces(Some(&json!(["port1", "port2"]))),
            vec!["port1", "port2"]
        );
        assert_eq!(
            normalize_interfaces(Some(&json!([{"name": "wan1"}, "lan", 7]))),
            vec!["wan1", "lan", "7"]
        );
        assert_eq!(normalize_interfaces(Some(&json!(42))), vec!["42"]);
    }

    #[test]
    fn missing_and_empty_list_normalize_equal() {
        let missing = record(json!({"policyid": 1}));
        let empty = record(json!({"policyid": 1, "srcintf": []}));
        assert_eq!(
            missing.interfaces(SRCINTF_FIELD),
            empty.interfaces(SRCINTF_FIELD)
        );
    }

    #[test]
    fn accessors() {
        let rec = record(json!({"policyid": 12, "name": "allow-dns", "action": 1}));
        assert_eq!(rec.policy_id(), Some(PolicyId::new(12)));
        assert_eq!(rec.name(), "allow-dns");

        let unnamed = record(json!({"policyid": "12"}));
        assert_eq!(unnamed.policy_id(), None);
        assert_eq!(unnamed.name(), UNNAMED);
    }

    #[test]
    fn set_keeps_key_position() {
        let mut rec = record(json!({"policyid": 1, "srcintf": ["a"], "action": 1}));
        rec.set(SRCINTF_FIELD, json!(["b"]));
        let keys: Vec<&str> = rec.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["policyid", "srcintf", "action"]);
    }

    #[test]
    fn names_interface_matches_strings_and_objects() {
        assert!(names_interface(&json!("MPLS"), "MPLS"));
        assert!(names_interface(&json!({"name": "MPLS"}), "MPLS"));
        assert!(!names_interface(&json!("mpls"), "MPLS"));
        assert!(!names_interface(&json!(null), "MPLS"));
    }
}
