// ── Change detection ──
//
// Compares two generations on a fixed set of watched fields. Values are
// normalized first (see `normalize_interfaces`), so cosmetic shape
// differences such as a missing field versus `[]` never count as changes.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::model::{
    DSTINTF_FIELD, FieldChange, Generation, PolicyId, PolicyRecord, RecordDelta, SRCINTF_FIELD,
};

/// The fields compared between generations, in report order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedFields(Vec<String>);

impl Default for WatchedFields {
    fn default() -> Self {
        Self(vec![SRCINTF_FIELD.to_owned(), DSTINTF_FIELD.to_owned()])
    }
}

impl WatchedFields {
    /// Trimmed, de-duplicated, blank names dropped. An empty list falls back
    /// to the default `srcintf, dstintf`.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for field in fields {
            let field = field.as_ref().trim();
            if !field.is_empty() && !out.iter().any(|f| f == field) {
                out.push(field.to_owned());
            }
        }
        if out.is_empty() {
            Self::default()
        } else {
            Self(out)
        }
    }

    /// Parse a comma-separated list such as `"srcintf,dstintf"`.
    pub fn parse(csv: &str) -> Self {
        Self::new(csv.split(','))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for WatchedFields {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for WatchedFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

/// Deltas for every record in `modified` that differs from `original` on a
/// watched field.
///
/// Ids missing from `original` are ignored. Output is ascending by id.
pub fn diff(
    original: &Generation,
    modified: &Generation,
    fields: &WatchedFields,
) -> Vec<RecordDelta> {
    let deltas: Vec<RecordDelta> = modified
        .iter()
        .filter_map(|(id, after)| {
            let Some(before) = original.get(id) else {
                debug!(policy_id = %id, "no original record, skipping");
                return None;
            };
            let delta = compare_records(id, before, after, fields);
            (!delta.is_empty()).then_some(delta)
        })
        .collect();

    debug!(
        compared = modified.len(),
        changed = deltas.len(),
        "diff complete"
    );
    deltas
}

/// Field-by-field comparison of one record pair. The name comes from
/// `modified`.
pub fn compare_records(
    id: PolicyId,
    original: &PolicyRecord,
    modified: &PolicyRecord,
    fields: &WatchedFields,
) -> RecordDelta {
    let mut delta = RecordDelta::new(id, modified.name());
    for field in fields.iter() {
        let before = original.interfaces(field);
        let after = modified.interfaces(field);
        if before != after {
            delta.insert(field, FieldChange::new(before, after));
        }
    }
    delta
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn generation(records: &[Value]) -> Generation {
        Generation::from_records(
            records
                .iter()
                .map(|v| serde_json::from_value::<PolicyRecord>(v.clone()).unwrap()),
        )
    }

    #[test]
    fn reports_changed_interface() {
        let original = generation(&[json!({"policyid": 1, "name": "a", "srcintf": ["A"]})]);
        let modified = generation(&[json!({"policyid": 1, "name": "a", "srcintf": ["B"]})]);

        let deltas = diff(&original, &modified, &WatchedFields::default());

        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].policy_id, PolicyId::new(1));
        assert_eq!(deltas[0].name, "a");
        assert_eq!(
            deltas[0].field_deltas.get("srcintf"),
            Some(&FieldChange::new(vec!["A".into()], vec!["B".into()]))
        );
        assert!(!deltas[0].field_deltas.contains_key("dstintf"));
    }

    #[test]
    fn missing_field_equals_empty_list() {
        let original = generation(&[json!({"policyid": 1, "srcintf": []})]);
        let modified = generation(&[json!({"policyid": 1, "dstintf": null})]);
        assert!(diff(&original, &modified, &WatchedFields::default()).is_empty());
    }

    #[test]
    fn unwatched_fields_are_ignored() {
        let original = generation(&[json!({"policyid": 1, "action": 0, "srcintf": ["A"]})]);
        let modified = generation(&[json!({"policyid": 1, "action": 1, "srcintf": ["A"]})]);
        assert!(diff(&original, &modified, &WatchedFields::default()).is_empty());

        let custom = WatchedFields::parse("action");
        let deltas = diff(&original, &modified, &custom);
        assert_eq!(deltas.len(), 1);
        assert_eq!(
            deltas[0].field_deltas.keys().collect::<Vec<_>>(),
            vec!["action"]
        );
    }

    #[test]
    fn ids_only_in_modified_are_skipped_and_order_is_by_id() {
        let original = generation(&[
            json!({"policyid": 9, "srcintf": ["A"]}),
            json!({"policyid": 3, "srcintf": ["A"]}),
        ]);
        let modified = generation(&[
            json!({"policyid": 9, "srcintf": ["B"]}),
            json!({"policyid": 5, "srcintf": ["B"]}),
            json!({"policyid": 3, "srcintf": ["C"]}),
        ]);

        let ids: Vec<u64> = diff(&original, &modified, &WatchedFields::default())
            .iter()
            .map(|d| d.policy_id.get())
            .collect();
        assert_eq!(ids, vec![3, 9]);
    }

    #[test]
    fn shape_only_changes_are_not_changes() {
        let original = generation(&[json!({"policyid": 1, "srcintf": [{"name": "A"}]})]);
        let modified = generation(&[json!({"policyid": 1, "srcintf": "A"})]);
        assert!(diff(&original, &modified, &WatchedFields::default()).is_empty());
    }

    #[test]
    fn watched_fields_parse() {
        assert_eq!(
            WatchedFields::parse(" srcintf , ,dstintf,srcintf").to_string(),
            "srcintf,dstintf"
        );
        assert_eq!(WatchedFields::parse(" , "), WatchedFields::default());
        assert_eq!(
            "service".parse::<WatchedFields>().unwrap().to_string(),
            "service"
        );
    }
}
