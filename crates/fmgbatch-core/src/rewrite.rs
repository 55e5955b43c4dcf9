// ── Interface rewriting ──
//
// Bulk replacement of one interface name by a list of others across the
// `srcintf`/`dstintf` fields of a generation. `InterfaceRewrite::apply` is
// pure; `replace_interface` adds the file I/O around it.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::FileError;
use crate::model::{
    DSTINTF_FIELD, FieldChange, Generation, PolicyRecord, RecordDelta, SRCINTF_FIELD,
    names_interface, normalize_interfaces,
};
use crate::store;

pub const DEFAULT_TARGET_INTERFACE: &str = "MPLS";

pub const DEFAULT_REPLACEMENTS: [&str; 6] = [
    "DP_VPN1",
    "DP_VPN2",
    "HI_VPN1",
    "HI_VPN2",
    "DP-HI-VPN_1",
    "DP-HI-VPN_2",
];

const REWRITTEN_FIELDS: [&str; 2] = [SRCINTF_FIELD, DSTINTF_FIELD];

/// Replace `target` with `replacements` in interface lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceRewrite {
    pub target: String,
    pub replacements: Vec<String>,
}

impl Default for InterfaceRewrite {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET_INTERFACE.to_owned(),
            replacements: DEFAULT_REPLACEMENTS.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

impl InterfaceRewrite {
    pub fn new(target: impl Into<String>, replacements: Vec<String>) -> Self {
        Self {
            target: target.into(),
            replacements,
        }
    }

    /// Rewrite one interface-field value.
    ///
    /// Returns `None` unless `value` is an array holding at least one element
    /// naming the target. Otherwise every such element is removed, the rest
    /// keep their order and JSON shape, and the replacements are appended as
    /// strings.
    pub fn rewrite_value(&self, value: &Value) -> Option<Value> {
        let Value::Array(items) = value else {
            return None;
        };
        if !items.iter().any(|item| names_interface(item, &self.target)) {
            return None;
        }
        let mut out: Vec<Value> = items
            .iter()
            .filter(|item| !names_interface(item, &self.target))
            .cloned()
            .collect();
        out.extend(self.replacements.iter().cloned().map(Value::String));
        Some(Value::Array(out))
    }

    /// Rewrite `srcintf` and `dstintf` of one record.
    ///
    /// Returns the new record and its delta when at least one field changed.
    pub fn rewrite_record(&self, record: &PolicyRecord) -> Option<(PolicyRecord, RecordDelta)> {
        let id = record.policy_id()?;
        let mut rewritten = record.clone();
        let mut delta = RecordDelta::new(id, record.name());

        for field in REWRITTEN_FIELDS {
            let Some(before) = record.get(field) else {
                continue;
            };
            let Some(after) = self.rewrite_value(before) else {
                continue;
            };
            if &after == before {
                continue;
            }
            delta.insert(
                field,
                FieldChange::new(
                    normalize_interfaces(Some(before)),
                    normalize_interfaces(Some(&after)),
                ),
            );
            rewritten.set(field, after);
        }

        (!delta.is_empty()).then_some((rewritten, delta))
    }

    /// Rewrite a whole generation.
    ///
    /// The returned generation holds only the modified records.
    pub fn apply(&self, original: &Generation) -> (Generation, Vec<RecordDelta>) {
        let mut modified = Generation::new();
        let mut deltas = Vec::new();
        for (id, record) in original.iter() {
            if let Some((rewritten, delta)) = self.rewrite_record(record) {
                debug!(policy_id = %id, fields = delta.field_deltas.len(), "rewrote record");
                modified.insert(id, rewritten);
                deltas.push(delta);
            }
        }
        (modified, deltas)
    }
}

/// Rewrite `original` and save every modified record under `output_dir`.
pub fn replace_interface(
    original: &Generation,
    rewrite: &InterfaceRewrite,
    output_dir: &Path,
) -> Result<Vec<RecordDelta>, FileError> {
    let (modified, deltas) = rewrite.apply(original);
    for (id, record) in modified.iter() {
        store::save_record(record, &store::record_path(output_dir, id))?;
    }
    info!(
        target_interface = %rewrite.target,
        scanned = original.len(),
        modified = deltas.len(),
        "interface replacement complete"
    );
    Ok(deltas)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::PolicyId;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(value: Value) -> PolicyRecord {
        serde_json::from_value(value).unwrap()
    }

    fn rewrite_xy() -> InterfaceRewrite {
        InterfaceRewrite::new("MPLS", vec!["X".into(), "Y".into()])
    }

    #[test]
    fn survivors_keep_order_and_replacements_append() {
        let out = rewrite_xy().rewrite_value(&json!(["A", "MPLS", "B"]));
        assert_eq!(out, Some(json!(["A", "B", "X", "Y"])));
    }

    #[test]
    fn object_elements_match_and_survivors_keep_shape() {
        let out = rewrite_xy().rewrite_value(&json!([{"name": "MPLS"}, {"name": "lan"}]));
        assert_eq!(out, Some(json!([{"name": "lan"}, "X", "Y"])));
    }

    #[test]
    fn every_occurrence_is_removed() {
        let out = rewrite_xy().rewrite_value(&json!(["MPLS", "A", "MPLS"]));
        assert_eq!(out, Some(json!(["A", "X", "Y"])));
    }

    #[test]
    fn non_arrays_and_missing_target_are_untouched() {
        let rw = rewrite_xy();
        assert_eq!(rw.rewrite_value(&json!("MPLS")), None);
        assert_eq!(rw.rewrite_value(&json!(null)), None);
        assert_eq!(rw.rewrite_value(&json!(["A", "B"])), None);
    }

    #[test]
    fn record_delta_lists_only_changed_fields() {
        let rec = record(json!({
            "policyid": 4,
            "name": "to-dc",
            "srcintf": ["lan"],
            "dstintf": ["MPLS"],
        }));
        let (rewritten, delta) = rewrite_xy().rewrite_record(&rec).unwrap();

        assert_eq!(delta.policy_id, PolicyId::new(4));
        assert_eq!(delta.name, "to-dc");
        assert_eq!(delta.field_deltas.keys().collect::<Vec<_>>(), vec!["dstintf"]);
        assert_eq!(rewritten.get("dstintf"), Some(&json!(["X", "Y"])));
        assert_eq!(rewritten.get("srcintf"), Some(&json!(["lan"])));
    }

    #[test]
    fn other_fields_are_preserved() {
        let rec = record(json!({
            "policyid": 1,
            "name": "p",
            "srcintf": ["MPLS"],
            "dstintf": ["wan"],
            "action": 1,
            "schedule": ["always"],
            "service": ["HTTPS", "DNS"],
            "srcaddr": [{"name": "all"}],
            "dstaddr": ["10.0.0.0/8"],
            "nat": 0,
            "logtraffic": 2,
            "comments": "keep me",
            "status": 1,
            "global-label": "WAN",
        }));
        let (rewritten, _) = rewrite_xy().rewrite_record(&rec).unwrap();

        for (key, value) in rec.fields() {
            if key != "srcintf" {
                assert_eq!(rewritten.get(key), Some(value), "field {key} changed");
            }
        }
        let keys: Vec<&String> = rewritten.fields().keys().collect();
        let expected: Vec<&String> = rec.fields().keys().collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn rewriting_twice_changes_nothing_more() {
        let original = Generation::from_records([
            record(json!({"policyid": 1, "srcintf": ["A", "MPLS"], "dstintf": ["MPLS"]})),
            record(json!({"policyid": 2, "srcintf": ["B"]})),
        ]);
        let rw = rewrite_xy();

        let (first, deltas) = rw.apply(&original);
        assert_eq!(deltas.len(), 1);
        assert_eq!(first.len(), 1);

        let (second, again) = rw.apply(&first);
        assert!(second.is_empty());
        assert!(again.is_empty());
    }

    #[test]
    fn replacement_equal_to_target_is_not_a_change() {
        let rec = record(json!({"policyid": 1, "srcintf": ["MPLS"]}));
        let rw = InterfaceRewrite::new("MPLS", vec!["MPLS".into()]);
        assert!(rw.rewrite_record(&rec).is_none());
    }

    #[test]
    fn writes_modified_records_only() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("modified");
        let original = Generation::from_records([
            record(json!({"policyid": 1, "srcintf": ["MPLS"]})),
            record(json!({"policyid": 2, "srcintf": ["lan"]})),
        ]);

        let deltas = replace_interface(&original, &InterfaceRewrite::default(), &out).unwrap();

        assert_eq!(deltas.len(), 1);
        let saved = store::load_generation(&out).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(
            saved.get(PolicyId::new(1)).unwrap().interfaces("srcintf"),
            DEFAULT_REPLACEMENTS.to_vec()
        );
    }
}
