// ── Generations ──

use std::collections::BTreeMap;
use std::collections::btree_map;

use super::record::{PolicyId, PolicyRecord};

/// Every policy as of one load, keyed by id.
///
/// Backed by a `BTreeMap`, so iteration is always ascending by id and
/// reports built from it are reproducible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generation {
    records: BTreeMap<PolicyId, PolicyRecord>,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from records, skipping any without an integer `policyid`.
    pub fn from_records(records: impl IntoIterator<Item = PolicyRecord>) -> Self {
        records
            .into_iter()
            .filter_map(|record| record.policy_id().map(|id| (id, record)))
            .collect()
    }

    /// Insert a record, returning the one it replaced.
    pub fn insert(&mut self, id: PolicyId, record: PolicyRecord) -> Option<PolicyRecord> {
        self.records.insert(id, record)
    }

    pub fn get(&self, id: PolicyId) -> Option<&PolicyRecord> {
        self.records.get(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PolicyId, &PolicyRecord)> {
        self.records.iter().map(|(id, record)| (*id, record))
    }
}

impl FromIterator<(PolicyId, PolicyRecord)> for Generation {
    fn from_iter<I: IntoIterator<Item = (PolicyId, PolicyRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Generation {
    type Item = (PolicyId, PolicyRecord);
    type IntoIter = btree_map::IntoIter<PolicyId, PolicyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
