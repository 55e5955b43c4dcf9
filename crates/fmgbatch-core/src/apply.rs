// ── Remote apply ──
//
// Pushes record deltas to the appliance one record at a time. Each record
// first gets a single whole-record update; if that is rejected, every
// changed field is retried on its own with clear-and-set. Failures are
// recorded on the outcome and never stop the batch.

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::model::{PolicyId, RecordDelta};
use crate::remote::PolicyApi;

/// Terminal state of one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyStatus {
    /// The whole update went through, or every fallback field did.
    Success,
    /// Fallback ran and some, but not all, fields were applied.
    PartialFailure,
    /// Nothing was applied.
    Failure,
}

/// Result of one fallback field update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldOutcome {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FieldOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyOutcome {
    pub policy_id: PolicyId,
    pub name: String,
    pub status: ApplyStatus,
    /// Whether the per-field fallback ran.
    pub used_fallback: bool,
    /// Why the whole-record update was rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whole_update_error: Option<String>,
    /// Fallback results, in field order. Empty unless `used_fallback`.
    pub fields: Vec<FieldOutcome>,
}

impl ApplyOutcome {
    pub fn failed_fields(&self) -> impl Iterator<Item = &FieldOutcome> {
        self.fields.iter().filter(|f| !f.is_ok())
    }
}

/// Apply one record delta.
pub async fn apply_one<A: PolicyApi>(delta: &RecordDelta, api: &A) -> ApplyOutcome {
    let id = delta.policy_id;
    let payload = delta.update_payload();
    debug!(
        policy_id = %id,
        payload = %serde_json::Value::Object(payload.clone()),
        "updating policy"
    );

    let whole_update_error = match api.update_policy(id, &payload).await {
        Ok(_) => {
            info!(policy_id = %id, "updated policy");
            return ApplyOutcome {
                policy_id: id,
                name: delta.name.clone(),
                status: ApplyStatus::Success,
                used_fallback: false,
                whole_update_error: None,
                fields: Vec::new(),
            };
        }
        Err(e) => e.to_string(),
    };

    warn!(
        policy_id = %id,
        error = %whole_update_error,
        "whole-record update failed, retrying field by field"
    );

    let mut fields = Vec::with_capacity(delta.field_deltas.len());
    for (field, change) in &delta.field_deltas {
        let error = match api.clear_and_set_field(id, field, &change.modified).await {
            Ok(_) => {
                info!(policy_id = %id, field = %field, "updated field");
                None
            }
            Err(e) => {
                error!(policy_id = %id, field = %field, error = %e, "failed to update field");
                Some(e.to_string())
            }
        };
        fields.push(FieldOutcome {
            field: field.clone(),
            error,
        });
    }

    let succeeded = fields.iter().filter(|f| f.is_ok()).count();
    let status = if succeeded == 0 {
        ApplyStatus::Failure
    } else if succeeded == fields.len() {
        ApplyStatus::Success
    } else {
        ApplyStatus::PartialFailure
    };

    ApplyOutcome {
        policy_id: id,
        name: delta.name.clone(),
        status,
        used_fallback: true,
        whole_update_error: Some(whole_update_error),
        fields,
    }
}

/// Apply every delta in order.
pub async fn apply<A: PolicyApi>(deltas: &[RecordDelta], api: &A) -> Vec<ApplyOutcome> {
    apply_with(deltas, api, |_| {}).await
}

/// [`apply`], calling `on_outcome` after each record.
pub async fn apply_with<A, F>(
    deltas: &[RecordDelta],
    api: &A,
    mut on_outcome: F,
) -> Vec<ApplyOutcome>
where
    A: PolicyApi,
    F: FnMut(&ApplyOutcome),
{
    let mut outcomes = Vec::with_capacity(deltas.len());
    for delta in deltas {
        let outcome = apply_one(delta, api).await;
        on_outcome(&outcome);
        outcomes.push(outcome);
    }
    info!(records = outcomes.len(), "policy updates completed");
    outcomes
}

/// Totals across a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplySummary {
    pub succeeded: usize,
    pub partial: usize,
    pub failed: usize,
    pub failed_fields: usize,
}

impl ApplySummary {
    pub fn from_outcomes(outcomes: &[ApplyOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut acc, outcome| {
            match outcome.status {
                ApplyStatus::Success => acc.succeeded += 1,
                ApplyStatus::PartialFailure => acc.partial += 1,
                ApplyStatus::Failure => acc.failed += 1,
            }
            acc.failed_fields += outcome.failed_fields().count();
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.partial + self.failed
    }

    pub fn all_succeeded(&self) -> bool {
        self.partial == 0 && self.failed == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use fmgbatch_api::Status;
    use pretty_assertions::assert_eq;
    use serde_json::{Map, Value};

    use super::*;
    use crate::error::CoreError;
    use crate::model::{FieldChange, PolicyRecord};

    /// Records every call; rejects whole updates and field updates listed
    /// in its failure sets.
    #[derive(Default)]
    struct FakeApi {
        reject_whole: HashSet<u64>,
        reject_fields: HashSet<(u64, String)>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    fn rejected() -> CoreError {
        CoreError::Api {
            message: "Invalid value".into(),
            code: Some(-10),
        }
    }

    impl PolicyApi for FakeApi {
        async fn list_policies(&self) -> Result<Vec<PolicyRecord>, CoreError> {
            Ok(Vec::new())
        }

        async fn get_policy(&self, _id: PolicyId) -> Result<PolicyRecord, CoreError> {
            Ok(PolicyRecord::default())
        }

        async fn update_policy(
            &self,
            id: PolicyId,
            fields: &Map<String, Value>,
        ) -> Result<Status, CoreError> {
            self.record(format!("update {id} {}", Value::Object(fields.clone())));
            if self.reject_whole.contains(&id.get()) {
                return Err(rejected());
            }
            Ok(Status::ok("OK"))
        }

        async fn clear_and_set_field(
            &self,
            id: PolicyId,
            field: &str,
            values: &[String],
        ) -> Result<Status, CoreError> {
            self.record(format!("field {id} {field} {}", values.join(",")));
            if self.reject_fields.contains(&(id.get(), field.to_owned())) {
                return Err(rejected());
            }
            Ok(Status::ok("OK"))
        }

        async fn logout(&self) {}
    }

    /// `fields` pairs a field name with its comma-separated new values.
    fn delta(id: u64, fields: &[(&str, &str)]) -> RecordDelta {
        let mut delta = RecordDelta::new(PolicyId::new(id), format!("policy-{id}"));
        for (field, values) in fields {
            let modified = values
                .split(',')
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
                .collect();
            delta.insert(*field, FieldChange::new(vec!["OLD".into()], modified));
        }
        delta
    }

    #[tokio::test]
    async fn whole_update_success_skips_fallback() {
        let api = FakeApi::default();
        let outcome = apply_one(&delta(1, &[("srcintf", "B")]), &api).await;

        assert_eq!(outcome.status, ApplyStatus::Success);
        assert!(!outcome.used_fallback);
        assert_eq!(api.calls(), vec![r#"update 1 {"srcintf":["B"]}"#]);
    }

    #[tokio::test]
    async fn fallback_isolates_failing_field_and_continues() {
        let api = FakeApi {
            reject_whole: HashSet::from([1]),
            reject_fields: HashSet::from([(1, "dstintf".to_owned())]),
            ..FakeApi::default()
        };
        let deltas = [
            delta(1, &[("srcintf", "A,B"), ("dstintf", "C")]),
            delta(2, &[("srcintf", "X")]),
        ];

        let outcomes = apply(&deltas, &api).await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].status, ApplyStatus::PartialFailure);
        assert!(outcomes[0].used_fallback);
        assert!(outcomes[0].whole_update_error.is_some());
        assert_eq!(
            outcomes[0]
                .failed_fields()
                .map(|f| f.field.as_str())
                .collect::<Vec<_>>(),
            vec!["dstintf"]
        );
        assert_eq!(outcomes[1].status, ApplyStatus::Success);

        assert_eq!(
            api.calls(),
            vec![
                r#"update 1 {"srcintf":["A","B"],"dstintf":["C"]}"#.to_owned(),
                "field 1 srcintf A,B".to_owned(),
                "field 1 dstintf C".to_owned(),
                r#"update 2 {"srcintf":["X"]}"#.to_owned(),
            ]
        );
    }

    #[tokio::test]
    async fn every_fallback_field_failing_is_failure() {
        let api = FakeApi {
            reject_whole: HashSet::from([3]),
            reject_fields: HashSet::from([(3, "srcintf".to_owned())]),
            ..FakeApi::default()
        };
        let outcome = apply_one(&delta(3, &[("srcintf", "A")]), &api).await;
        assert_eq!(outcome.status, ApplyStatus::Failure);
    }

    #[tokio::test]
    async fn every_fallback_field_succeeding_is_success() {
        let api = FakeApi {
            reject_whole: HashSet::from([3]),
            ..FakeApi::default()
        };
        let outcome = apply_one(&delta(3, &[("srcintf", "A"), ("dstintf", "")]), &api).await;
        assert_eq!(outcome.status, ApplyStatus::Success);
        assert!(outcome.used_fallback);
        assert_eq!(outcome.fields.len(), 2);
    }

    #[tokio::test]
    async fn rejected_delta_without_fields_is_failure() {
        let api = FakeApi {
            reject_whole: HashSet::from([5]),
            ..FakeApi::default()
        };
        let outcome = apply_one(&delta(5, &[]), &api).await;
        assert_eq!(outcome.status, ApplyStatus::Failure);
        assert!(outcome.fields.is_empty());
    }

    #[tokio::test]
    async fn summary_counts_statuses_and_failed_fields() {
        let api = FakeApi {
            reject_whole: HashSet::from([1, 2]),
            reject_fields: HashSet::from([(1, "dstintf".to_owned()), (2, "srcintf".to_owned())]),
            ..FakeApi::default()
        };
        let deltas = [
            delta(1, &[("srcintf", "A"), ("dstintf", "B")]),
            delta(2, &[("srcintf", "C")]),
            delta(3, &[("srcintf", "D")]),
        ];

        let mut seen = Vec::new();
        let outcomes = apply_with(&deltas, &api, |o| seen.push(o.policy_id.get())).await;
        let summary = ApplySummary::from_outcomes(&outcomes);

        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(
            summary,
            ApplySummary {
                succeeded: 1,
                partial: 1,
                failed: 1,
                failed_fields: 2,
            }
        );
        assert_eq!(summary.total(), 3);
        assert!(!summary.all_succeeded());
    }
}
