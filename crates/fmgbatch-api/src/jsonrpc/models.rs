// JSON-RPC envelope types
//
// Every call is a POST to `/jsonrpc` carrying a single-element `params`
// list. Responses mirror that shape: `result[0]` holds the per-call status
// and the payload. Fields use `#[serde(default)]` liberally because the
// appliance omits keys freely across firmware versions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Request Envelope ─────────────────────────────────────────────────

/// Outgoing request envelope.
///
/// ```json
/// { "method": "get", "params": [{ "url": "/pm/..." }], "session": "...", "id": 3 }
/// ```
#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub method: &'a str,
    pub params: [RpcParams<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<&'a str>,
    pub id: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct RpcParams<'a> {
    pub url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<&'a Value>,
}

// ── Response Envelope ────────────────────────────────────────────────

/// Incoming response envelope. Only the login call carries `session`.
#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse {
    #[serde(default)]
    pub result: Vec<RpcResult>,
    #[serde(default)]
    pub session: Option<String>,
}

impl RpcResponse {
    /// The first result entry, or an empty one when the list is missing.
    pub fn into_first(self) -> RpcResult {
        self.result.into_iter().next().unwrap_or_default()
    }

    /// Status of the first result entry (see [`RpcResult::status`]).
    pub fn status(&self) -> Status {
        self.result
            .first()
            .map(RpcResult::status)
            .unwrap_or_default()
    }
}

/// One entry of the `result` list.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RpcResult {
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl RpcResult {
    /// The reported status; a missing status counts as an unknown failure.
    pub fn status(&self) -> Status {
        self.status.clone().unwrap_or_default()
    }
}

/// Per-call status. `code == 0` means success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default = "unknown_code")]
    pub code: i64,
    #[serde(default = "unknown_message")]
    pub message: String,
}

impl Default for Status {
    fn default() -> Self {
        Self {
            code: unknown_code(),
            message: unknown_message(),
        }
    }
}

impl Status {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            code: 0,
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

fn unknown_code() -> i64 {
    -1
}
fn unknown_message() -> String {
    "Unknown error".into()
}

// ── Scope ────────────────────────────────────────────────────────────

/// Administrative domain + policy package that a policy call targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub adom: String,
    pub package: String,
}

impl Scope {
    pub fn new(adom: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            adom: adom.into(),
            package: package.into(),
        }
    }

    /// `/pm/config/adom/{adom}/pkg/{package}/firewall/policy`
    pub fn policies_url(&self) -> String {
        format!(
            "/pm/config/adom/{}/pkg/{}/firewall/policy",
            self.adom, self.package
        )
    }

    /// `/pm/config/adom/{adom}/pkg/{package}/firewall/policy/{id}`
    pub fn policy_url(&self, policy_id: u64) -> String {
        format!("{}/{policy_id}", self.policies_url())
    }

    /// `/pm/config/adom/{adom}/pkg/{package}/firewall/policy/{id}/{field}`
    pub fn policy_field_url(&self, policy_id: u64, field: &str) -> String {
        format!("{}/{field}", self.policy_url(policy_id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn request_omits_absent_session_and_data() {
        let req = RpcRequest {
            method: "get",
            params: [RpcParams {
                url: "/sys/status",
                data: None,
            }],
            session: None,
            id: 7,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"method": "get", "params": [{"url": "/sys/status"}], "id": 7})
        );
    }

    #[test]
    fn missing_status_is_unknown_failure() {
        let resp: RpcResponse = serde_json::from_value(json!({"result": [{}]})).unwrap();
        let status = resp.status();
        assert_eq!(status.code, -1);
        assert_eq!(status.message, "Unknown error");
        assert!(!status.is_ok());
    }

    #[test]
    fn empty_response_has_default_result() {
        let resp: RpcResponse = serde_json::from_value(json!({})).unwrap();
        assert!(resp.session.is_none());
        assert!(resp.into_first().data.is_none());
    }

    #[test]
    fn scope_urls() {
        let scope = Scope::new("root", "default");
        assert_eq!(
            scope.policy_field_url(12, "srcintf"),
            "/pm/config/adom/root/pkg/default/firewall/policy/12/srcintf"
        );
    }
}
