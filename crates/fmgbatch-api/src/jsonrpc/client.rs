// JSON-RPC HTTP client
//
// Wraps `reqwest::Client` with envelope construction, request-id
// sequencing, session bookkeeping and status-code unwrapping. Endpoint
// groups (auth, policies) are inherent methods in sibling files so this
// module stays focused on transport mechanics.

use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::jsonrpc::models::{RpcParams, RpcRequest, RpcResponse, RpcResult};
use crate::transport::TransportConfig;

/// Client for the appliance's `/jsonrpc` endpoint.
///
/// Holds the login credentials and the session token. The session is
/// acquired lazily: the first data call logs in if no token is held, and
/// [`logout`](Self::logout) drops it again. Request ids are drawn from a
/// monotonic counter shared by every call made through this handle.
pub struct FmgClient {
    http: reqwest::Client,
    endpoint: Url,
    username: String,
    password: SecretString,
    session: RwLock<Option<SecretString>>,
    request_id: AtomicU64,
}

impl FmgClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the appliance root (e.g. `https://10.0.0.5`); requests
    /// go to `{base_url}/jsonrpc`.
    pub fn new(
        base_url: &Url,
        username: impl Into<String>,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, base_url, username, password)
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &Url,
        username: impl Into<String>,
        password: SecretString,
    ) -> Result<Self, Error> {
        let endpoint = base_url.join("/jsonrpc")?;
        Ok(Self {
            http,
            endpoint,
            username: username.into(),
            password,
            session: RwLock::new(None),
            request_id: AtomicU64::new(1),
        })
    }

    /// The full `/jsonrpc` URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub(crate) fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &SecretString {
        &self.password
    }

    // ── Session bookkeeping ──────────────────────────────────────────

    /// Whether a session token is currently held.
    pub fn has_session(&self) -> bool {
        self.session.read().expect("session lock poisoned").is_some()
    }

    pub(crate) fn session_token(&self) -> Option<SecretString> {
        self.session.read().expect("session lock poisoned").clone()
    }

    pub(crate) fn set_session(&self, token: SecretString) {
        trace!("storing session token");
        *self.session.write().expect("session lock poisoned") = Some(token);
    }

    pub(crate) fn clear_session(&self) {
        *self.session.write().expect("session lock poisoned") = None;
    }

    /// Next request id. Starts at 1, never reused within this handle.
    pub(crate) fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send one envelope and decode the response body.
    ///
    /// Only HTTP-level failures are handled here; the per-call status in
    /// `result[0]` is left for the caller.
    pub(crate) async fn send_envelope(
        &self,
        method: &str,
        url: &str,
        data: Option<&Value>,
        session: Option<&SecretString>,
    ) -> Result<RpcResponse, Error> {
        let id = self.next_id();
        let request = RpcRequest {
            method,
            params: [RpcParams { url, data }],
            session: session.map(|token| token.expose_secret()),
            id,
        };

        debug!(method, url, id, "json-rpc request");

        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }

    /// Return the held session token, logging in first if there is none.
    async fn ensure_session(&self) -> Result<SecretString, Error> {
        if let Some(token) = self.session_token() {
            return Ok(token);
        }
        debug!("no session held, logging in");
        self.login().await?;
        self.session_token().ok_or_else(|| Error::Authentication {
            message: "login completed without a session token".into(),
        })
    }

    /// Issue a data call and unwrap `result[0]`.
    ///
    /// Logs in lazily, embeds the session token, and maps a non-zero
    /// `status.code` to [`Error::Api`].
    pub(crate) async fn call(
        &self,
        method: &str,
        url: &str,
        data: Option<&Value>,
    ) -> Result<RpcResult, Error> {
        let token = self.ensure_session().await?;
        let response = self.send_envelope(method, url, data, Some(&token)).await?;
        let result = response.into_first();
        let status = result.status();

        if !status.is_ok() {
            return Err(Error::Api {
                code: status.code,
                message: status.message,
                url: url.to_owned(),
            });
        }

        Ok(result)
    }
}
