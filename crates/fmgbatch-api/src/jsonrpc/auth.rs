// Session login/logout
//
// `exec /sys/login/user` returns a session token in the envelope's
// top-level `session` key; every later call echoes it back.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::jsonrpc::client::FmgClient;

impl FmgClient {
    /// Authenticate and store the session token.
    ///
    /// Any failure during login (transport, HTTP status, a response
    /// without `session`) is reported as [`Error::Authentication`].
    pub async fn login(&self) -> Result<(), Error> {
        let body = json!({
            "user": self.username(),
            "passwd": self.password().expose_secret(),
        });

        debug!(user = self.username(), "logging in");

        let response = self
            .send_envelope("exec", "/sys/login/user", Some(&body), None)
            .await
            .map_err(|e| Error::Authentication {
                message: format!("login request failed: {e}"),
            })?;

        let Some(token) = response.session.clone() else {
            return Err(Error::Authentication {
                message: format!("login failed: {}", response.status().message),
            });
        };

        self.set_session(SecretString::from(token));
        info!("logged in to FortiManager");
        Ok(())
    }

    /// End the current session.
    ///
    /// Best-effort: a failed request is only logged, and the local token
    /// is dropped either way. Without a session this is a no-op.
    pub async fn logout(&self) {
        let Some(token) = self.session_token() else {
            warn!("not logged in, skipping logout");
            return;
        };

        match self
            .send_envelope("exec", "/sys/logout", None, Some(&token))
            .await
        {
            Ok(_) => info!("logged out from FortiManager"),
            Err(e) => warn!(error = %e, "logout request failed"),
        }

        self.clear_session();
    }
}
