// ── Runtime connection configuration ──
//
// These types describe *how* to reach one FortiManager policy package.
// They carry credential data and connection tuning, but never touch disk.
// The CLI builds a `ManagerConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use fmgbatch_api::{Scope, TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification. Appliances usually present self-signed certs.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for talking to one appliance and policy package.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Appliance root URL (e.g., `https://10.0.0.5`).
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    /// ADOM + policy package every policy call targets.
    pub scope: Scope,
    pub tls: TlsVerification,
    pub timeout: Duration,
}

impl ManagerConfig {
    /// Transport settings for the API client.
    pub fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }
}
