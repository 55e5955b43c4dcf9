//! Settings for the fmgbatch CLI.
//!
//! Values are layered with figment, lowest precedence first:
//! built-in defaults, the TOML config file, a `.env` file, then `FMGR_*`
//! process environment variables. [`Settings::into_manager_config`]
//! validates the result and produces the core crate's `ManagerConfig`.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
    value::{Dict, Value},
};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use url::Url;

use fmgbatch_core::{ManagerConfig, Scope, TlsVerification};

/// Prefix shared by every environment variable (and `.env` key) read here.
pub const ENV_PREFIX: &str = "FMGR_";

const DEFAULT_ENV_FILE: &str = ".env";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment file not found: {}", .0.display())]
    EnvFileNotFound(PathBuf),

    #[error("failed to read environment file {}: {source}", .path.display())]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },

    #[error("Missing required environment variables: {}", .missing.join(", "))]
    Missing { missing: Vec<String> },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Settings ────────────────────────────────────────────────────────

/// Raw settings as extracted from all layers. Nothing is validated yet.
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Appliance address: `10.0.0.5`, `fmg.example.net` or a full URL.
    #[serde(default, deserialize_with = "lenient_string")]
    pub ip: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub username: Option<String>,

    #[serde(default, deserialize_with = "lenient_secret")]
    pub password: Option<SecretString>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub adom: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub package: Option<String>,

    /// Verify the appliance certificate against the system roots.
    ///
    /// Accepts `true/false`, `yes/no`, `on/off` and `1/0`. Any other value is
    /// a config error rather than a silent `false`.
    #[serde(deserialize_with = "figment::util::bool_from_str_or_int")]
    pub verify_ssl: bool,

    /// CA bundle to verify against instead. Implies verification.
    #[serde(default)]
    pub ca_cert: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[serde(deserialize_with = "lenient_u64")]
    pub timeout: u64,
}

/// Serializable defaults layer. Kept separate because `Settings` holds a
/// secret and is never serialized.
#[derive(Serialize)]
struct Defaults {
    verify_ssl: bool,
    timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            verify_ssl: false,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Names of required variables that are unset or blank, in a fixed order.
    pub fn missing(&self) -> Vec<String> {
        let required = [
            ("IP", self.ip.as_deref().is_some_and(is_set)),
            ("USERNAME", self.username.as_deref().is_some_and(is_set)),
            ("PASSWORD", self.password.is_some()),
            ("ADOM", self.adom.as_deref().is_some_and(is_set)),
            ("PACKAGE", self.package.as_deref().is_some_and(is_set)),
        ];
        required
            .into_iter()
            .filter(|(_, present)| !present)
            .map(|(name, _)| format!("{ENV_PREFIX}{name}"))
            .collect()
    }

    /// Validate and convert to the connection config.
    ///
    /// Every missing required key is reported at once.
    pub fn into_manager_config(self) -> Result<ManagerConfig, ConfigError> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(ConfigError::Missing { missing });
        }
        let ip = required(self.ip, "IP")?;
        let username = required(self.username, "USERNAME")?;
        let password = required(self.password, "PASSWORD")?;
        let adom = required(self.adom, "ADOM")?;
        let package = required(self.package, "PACKAGE")?;

        if self.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }

        let tls = match (self.ca_cert, self.verify_ssl) {
            (Some(path), _) => TlsVerification::CustomCa(path),
            (None, true) => TlsVerification::SystemDefaults,
            (None, false) => TlsVerification::DangerAcceptInvalid,
        };

        Ok(ManagerConfig {
            url: appliance_url(ip.trim())?,
            username: username.trim().to_owned(),
            password,
            scope: Scope::new(adom.trim(), package.trim()),
            tls,
            timeout: Duration::from_secs(self.timeout),
        })
    }

    /// One-line view for logs with the password masked.
    pub fn redacted(&self) -> String {
        const UNSET: &str = "<unset>";
        let mut out = format!(
            "ip={} username={} password={} adom={} package={} verify_ssl={} timeout={}s",
            self.ip.as_deref().unwrap_or(UNSET),
            self.username.as_deref().unwrap_or(UNSET),
            if self.password.is_some() { "********" } else { UNSET },
            self.adom.as_deref().unwrap_or(UNSET),
            self.package.as_deref().unwrap_or(UNSET),
            self.verify_ssl,
            self.timeout,
        );
        if let Some(ca) = &self.ca_cert {
            let _ = write!(out, " ca_cert={}", ca.display());
        }
        out
    }
}

fn required<T>(value: Option<T>, name: &str) -> Result<T, ConfigError> {
    value.ok_or_else(|| ConfigError::Missing {
        missing: vec![format!("{ENV_PREFIX}{name}")],
    })
}

fn is_set(value: &str) -> bool {
    !value.trim().is_empty()
}

/// `https://` is assumed when the address carries no scheme.
fn appliance_url(ip: &str) -> Result<Url, ConfigError> {
    let candidate = if ip.contains("://") {
        ip.to_owned()
    } else {
        format!("https://{ip}")
    };
    Url::parse(&candidate).map_err(|e| ConfigError::Validation {
        field: "ip".into(),
        reason: format!("'{ip}' is not a valid address: {e}"),
    })
}

// ── Lenient deserializers ───────────────────────────────────────────
//
// Environment and `.env` values always arrive as text, while the TOML file
// may carry numbers or booleans (`password = 1234`). Each setting accepts
// whichever form it can make sense of.

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Self::Str(s) => s,
            Self::Int(n) => n.to_string(),
            Self::UInt(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(de)?.map(Scalar::into_string))
}

fn lenient_u64<'de, D: Deserializer<'de>>(de: D) -> Result<u64, D::Error> {
    use serde::de::Error as _;
    match Scalar::deserialize(de)? {
        Scalar::Str(s) => s.trim().parse().map_err(D::Error::custom),
        Scalar::UInt(n) => Ok(n),
        Scalar::Int(n) => u64::try_from(n).map_err(D::Error::custom),
        Scalar::Float(_) | Scalar::Bool(_) => Err(D::Error::custom("expected a whole number")),
    }
}

fn lenient_secret<'de, D: Deserializer<'de>>(de: D) -> Result<Option<SecretString>, D::Error> {
    Ok(lenient_string(de)?
        .filter(|s| !s.is_empty())
        .map(SecretString::from))
}

// ── Loading ─────────────────────────────────────────────────────────

/// Default config file location via platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "fmgbatch", "fmgbatch").map_or_else(
        || PathBuf::from(".fmgbatch.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Read the `FMGR_*` entries of a `.env` file as figment values.
///
/// The process environment is left untouched.
pub fn read_env_file(path: &Path) -> Result<Dict, ConfigError> {
    let env_err = |source| ConfigError::EnvFile {
        path: path.to_path_buf(),
        source,
    };
    let mut dict = Dict::new();
    for item in dotenvy::from_path_iter(path).map_err(env_err)? {
        let (key, value) = item.map_err(env_err)?;
        if let Some(name) = key.strip_prefix(ENV_PREFIX) {
            dict.insert(name.to_ascii_lowercase(), Value::from(value));
        }
    }
    Ok(dict)
}

/// The `FMGR_*` process environment as raw text values.
///
/// Values are never parsed, so `FMGR_PASSWORD=007` stays `"007"`. Entries
/// that are not valid UTF-8 are skipped.
pub fn read_process_env() -> Dict {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .filter_map(|(key, value)| {
            let name = key.strip_prefix(ENV_PREFIX)?.to_ascii_lowercase();
            Some((name, Value::from(value)))
        })
        .collect()
}

/// Assemble every layer.
///
/// An explicit `env_file` must exist; the implicit `./.env` is optional.
pub fn figment(config_file: &Path, env_file: Option<&Path>) -> Result<Figment, ConfigError> {
    let dotenv = match env_file {
        Some(path) if !path.is_file() => {
            return Err(ConfigError::EnvFileNotFound(path.to_path_buf()));
        }
        Some(path) => read_env_file(path)?,
        None if Path::new(DEFAULT_ENV_FILE).is_file() => {
            read_env_file(Path::new(DEFAULT_ENV_FILE))?
        }
        None => Dict::new(),
    };

    Ok(Figment::new()
        .merge(Serialized::defaults(Defaults::default()))
        .merge(Toml::file(config_file))
        .merge(Serialized::defaults(dotenv))
        .merge(Serialized::defaults(read_process_env())))
}

/// Load settings from every layer. `config_file` defaults to [`config_path`].
pub fn load_settings(
    config_file: Option<&Path>,
    env_file: Option<&Path>,
) -> Result<Settings, ConfigError> {
    let config_file = config_file.map_or_else(config_path, Path::to_path_buf);
    Ok(figment(&config_file, env_file)?.extract()?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    fn set_required(jail: &mut Jail) {
        jail.set_env("FMGR_IP", "10.0.0.5");
        jail.set_env("FMGR_USERNAME", "admin");
        jail.set_env("FMGR_PASSWORD", "s3cret");
        jail.set_env("FMGR_ADOM", "root");
        jail.set_env("FMGR_PACKAGE", "branch");
    }

    fn load(jail: &Jail, env_file: Option<&str>) -> Result<Settings, ConfigError> {
        let env_file = env_file.map(|f| jail.directory().join(f));
        load_settings(
            Some(&jail.directory().join("config.toml")),
            env_file.as_deref(),
        )
    }

    #[test]
    fn env_overrides_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    ip = "fmg.lab"
                    adom = "lab"
                    timeout = 5
                "#,
            )?;
            set_required(jail);
            jail.set_env("FMGR_ADOM", "prod");

            let settings = load(jail, None).unwrap();
            assert_eq!(settings.ip.as_deref(), Some("10.0.0.5"));
            assert_eq!(settings.adom.as_deref(), Some("prod"));
            assert_eq!(settings.timeout, 5);
            assert!(!settings.verify_ssl);
            Ok(())
        });
    }

    #[test]
    fn reports_every_missing_variable() {
        Jail::expect_with(|jail| {
            jail.set_env("FMGR_USERNAME", "admin");
            jail.set_env("FMGR_ADOM", "  ");

            let err = load(jail, None).unwrap().into_manager_config().unwrap_err();
            assert_eq!(
                err.to_string(),
                "Missing required environment variables: FMGR_IP, FMGR_PASSWORD, FMGR_ADOM, FMGR_PACKAGE"
            );
            Ok(())
        });
    }

    #[test]
    fn env_file_fills_gaps_but_process_env_wins() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "site.env",
                "FMGR_IP=192.0.2.10\nFMGR_USERNAME=from-file\nFMGR_PASSWORD=1234\nFMGR_ADOM=root\nFMGR_PACKAGE=default\nOTHER=ignored\n",
            )?;
            jail.set_env("FMGR_USERNAME", "from-env");

            let config = load(jail, Some("site.env"))
                .unwrap()
                .into_manager_config()
                .unwrap();
            assert_eq!(config.url.as_str(), "https://192.0.2.10/");
            assert_eq!(config.username, "from-env");
            assert_eq!(config.password.expose_secret(), "1234");
            assert_eq!(config.scope, Scope::new("root", "default"));
            Ok(())
        });
    }

    #[test]
    fn implicit_dotenv_is_read_from_working_directory() {
        Jail::expect_with(|jail| {
            jail.create_file(".env", "FMGR_PACKAGE=from-dotenv\n")?;
            let settings = load(jail, None).unwrap();
            assert_eq!(settings.package.as_deref(), Some("from-dotenv"));
            Ok(())
        });
    }

    #[test]
    fn explicit_env_file_must_exist() {
        Jail::expect_with(|jail| {
            let err = load(jail, Some("missing.env")).unwrap_err();
            assert!(matches!(err, ConfigError::EnvFileNotFound(_)));
            assert!(err.to_string().starts_with("Environment file not found"));
            Ok(())
        });
    }

    #[test]
    fn numeric_password_from_env_stays_text() {
        Jail::expect_with(|jail| {
            set_required(jail);
            jail.set_env("FMGR_PASSWORD", "20240101");
            let config = load(jail, None).unwrap().into_manager_config().unwrap();
            assert_eq!(config.password.expose_secret(), "20240101");
            Ok(())
        });
    }

    #[test]
    fn env_values_are_never_reparsed() {
        Jail::expect_with(|jail| {
            set_required(jail);
            jail.set_env("FMGR_PASSWORD", "007");
            jail.set_env("FMGR_ADOM", "001");
            jail.set_env("FMGR_PACKAGE", "[x]");
            jail.set_env("FMGR_USERNAME", "1.50");
            let config = load(jail, None).unwrap().into_manager_config().unwrap();
            assert_eq!(config.password.expose_secret(), "007");
            assert_eq!(config.scope, Scope::new("001", "[x]"));
            assert_eq!(config.username, "1.50");
            Ok(())
        });
    }

    #[test]
    fn env_timeout_and_verify_flag_are_parsed_from_text() {
        Jail::expect_with(|jail| {
            set_required(jail);
            jail.set_env("FMGR_TIMEOUT", "12");
            jail.set_env("FMGR_VERIFY_SSL", "1");
            let settings = load(jail, None).unwrap();
            assert_eq!(settings.timeout, 12);
            assert!(settings.verify_ssl);

            jail.set_env("FMGR_VERIFY_SSL", "maybe");
            assert!(matches!(load(jail, None), Err(ConfigError::Figment(_))));
            Ok(())
        });
    }

    #[test]
    fn tls_mode_follows_verify_flag_and_ca() {
        Jail::expect_with(|jail| {
            set_required(jail);
            let config = load(jail, None).unwrap().into_manager_config().unwrap();
            assert_eq!(config.tls, TlsVerification::DangerAcceptInvalid);

            jail.set_env("FMGR_VERIFY_SSL", "yes");
            let config = load(jail, None).unwrap().into_manager_config().unwrap();
            assert_eq!(config.tls, TlsVerification::SystemDefaults);

            jail.set_env("FMGR_CA_CERT", "/etc/ssl/fmg.pem");
            let config = load(jail, None).unwrap().into_manager_config().unwrap();
            assert_eq!(
                config.tls,
                TlsVerification::CustomCa(PathBuf::from("/etc/ssl/fmg.pem"))
            );
            Ok(())
        });
    }

    #[test]
    fn explicit_scheme_is_kept_and_bad_address_rejected() {
        Jail::expect_with(|jail| {
            set_required(jail);
            jail.set_env("FMGR_IP", "http://fmg.lab:8080");
            let config = load(jail, None).unwrap().into_manager_config().unwrap();
            assert_eq!(config.url.as_str(), "http://fmg.lab:8080/");

            jail.set_env("FMGR_IP", "bad host name");
            let err = load(jail, None).unwrap().into_manager_config().unwrap_err();
            assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "ip"));
            Ok(())
        });
    }

    #[test]
    fn redacted_masks_password() {
        Jail::expect_with(|jail| {
            set_required(jail);
            let view = load(jail, None).unwrap().redacted();
            assert!(view.contains("password=********"));
            assert!(!view.contains("s3cret"));
            assert!(view.contains("ip=10.0.0.5"));
            Ok(())
        });
    }
}
