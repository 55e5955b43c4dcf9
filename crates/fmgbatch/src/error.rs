//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a process exit code.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use fmgbatch_config::ConfigError;
use fmgbatch_core::{CoreError, FileError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    /// `EX_CONFIG` from sysexits.h.
    pub const CONFIG: i32 = 78;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(fmgbatch::auth_failed),
        help(
            "Check FMGR_USERNAME and FMGR_PASSWORD, and that the account has \
             JSON-RPC API access enabled on the FortiManager."
        )
    )]
    AuthFailed { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API request failed: {message}")]
    #[diagnostic(
        code(fmgbatch::api_error),
        help("Check FMGR_IP, FMGR_ADOM and FMGR_PACKAGE, and that the appliance is reachable.")
    )]
    Api { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Missing required environment variables: {missing}")]
    #[diagnostic(
        code(fmgbatch::missing_settings),
        help(
            "Set them in the environment, in a .env file (see --env-file), \
             or in the config file at {config_path}"
        )
    )]
    MissingSettings { missing: String, config_path: String },

    #[error("Environment file not found: {}", .path.display())]
    #[diagnostic(code(fmgbatch::env_file_not_found))]
    EnvFileNotFound { path: PathBuf },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(fmgbatch::config))]
    Config { message: String },

    // ── Policy files ─────────────────────────────────────────────────
    #[error("Directory not found: {}", .path.display())]
    #[diagnostic(
        code(fmgbatch::directory_not_found),
        help("Run `fmgbatch download` first, or point at the right directory.")
    )]
    DirectoryNotFound { path: PathBuf },

    #[error("{message}")]
    #[diagnostic(code(fmgbatch::policy_file))]
    PolicyFile { message: String },

    #[error("No {kind} policies found in {}", .path.display())]
    #[diagnostic(code(fmgbatch::no_policies))]
    NoPolicies { kind: &'static str, path: PathBuf },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Applying changes requires confirmation")]
    #[diagnostic(
        code(fmgbatch::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes,

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Api { .. } => exit_code::CONNECTION,
            Self::MissingSettings { .. } | Self::EnvFileNotFound { .. } | Self::Config { .. } => {
                exit_code::CONFIG
            }
            Self::DirectoryNotFound { .. } | Self::PolicyFile { .. } => exit_code::NOT_FOUND,
            Self::NonInteractiveRequiresYes => exit_code::USAGE,
            Self::NoPolicies { .. } | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Authentication { message } => Self::AuthFailed { message },
            CoreError::Api { message, code } => Self::Api {
                message: match code {
                    Some(code) => format!("{message} [code {code}]"),
                    None => message,
                },
            },
            CoreError::Config { message } => Self::Config { message },
            CoreError::File(err) => err.into(),
        }
    }
}

impl From<FileError> for CliError {
    fn from(err: FileError) -> Self {
        match err {
            FileError::NotFound { path } => Self::DirectoryNotFound { path },
            other => Self::PolicyFile {
                message: other.to_string(),
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Missing { missing } => Self::MissingSettings {
                missing: missing.join(", "),
                config_path: fmgbatch_config::config_path().display().to_string(),
            },
            ConfigError::EnvFileNotFound(path) => Self::EnvFileNotFound { path },
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}
