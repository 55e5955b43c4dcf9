// ── Core error types ──
//
// One enum is the common base for every failure the workflow can report:
// authentication, remote API, configuration and file problems. The
// `From<fmgbatch_api::Error>` impl folds transport-layer errors into it.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Credentials rejected, or the session could not be established.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The appliance reported a non-zero status, or a data call failed in transit.
    #[error("API request failed: {message}")]
    Api {
        message: String,
        /// Remote `status.code`, when the appliance answered at all.
        code: Option<i64>,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    File(#[from] FileError),
}

impl CoreError {
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }
}

/// Record-store failures. All of them abort the command.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("Directory not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Error loading policy file {}: {reason}", .file.display())]
    Malformed { file: PathBuf, reason: String },

    #[error("Error reading {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Error writing policy file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<fmgbatch_api::Error> for CoreError {
    fn from(err: fmgbatch_api::Error) -> Self {
        match err {
            fmgbatch_api::Error::Authentication { message } => Self::Authentication { message },
            fmgbatch_api::Error::Api { code, message, url } => Self::Api {
                message: format!("{message} ({url})"),
                code: Some(code),
            },
            fmgbatch_api::Error::Tls(message) => Self::Config { message },
            fmgbatch_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("invalid appliance URL: {e}"),
            },
            other @ (fmgbatch_api::Error::Transport(_)
            | fmgbatch_api::Error::Http { .. }
            | fmgbatch_api::Error::Deserialization { .. }) => Self::Api {
                message: other.to_string(),
                code: None,
            },
        }
    }
}
