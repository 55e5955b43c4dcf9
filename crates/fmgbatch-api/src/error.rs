use thiserror::Error;

/// Top-level error type for the `fmgbatch-api` crate.
///
/// Covers every failure mode of the JSON-RPC surface: authentication,
/// transport, remote status codes, and envelope decoding.
/// `fmgbatch-core` maps these into its own taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected, or the login request itself could not be delivered.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Non-2xx HTTP status from the `/jsonrpc` endpoint.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── JSON-RPC ────────────────────────────────────────────────────
    /// The appliance answered with a non-zero `status.code`.
    #[error("API request failed for {url} (code {code}): {message}")]
    Api {
        code: i64,
        message: String,
        url: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}
