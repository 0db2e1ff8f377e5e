use thiserror::Error;

/// Top-level error type for the `bedcontrol-api` crate.
///
/// Distinguishes the three failure classes callers branch on: an expired
/// session ([`Authentication`](Self::Authentication)), hardware the bed does
/// not have ([`NotFound`](Self::NotFound)), and everything else.
/// `bedcontrol-core` maps these into retry, probe, and circuit-breaker
/// decisions.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected, or the session key/cookie expired (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// A request was made before any successful login.
    #[error("Not logged in -- call login() first")]
    NotLoggedIn,

    // ── Resources ───────────────────────────────────────────────────
    /// The endpoint does not exist for this bed (HTTP 404). Used by
    /// discovery to detect optional hardware such as a foundation.
    #[error("Resource not found: {path}")]
    NotFound { path: String },

    /// Any other non-success HTTP status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates the session has expired
    /// and a fresh login might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::NotLoggedIn)
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } | Self::Api { status: 404, .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }

    /// HTTP status associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { .. } => Some(401),
            Self::NotFound { .. } => Some(404),
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
