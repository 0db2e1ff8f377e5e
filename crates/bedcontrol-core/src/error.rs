// ── Core error types ──
//
// Errors surfaced by bedcontrol-core. `CoreError` is `Clone` because a
// single coalesced fetch hands the same result to every waiter. The
// `From<bedcontrol_api::Error>` impl keeps HTTP details out of callers.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    // ── Capability absence ───────────────────────────────────────────
    /// The bed does not have this hardware (HTTP 404).
    #[error("Resource not found: {path}")]
    NotFound { path: String },

    // ── Circuit breaker ──────────────────────────────────────────────
    /// An earlier unrecoverable failure disabled all API calls.
    #[error("SleepIQ API calls are disabled after an unrecoverable error")]
    ApiDisabled,

    /// The call that tripped the circuit breaker.
    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    // ── Setup ────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Discovery failed: {message}")]
    Discovery { message: String },
}

impl CoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<bedcontrol_api::Error> for CoreError {
    fn from(err: bedcontrol_api::Error) -> Self {
        match err {
            bedcontrol_api::Error::NotFound { path } => CoreError::NotFound { path },
            ref e if e.is_not_found() => CoreError::NotFound {
                path: e.to_string(),
            },
            bedcontrol_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            other => CoreError::Api {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}

/// Error returned to the host from a characteristic get or set.
///
/// The host renders this as a device-specific "not responding" state
/// instead of showing a stale value.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum CharacteristicError {
    #[error("service communication failure")]
    ServiceCommunicationFailure,
    /// The bed does not expose this capability or characteristic.
    #[error("resource does not exist")]
    Unsupported,
}

impl From<CoreError> for CharacteristicError {
    fn from(_: CoreError) -> Self {
        Self::ServiceCommunicationFailure
    }
}
