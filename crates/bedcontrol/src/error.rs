//! CLI error types with miette diagnostics.
//!
//! Maps config, core and transport errors into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use bedcontrol_config::ConfigError;
use bedcontrol_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Authentication ───────────────────────────────────────────────
    #[error("SleepIQ rejected the login for {email}")]
    #[diagnostic(
        code(bedcontrol::auth_failed),
        help("Check the email and password used for the SleepIQ app.")
    )]
    AuthFailed { email: String },

    #[error("No password configured for {email}")]
    #[diagnostic(
        code(bedcontrol::no_credentials),
        help(
            "Set BEDCONTROL_PASSWORD, store it in the system keyring under \
             service 'bedcontrol', or add `password` to the config file."
        )
    )]
    NoCredentials { email: String },

    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the SleepIQ API: {message}")]
    #[diagnostic(
        code(bedcontrol::connection_failed),
        help("Check network access to the SleepIQ service and try again.")
    )]
    ConnectionFailed { message: String },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(bedcontrol::tls_error),
        help("Check the ca_cert path in your config file.")
    )]
    TlsError { message: String },

    #[error("Bed discovery failed: {message}")]
    #[diagnostic(code(bedcontrol::discovery))]
    Discovery { message: String },

    // ── Validation / configuration ───────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(bedcontrol::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(bedcontrol::config))]
    Config(Box<figment::Error>),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::Validation { .. } | Self::Config(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials { email } => Self::NoCredentials { email },
            ConfigError::Figment(err) => Self::Config(err),
            ConfigError::Serialization(err) => Self::Validation {
                field: "config".into(),
                reason: err.to_string(),
            },
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Discovery { message } => Self::Discovery { message },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            other @ (CoreError::Api { .. } | CoreError::ApiDisabled | CoreError::NotFound { .. }) => {
                Self::ConnectionFailed {
                    message: other.to_string(),
                }
            }
        }
    }
}

impl From<bedcontrol_api::Error> for CliError {
    fn from(err: bedcontrol_api::Error) -> Self {
        match err {
            bedcontrol_api::Error::Tls(message) => Self::TlsError { message },
            other => Self::ConnectionFailed {
                message: other.to_string(),
            },
        }
    }
}
