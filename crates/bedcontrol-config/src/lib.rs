//! Configuration for the bedcontrol daemon.
//!
//! A flat TOML file merged with `BEDCONTROL_*` environment variables,
//! credential resolution (env + keyring + plaintext), and translation to
//! `bedcontrol_core::PlatformConfig` and the HTTP transport settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bedcontrol_api::{Credentials, DEFAULT_BASE_URL, TransportConfig};
use bedcontrol_core::PlatformConfig;
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Keyring service name; the account is the configured email.
pub const KEYRING_SERVICE: &str = "bedcontrol";

/// Environment variable prefix for every config key.
pub const ENV_PREFIX: &str = "BEDCONTROL_";

const PASSWORD_ENV: &str = "BEDCONTROL_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for {email}")]
    NoCredentials { email: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// Everything the daemon reads from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// SleepIQ account email.
    pub email: Option<String>,

    /// Account password (plaintext; prefer the env var or keyring).
    pub password: Option<String>,

    /// Seconds between polls. 0 disables polling.
    #[serde(default)]
    pub update_interval: u64,

    /// Seconds a slider write waits before it is sent.
    #[serde(default = "default_delay")]
    pub delay: u64,

    /// Vendor platform label, informational only.
    pub bed_platform: Option<String>,

    /// Exclusion entries: `bedId`, `bedId.leftSide`, `bedId.privacy`,
    /// `bedId.rightSide.outlet`, ...
    #[serde(default)]
    pub ignore: Vec<String>,

    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// API base URL override (testing against a proxy or mock).
    pub base_url: Option<String>,

    /// Extra CA certificate to trust.
    pub ca_cert: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            email: None,
            password: None,
            update_interval: 0,
            delay: default_delay(),
            bed_platform: None,
            ignore: Vec::new(),
            timeout: default_timeout(),
            base_url: None,
            ca_cert: None,
        }
    }
}

fn default_delay() -> u64 {
    bedcontrol_core::config::DEFAULT_SEND_DELAY_SECS
}
fn default_timeout() -> u64 {
    30
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "bedcontrol", "bedcontrol").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("bedcontrol");
    p
}

// ── Loading ─────────────────────────────────────────────────────────

fn file_figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
}

/// Load `path` (or the default location) merged with `BEDCONTROL_*`
/// environment variables. A missing file yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    let config: Config = file_figment(&path)
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()?;
    Ok(config)
}

/// Load only the file and defaults, ignoring the environment.
pub fn load_file(path: &Path) -> Result<Config, ConfigError> {
    Ok(file_figment(path).extract()?)
}

impl Config {
    /// Check the values the daemon cannot run without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.email.as_deref().is_none_or(|e| e.trim().is_empty()) {
            return Err(ConfigError::Validation {
                field: "email".into(),
                reason: "an account email is required".into(),
            });
        }
        if self.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        self.base_url()?;
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let raw = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        raw.parse().map_err(|_| ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("invalid URL: {raw}"),
        })
    }

    /// Resolve account credentials: `BEDCONTROL_PASSWORD`, then the
    /// system keyring, then the plaintext `password` key.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        self.validate()?;
        let email = self.email.clone().unwrap_or_default();
        let password = resolve_password(
            &email,
            self.password.as_deref(),
            std::env::var(PASSWORD_ENV).ok(),
            keyring_password,
        )?;
        Ok(Credentials::new(email, password))
    }

    /// Settings for discovery, polling and write debouncing.
    pub fn to_platform_config(&self) -> PlatformConfig {
        PlatformConfig {
            update_interval_secs: self.update_interval,
            send_delay_secs: self.delay,
            bed_platform: self.bed_platform.clone().filter(|p| !p.is_empty()),
            ignore: self.ignore.clone(),
        }
    }

    pub fn to_transport(&self) -> TransportConfig {
        let mut transport = TransportConfig::default()
            .with_timeout(Duration::from_secs(self.timeout))
            .with_cookie_jar();
        if let Some(ref ca) = self.ca_cert {
            transport.tls = bedcontrol_api::TlsMode::CustomCa(ca.clone());
        }
        transport
    }

    /// The effective config as TOML, with the password masked.
    pub fn to_toml_redacted(&self) -> Result<String, ConfigError> {
        let mut shown = self.clone();
        if shown.password.is_some() {
            shown.password = Some("********".into());
        }
        Ok(toml::to_string_pretty(&shown)?)
    }
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_password(email: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, email)
        .ok()
        .and_then(|entry| entry.get_password().ok())
}

fn resolve_password(
    email: &str,
    plaintext: Option<&str>,
    from_env: Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Env var
    if let Some(pw) = from_env.filter(|pw| !pw.is_empty()) {
        return Ok(SecretString::from(pw));
    }

    // 2. Keyring
    if let Some(pw) = keyring(email) {
        return Ok(SecretString::from(pw));
    }

    // 3. Plaintext in config
    if let Some(pw) = plaintext.filter(|pw| !pw.is_empty()) {
        return Ok(SecretString::from(pw.to_owned()));
    }

    Err(ConfigError::NoCredentials {
        email: email.into(),
    })
}
