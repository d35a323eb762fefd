//! Client configuration resolved from flags, environment, and `.env`.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Lab server base URL.
pub const HOST_ENV: &str = "EVE_HOST";
/// Lab server user name.
pub const USER_ENV: &str = "EVE_USER";
/// Lab server password.
pub const PASSWORD_ENV: &str = "EVE_PASSWORD";
/// Location of the link state file.
pub const STATE_ENV: &str = "LABSYNC_STATE";
/// Directory to record cassettes into.
pub const RECORD_ENV: &str = "LABSYNC_RECORD";
/// Directory to replay cassettes from.
pub const REPLAY_ENV: &str = "LABSYNC_REPLAY";
/// Log filter directives.
pub const LOG_ENV: &str = "LABSYNC_LOG";

/// State file used when neither `--state` nor `LABSYNC_STATE` is set.
pub const DEFAULT_STATE_PATH: &str = ".labsync/state.yaml";

/// A required setting was not provided anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing {field}: pass --{flag} or set {env}")]
pub struct ConfigError {
    /// Human-readable name of the setting.
    pub field: &'static str,
    /// Command-line flag that sets it.
    pub flag: &'static str,
    /// Environment variable that sets it.
    pub env: &'static str,
}

/// Values given explicitly on the command line; these win over the
/// environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// `--host`
    pub host: Option<String>,
    /// `--username`
    pub username: Option<String>,
    /// `--password`
    pub password: Option<String>,
}

/// Connection settings for the lab server.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL, always with a scheme and without a trailing slash.
    pub host: String,
    /// Login user.
    pub username: String,
    /// Login password.
    pub password: String,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl ClientConfig {
    /// Resolves every setting from `overrides` first, then `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first setting that is missing or
    /// empty.
    pub fn resolve(
        overrides: &ConfigOverrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let pick = |explicit: &Option<String>,
                    field: &'static str,
                    flag: &'static str,
                    env: &'static str| {
            explicit
                .clone()
                .or_else(|| lookup(env))
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError { field, flag, env })
        };

        let host = pick(&overrides.host, "lab server host", "host", HOST_ENV)?;
        let username = pick(&overrides.username, "user name", "username", USER_ENV)?;
        let password = pick(&overrides.password, "password", "password", PASSWORD_ENV)?;
        Ok(Self { host: normalize_host(&host), username, password })
    }

    /// Loads `.env` if present, then resolves against the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a setting is missing.
    pub fn from_env(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::resolve(overrides, |key| std::env::var(key).ok())
    }
}

fn normalize_host(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

/// State file location: the flag, then `LABSYNC_STATE`, then
/// [`DEFAULT_STATE_PATH`].
#[must_use]
pub fn state_path(flag: Option<&Path>, lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| lookup(STATE_ENV).filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_PATH))
}
