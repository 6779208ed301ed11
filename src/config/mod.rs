//! Configuration system (layered: defaults < config file < env).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AuthFlowError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_REDIRECT_URL: &str = "/";
pub const DEFAULT_LOGOUT_MESSAGE: &str = "You have been logged out";

const ENV_PREFIX: &str = "AUTH_EFFECTS_";

/// Settings shared by the HTTP auth service and the effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthFlowConfig {
    /// Backend root, without a trailing slash.
    pub base_url: String,
    pub register_path: String,
    pub login_path: String,
    pub logout_path: String,
    /// Where the navigation effects send the user.
    pub redirect_url: String,
    /// Info notification text shown after logout.
    pub logout_message: String,
    pub request_timeout_secs: u64,
}

impl Default for AuthFlowConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            register_path: "/users".to_string(),
            login_path: "/users/login".to_string(),
            logout_path: "/users/logout".to_string(),
            redirect_url: DEFAULT_REDIRECT_URL.to_string(),
            logout_message: DEFAULT_LOGOUT_MESSAGE.to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl AuthFlowConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Defaults overlaid with `AUTH_EFFECTS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::default().with_env_overrides()
    }

    /// Full resolution: defaults, then the default config file when it
    /// exists, then environment variables.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let path = Self::default_path();
        let base = if path.exists() {
            tracing::debug!(path = %path.display(), "loading auth-effects config file");
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        base.with_env_overrides()
    }

    /// `~/.auth-effects/config.toml`, or a relative fallback when no home
    /// directory can be resolved.
    pub fn default_path() -> PathBuf {
        directories::UserDirs::new()
            .map(|dirs| dirs.home_dir().join(".auth-effects"))
            .unwrap_or_else(|| PathBuf::from(".auth-effects"))
            .join("config.toml")
    }

    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())
    }

    /// Apply overrides from an arbitrary key lookup (keys without prefix).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let string_fields: [(&str, &mut String); 6] = [
            ("BASE_URL", &mut self.base_url),
            ("REGISTER_PATH", &mut self.register_path),
            ("LOGIN_PATH", &mut self.login_path),
            ("LOGOUT_PATH", &mut self.logout_path),
            ("REDIRECT_URL", &mut self.redirect_url),
            ("LOGOUT_MESSAGE", &mut self.logout_message),
        ];
        for (key, field) in string_fields {
            if let Some(value) = lookup(key) {
                *field = value;
            }
        }

        if let Some(raw) = lookup("TIMEOUT_SECS") {
            self.request_timeout_secs = raw.trim().parse().map_err(|_| {
                AuthFlowError::Configuration(format!(
                    "{ENV_PREFIX}TIMEOUT_SECS must be a whole number of seconds, got {raw:?}"
                ))
            })?;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(AuthFlowError::Configuration(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if self.redirect_url.trim().is_empty() {
            return Err(AuthFlowError::Configuration(
                "redirect_url must not be empty".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(AuthFlowError::Configuration(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn register_url(&self) -> String {
        self.endpoint(&self.register_path)
    }

    pub fn login_url(&self) -> String {
        self.endpoint(&self.login_path)
    }

    pub fn logout_url(&self) -> String {
        self.endpoint(&self.logout_path)
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
