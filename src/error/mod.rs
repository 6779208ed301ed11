//! Error types for auth-effects.

use thiserror::Error;

/// Primary error type for all auth-effects operations.
#[derive(Error, Debug)]
pub enum AuthFlowError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A non-2xx response from the auth backend.
    ///
    /// `detail` holds whatever message the response body carried. It is kept
    /// for logs only; failure actions surface `message`.
    #[error("HTTP error (status {status}): {message}")]
    Http {
        status: u16,
        message: String,
        detail: Option<String>,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl AuthFlowError {
    /// Create an HTTP error from a status code and message.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            detail: None,
        }
    }

    /// Attach the message found in the response body.
    pub fn with_detail(self, detail: Option<String>) -> Self {
        match self {
            Self::Http {
                status, message, ..
            } => Self::Http {
                status,
                message,
                detail,
            },
            other => other,
        }
    }

    /// The human-readable text surfaced to the UI in failure actions.
    ///
    /// Backend and transport failures read the way a browser HTTP client
    /// reports them: `Http failure response for <url>: <status> <reason>`,
    /// with status `0 Unknown Error` when no response arrived.
    pub fn message(&self) -> String {
        match self {
            Self::Http { message, .. } => message.clone(),
            Self::Configuration(msg) | Self::Navigation(msg) | Self::InvalidState(msg) => {
                msg.clone()
            }
            Self::Network(e) => match e.status() {
                Some(status) => status_line_message(e.url().map(|u| u.as_str()), status),
                None => format!(
                    "Http failure response for {}: 0 Unknown Error",
                    e.url().map_or(UNKNOWN_URL, |u| u.as_str())
                ),
            },
            Self::Io(e) => e.to_string(),
            Self::Toml(e) => e.to_string(),
        }
    }

    /// Message taken from the backend's error body, if it sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Http { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// HTTP status, when the error came from a backend response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the backend rejected the request itself (4xx).
    ///
    /// Only used to pick a log level; failure actions are emitted the same
    /// way for every error.
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }
}

const UNKNOWN_URL: &str = "(unknown url)";

/// `Http failure response for <url>: <code> <reason>`.
pub fn status_line_message(url: Option<&str>, status: reqwest::StatusCode) -> String {
    format!(
        "Http failure response for {}: {} {}",
        url.unwrap_or(UNKNOWN_URL),
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown Error")
    )
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AuthFlowError>;
