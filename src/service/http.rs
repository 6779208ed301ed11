//! `reqwest`-backed implementation of [`AuthApi`].

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Response;

use super::AuthApi;
use crate::config::AuthFlowConfig;
use crate::error::{status_line_message, AuthFlowError};
use crate::types::AuthData;

/// Auth backend client speaking JSON over HTTP.
///
/// # Example
/// ```no_run
/// use auth_effects::config::AuthFlowConfig;
/// use auth_effects::service::HttpAuthApi;
///
/// let api = HttpAuthApi::new(&AuthFlowConfig::new("https://api.example.com"))?;
/// # Ok::<(), auth_effects::error::AuthFlowError>(())
/// ```
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: reqwest::Client,
    register_url: String,
    login_url: String,
    logout_url: String,
}

impl HttpAuthApi {
    pub fn new(config: &AuthFlowConfig) -> Result<Self, AuthFlowError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .default_headers(default_headers())
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Use a caller-supplied client; its timeout and headers are left as is.
    pub fn with_client(client: reqwest::Client, config: &AuthFlowConfig) -> Self {
        Self {
            client,
            register_url: config.register_url(),
            login_url: config.login_url(),
            logout_url: config.logout_url(),
        }
    }

    pub fn with_register_url(mut self, url: impl Into<String>) -> Self {
        self.register_url = url.into();
        self
    }

    pub fn with_login_url(mut self, url: impl Into<String>) -> Self {
        self.login_url = url.into();
        self
    }

    pub fn with_logout_url(mut self, url: impl Into<String>) -> Self {
        self.logout_url = url.into();
        self
    }

    async fn post_credentials(&self, url: &str, auth_data: &AuthData) -> Result<(), AuthFlowError> {
        tracing::debug!(url, email = %auth_data.email, "auth request");
        let resp = self.client.post(url).json(auth_data).send().await?;
        check_status(url, resp).await
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn register(&self, auth_data: &AuthData) -> Result<(), AuthFlowError> {
        self.post_credentials(&self.register_url, auth_data).await
    }

    async fn login(&self, auth_data: &AuthData) -> Result<(), AuthFlowError> {
        self.post_credentials(&self.login_url, auth_data).await
    }

    async fn logout(&self) -> Result<(), AuthFlowError> {
        tracing::debug!(url = %self.logout_url, "logout request");
        let resp = self.client.post(&self.logout_url).send().await?;
        check_status(&self.logout_url, resp).await
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

async fn check_status(url: &str, resp: Response) -> Result<(), AuthFlowError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    Err(
        AuthFlowError::http(status.as_u16(), status_line_message(Some(url), status))
            .with_detail(extract_error_message(&body)),
    )
}

/// Pull a human-readable message out of a JSON error body for logging.
///
/// Accepts `{"message": "..."}`, `{"message": ["...", ...]}` (first entry)
/// and `{"error": "..."}`.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let field = value.get("message").or_else(|| value.get("error"))?;
    let text = match field {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items.first()?.as_str()?.to_string(),
        _ => return None,
    };
    (!text.trim().is_empty()).then_some(text)
}
