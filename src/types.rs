//! Request and result payloads carried by auth actions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AuthFlowError;

/// Credentials submitted from a login or registration form.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthData {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl AuthData {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            username: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

impl fmt::Debug for AuthData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthData")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("username", &self.username)
            .finish()
    }
}

/// Name of a UI progress indicator (spinner) shown while a call is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpinnerName(String);

impl SpinnerName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpinnerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SpinnerName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for SpinnerName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// A credential payload paired with the spinner it drives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRequest {
    pub auth_data: AuthData,
    pub spinner_name: SpinnerName,
}

impl AuthRequest {
    pub fn new(auth_data: AuthData, spinner_name: impl Into<SpinnerName>) -> Self {
        Self {
            auth_data,
            spinner_name: spinner_name.into(),
        }
    }
}

/// Outcome of a register or login call, consumed once to pick the follow-up action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    Success,
    Failure { message: String },
}

impl AuthResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl<T> From<Result<T, AuthFlowError>> for AuthResult {
    fn from(result: Result<T, AuthFlowError>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(e) => Self::Failure {
                message: e.message(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_data_debug_redacts_password() {
        let data = AuthData::new("jo@example.com", "hunter2");
        let rendered = format!("{data:?}");
        assert!(rendered.contains("jo@example.com"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn auth_data_omits_missing_username() {
        let json = serde_json::to_value(AuthData::new("a@b.c", "pw")).unwrap();
        assert_eq!(json, serde_json::json!({ "email": "a@b.c", "password": "pw" }));

        let json =
            serde_json::to_value(AuthData::new("a@b.c", "pw").with_username("jo")).unwrap();
        assert_eq!(json["username"], "jo");
    }

    #[test]
    fn auth_result_from_error_keeps_raw_message() {
        let result: AuthResult =
            Err::<(), _>(AuthFlowError::http(401, "invalid credentials")).into();
        assert_eq!(
            result,
            AuthResult::Failure {
                message: "invalid credentials".to_string()
            }
        );
        assert!(AuthResult::from(Ok::<(), AuthFlowError>(())).is_success());
    }
}
