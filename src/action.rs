//! Actions flowing through the auth effect stream.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumDiscriminants, EnumString, IntoStaticStr};

use crate::types::{AuthData, AuthRequest, AuthResult, SpinnerName};

/// Every action the auth effects consume or produce.
///
/// [`ActionKind`] is the payload-free discriminant used to filter the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumDiscriminants)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum_discriminants(name(ActionKind))]
#[strum_discriminants(derive(Hash, Display, EnumString, IntoStaticStr))]
#[strum_discriminants(strum(serialize_all = "snake_case"))]
pub enum AuthAction {
    Register {
        auth_data: AuthData,
        spinner_name: SpinnerName,
    },
    RegisterSuccess,
    RegisterFailure {
        message: String,
    },
    Login {
        auth_data: AuthData,
        spinner_name: SpinnerName,
    },
    LoginSuccess,
    LoginFailure {
        message: String,
    },
    Logout,
    ClearUser,
}

impl AuthAction {
    pub fn register(auth_data: AuthData, spinner_name: impl Into<SpinnerName>) -> Self {
        Self::Register {
            auth_data,
            spinner_name: spinner_name.into(),
        }
    }

    pub fn login(auth_data: AuthData, spinner_name: impl Into<SpinnerName>) -> Self {
        Self::Login {
            auth_data,
            spinner_name: spinner_name.into(),
        }
    }

    pub fn kind(&self) -> ActionKind {
        ActionKind::from(self)
    }

    /// The credential payload of a `Register` or `Login` action.
    pub fn auth_request(&self) -> Option<AuthRequest> {
        match self {
            Self::Register {
                auth_data,
                spinner_name,
            }
            | Self::Login {
                auth_data,
                spinner_name,
            } => Some(AuthRequest::new(auth_data.clone(), spinner_name.clone())),
            _ => None,
        }
    }

    /// Map a register call outcome to its follow-up action.
    pub fn from_register_result(result: AuthResult) -> Self {
        match result {
            AuthResult::Success => Self::RegisterSuccess,
            AuthResult::Failure { message } => Self::RegisterFailure { message },
        }
    }

    /// Map a login call outcome to its follow-up action.
    pub fn from_login_result(result: AuthResult) -> Self {
        match result {
            AuthResult::Success => Self::LoginSuccess,
            AuthResult::Failure { message } => Self::LoginFailure { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_are_snake_case() {
        assert_eq!(AuthAction::LoginSuccess.kind().to_string(), "login_success");
        let name: &'static str = AuthAction::ClearUser.kind().into();
        assert_eq!(name, "clear_user");
        assert_eq!("register_failure".parse::<ActionKind>().unwrap(), ActionKind::RegisterFailure);
    }

    #[test]
    fn serde_uses_type_tag() {
        let action = AuthAction::LoginFailure {
            message: "bad password".into(),
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "login_failure", "message": "bad password" })
        );

        let back: AuthAction = serde_json::from_value(json).unwrap();
        assert_eq!(back, action);
    }

    #[test]
    fn auth_request_only_for_credential_actions() {
        let action = AuthAction::login(AuthData::new("a@b.c", "pw"), "login-form");
        let request = action.auth_request().unwrap();
        assert_eq!(request.spinner_name.as_str(), "login-form");
        assert!(AuthAction::Logout.auth_request().is_none());
    }

    #[test]
    fn results_map_to_matching_follow_ups() {
        assert_eq!(
            AuthAction::from_register_result(AuthResult::Success),
            AuthAction::RegisterSuccess
        );
        assert_eq!(
            AuthAction::from_login_result(AuthResult::Failure {
                message: "locked".into()
            }),
            AuthAction::LoginFailure {
                message: "locked".into()
            }
        );
    }
}
