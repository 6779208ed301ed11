//! Backend calls the auth effects depend on.

pub mod http;

pub use http::HttpAuthApi;

use async_trait::async_trait;

use crate::error::AuthFlowError;
use crate::types::AuthData;

/// The auth backend as seen by the effects.
///
/// Success carries no payload: the effects only care whether the call
/// succeeded and, if not, the error's message.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn register(&self, auth_data: &AuthData) -> Result<(), AuthFlowError>;

    async fn login(&self, auth_data: &AuthData) -> Result<(), AuthFlowError>;

    async fn logout(&self) -> Result<(), AuthFlowError>;
}
