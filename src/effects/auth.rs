//! The register, login, redirect and logout effects.

use async_trait::async_trait;

use super::{Concurrency, Effect};
use crate::action::{ActionKind, AuthAction};
use crate::context::EffectContext;
use crate::error::AuthFlowError;
use crate::progress::ProgressGuard;
use crate::types::{AuthRequest, AuthResult};

/// `Register` → backend register call → `RegisterSuccess` / `RegisterFailure`.
pub struct RegisterEffect {
    ctx: EffectContext,
}

impl RegisterEffect {
    pub fn new(ctx: EffectContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Effect for RegisterEffect {
    fn name(&self) -> &'static str {
        "register"
    }

    fn trigger(&self) -> ActionKind {
        ActionKind::Register
    }

    fn concurrency(&self) -> Concurrency {
        Concurrency::SwitchToLatest
    }

    async fn run(&self, action: AuthAction) -> Option<AuthAction> {
        let request = credentials_of(self.name(), &action)?;
        let result = {
            let _spinner = ProgressGuard::begin(self.ctx.progress.clone(), request.spinner_name);
            self.ctx.api.register(&request.auth_data).await
        };
        Some(AuthAction::from_register_result(into_result(
            self.name(),
            result,
        )))
    }
}

/// `Login` → backend login call → `LoginSuccess` / `LoginFailure`.
pub struct LoginEffect {
    ctx: EffectContext,
}

impl LoginEffect {
    pub fn new(ctx: EffectContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Effect for LoginEffect {
    fn name(&self) -> &'static str {
        "login"
    }

    fn trigger(&self) -> ActionKind {
        ActionKind::Login
    }

    fn concurrency(&self) -> Concurrency {
        Concurrency::SwitchToLatest
    }

    async fn run(&self, action: AuthAction) -> Option<AuthAction> {
        let request = credentials_of(self.name(), &action)?;
        let result = {
            let _spinner = ProgressGuard::begin(self.ctx.progress.clone(), request.spinner_name);
            self.ctx.api.login(&request.auth_data).await
        };
        Some(AuthAction::from_login_result(into_result(self.name(), result)))
    }
}

/// Navigates to the redirect URL whenever its trigger fires. Dispatches nothing.
pub struct RedirectEffect {
    name: &'static str,
    trigger: ActionKind,
    ctx: EffectContext,
}

impl RedirectEffect {
    pub fn after_login(ctx: EffectContext) -> Self {
        Self {
            name: "redirect_after_login",
            trigger: ActionKind::LoginSuccess,
            ctx,
        }
    }

    pub fn after_register(ctx: EffectContext) -> Self {
        Self {
            name: "redirect_after_register",
            trigger: ActionKind::RegisterSuccess,
            ctx,
        }
    }

    pub fn after_clear_user(ctx: EffectContext) -> Self {
        Self {
            name: "redirect_after_clear_user",
            trigger: ActionKind::ClearUser,
            ctx,
        }
    }
}

#[async_trait]
impl Effect for RedirectEffect {
    fn name(&self) -> &'static str {
        self.name
    }

    fn trigger(&self) -> ActionKind {
        self.trigger
    }

    fn concurrency(&self) -> Concurrency {
        Concurrency::Merge
    }

    async fn run(&self, _action: AuthAction) -> Option<AuthAction> {
        // Fire-and-forget: a failed navigation is not reported anywhere.
        if let Err(e) = self.ctx.navigator.navigate_by_url(&self.ctx.redirect_url).await {
            tracing::debug!(effect = self.name, error = %e, "navigation failed");
        }
        None
    }
}

/// `Logout` → backend logout call → info notification. Dispatches nothing.
pub struct LogoutEffect {
    ctx: EffectContext,
}

impl LogoutEffect {
    pub fn new(ctx: EffectContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Effect for LogoutEffect {
    fn name(&self) -> &'static str {
        "logout"
    }

    fn trigger(&self) -> ActionKind {
        ActionKind::Logout
    }

    fn concurrency(&self) -> Concurrency {
        Concurrency::SwitchToLatest
    }

    async fn run(&self, _action: AuthAction) -> Option<AuthAction> {
        // The user is told they are logged out whatever the backend said.
        if let Err(e) = self.ctx.api.logout().await {
            tracing::warn!(effect = self.name(), error = %e, "logout request failed");
        }
        self.ctx.notifier.info(&self.ctx.logout_message);
        None
    }
}

fn credentials_of(effect: &'static str, action: &AuthAction) -> Option<AuthRequest> {
    let request = action.auth_request();
    if request.is_none() {
        tracing::debug!(effect, action = %action.kind(), "action carries no credentials");
    }
    request
}

fn into_result(effect: &'static str, result: Result<(), AuthFlowError>) -> AuthResult {
    if let Err(e) = &result {
        if e.is_client_error() {
            tracing::debug!(effect, error = %e, detail = e.detail(), "request rejected");
        } else {
            tracing::warn!(effect, error = %e, detail = e.detail(), "request failed");
        }
    }
    AuthResult::from(result)
}
