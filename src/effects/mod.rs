//! Effects: handlers that react to one action kind.
//!
//! An effect receives each matching action, may await collaborators, and
//! returns at most one follow-up action for the runtime to dispatch.

pub mod auth;

pub use auth::{LoginEffect, LogoutEffect, RedirectEffect, RegisterEffect};

use std::sync::Arc;

use async_trait::async_trait;

use crate::action::{ActionKind, AuthAction};
use crate::context::EffectContext;

/// How an effect treats a new trigger while an earlier run is still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concurrency {
    /// Abort the pending run and drop its result; only the latest counts.
    SwitchToLatest,
    /// Every trigger runs to completion independently.
    Merge,
}

#[async_trait]
pub trait Effect: Send + Sync {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    /// The action kind this effect reacts to.
    fn trigger(&self) -> ActionKind;

    fn concurrency(&self) -> Concurrency;

    /// Handle one triggering action.
    ///
    /// Failures are mapped to actions or swallowed here; an effect never
    /// returns an error to the runtime.
    async fn run(&self, action: AuthAction) -> Option<AuthAction>;
}

/// Assemble the six auth effects around one context.
pub fn auth_effects(ctx: &EffectContext) -> Vec<Arc<dyn Effect>> {
    vec![
        Arc::new(RegisterEffect::new(ctx.clone())),
        Arc::new(LoginEffect::new(ctx.clone())),
        Arc::new(RedirectEffect::after_login(ctx.clone())),
        Arc::new(RedirectEffect::after_register(ctx.clone())),
        Arc::new(RedirectEffect::after_clear_user(ctx.clone())),
        Arc::new(LogoutEffect::new(ctx.clone())),
    ]
}
