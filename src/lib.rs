//! auth-effects — authentication flow effects
//!
//! Bridges UI actions to the auth backend: a `Login` or `Register` action
//! becomes an HTTP call whose outcome is mapped to a success or failure
//! action, success actions trigger navigation, and logout shows a
//! notification. Collaborators (backend, router, toasts, spinners) are
//! passed in explicitly through an [`EffectContext`](context::EffectContext).
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use auth_effects::prelude::*;
//!
//! # async fn example() -> auth_effects::error::Result<()> {
//! let config = AuthFlowConfig::load()?;
//! let navigator = Arc::new(RecordingNavigator::new());
//! let ctx = EffectContext::builder()
//!     .api(Arc::new(HttpAuthApi::new(&config)?))
//!     .navigator(navigator.clone())
//!     .notifier(Arc::new(RecordingNotifier::new()))
//!     .progress(Arc::new(SpinnerRegistry::new()))
//!     .build()
//!     .with_config(&config);
//!
//! let runtime = EffectRuntime::start(auth_effects(&ctx));
//! runtime.dispatch(AuthAction::login(AuthData::new("jo@example.com", "secret"), "login"))?;
//! runtime.wait_for_idle().await;
//! println!("now at {:?}", navigator.current());
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod config;
pub mod context;
pub mod effects;
pub mod error;
pub mod prelude;
pub mod progress;
pub mod runtime;
pub mod service;
pub mod types;
