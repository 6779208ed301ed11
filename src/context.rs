//! Collaborators handed to the effects at composition time.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{AuthFlowConfig, DEFAULT_LOGOUT_MESSAGE, DEFAULT_REDIRECT_URL};
use crate::error::AuthFlowError;
use crate::progress::ProgressTracker;
use crate::service::AuthApi;

/// Router seam used by the navigation effects.
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn navigate_by_url(&self, url: &str) -> Result<(), AuthFlowError>;
}

/// Toast seam used by the logout effect.
pub trait Notifier: Send + Sync {
    /// Show an informational toast.
    fn info(&self, message: &str);
}

/// Everything an effect may touch, passed explicitly instead of injected.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use auth_effects::config::AuthFlowConfig;
/// use auth_effects::context::{EffectContext, RecordingNavigator, RecordingNotifier};
/// use auth_effects::progress::SpinnerRegistry;
/// use auth_effects::service::HttpAuthApi;
///
/// let config = AuthFlowConfig::default();
/// let ctx = EffectContext::builder()
///     .api(Arc::new(HttpAuthApi::new(&config)?))
///     .navigator(Arc::new(RecordingNavigator::new()))
///     .notifier(Arc::new(RecordingNotifier::new()))
///     .progress(Arc::new(SpinnerRegistry::new()))
///     .build()
///     .with_config(&config);
/// # Ok::<(), auth_effects::error::AuthFlowError>(())
/// ```
#[derive(Clone, Builder)]
pub struct EffectContext {
    pub api: Arc<dyn AuthApi>,
    pub navigator: Arc<dyn Navigator>,
    pub notifier: Arc<dyn Notifier>,
    pub progress: Arc<dyn ProgressTracker>,
    #[builder(into, default = DEFAULT_REDIRECT_URL.to_string())]
    pub redirect_url: String,
    #[builder(into, default = DEFAULT_LOGOUT_MESSAGE.to_string())]
    pub logout_message: String,
}

impl EffectContext {
    /// Take redirect target and logout text from a loaded config.
    pub fn with_config(mut self, config: &AuthFlowConfig) -> Self {
        self.redirect_url = config.redirect_url.clone();
        self.logout_message = config.logout_message.clone();
        self
    }
}

impl fmt::Debug for EffectContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectContext")
            .field("redirect_url", &self.redirect_url)
            .field("logout_message", &self.logout_message)
            .finish_non_exhaustive()
    }
}

/// Navigator that records every requested URL. Suited to headless hosts.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<String> {
        lock(&self.visited).clone()
    }

    pub fn current(&self) -> Option<String> {
        lock(&self.visited).last().cloned()
    }
}

#[async_trait]
impl Navigator for RecordingNavigator {
    async fn navigate_by_url(&self, url: &str) -> Result<(), AuthFlowError> {
        lock(&self.visited).push(url.to_string());
        Ok(())
    }
}

/// A notification captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub shown_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        lock(&self.shown).clone()
    }

    pub fn messages(&self) -> Vec<String> {
        lock(&self.shown).iter().map(|n| n.message.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn info(&self, message: &str) {
        tracing::debug!(text = message, "notification");
        lock(&self.shown).push(Notification {
            message: message.to_string(),
            shown_at: Utc::now(),
        });
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
