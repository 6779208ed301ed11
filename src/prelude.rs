//! Convenience re-exports.

pub use crate::action::{ActionKind, AuthAction};
pub use crate::config::AuthFlowConfig;
pub use crate::context::{EffectContext, Navigator, Notifier, RecordingNavigator, RecordingNotifier};
pub use crate::effects::{auth_effects, Concurrency, Effect};
pub use crate::error::{AuthFlowError, Result};
pub use crate::progress::{ProgressGuard, ProgressTracker, SpinnerRegistry};
pub use crate::runtime::{Dispatcher, EffectRuntime};
pub use crate::service::{AuthApi, HttpAuthApi};
pub use crate::types::{AuthData, AuthRequest, AuthResult, SpinnerName};
