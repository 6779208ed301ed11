//! Shared test helpers: a scriptable auth backend and a started runtime.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, oneshot, Notify};

use auth_effects::action::{ActionKind, AuthAction};
use auth_effects::context::{EffectContext, RecordingNavigator, RecordingNotifier};
use auth_effects::effects::auth_effects;
use auth_effects::error::AuthFlowError;
use auth_effects::progress::SpinnerRegistry;
use auth_effects::runtime::EffectRuntime;
use auth_effects::service::AuthApi;
use auth_effects::types::AuthData;

pub type Reply = Result<(), AuthFlowError>;

enum Step {
    Now(Reply),
    After(Duration, Reply),
    Later(oneshot::Receiver<Reply>),
}

/// A backend call as seen by [`ScriptedAuthApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Register(String),
    Login(String),
    Logout,
}

/// Auth backend replaying queued replies. An empty script answers `Ok`.
#[derive(Default)]
pub struct ScriptedAuthApi {
    script: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<Call>>,
    call_made: Notify,
}

impl ScriptedAuthApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_ok(&self) {
        self.push(Step::Now(Ok(())));
    }

    pub fn respond_err(&self, status: u16, message: &str) {
        self.push(Step::Now(Err(AuthFlowError::http(status, message))));
    }

    /// Queue a reply delivered after `delay` of (possibly paused) tokio time.
    pub fn respond_after(&self, delay: Duration, reply: Reply) {
        self.push(Step::After(delay, reply));
    }

    /// Queue a reply that stays pending until the returned sender fires.
    pub fn respond_later(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.push(Step::Later(rx));
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    /// Wait until at least `count` calls have reached the backend.
    pub async fn wait_for_calls(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let notified = self.call_made.notified();
                if self.calls.lock().expect("calls lock poisoned").len() >= count {
                    return;
                }
                notified.await;
            }
        })
        .await
        .expect("backend calls did not arrive in time");
    }

    fn push(&self, step: Step) {
        self.script
            .lock()
            .expect("script lock poisoned")
            .push_back(step);
    }

    async fn answer(&self, call: Call) -> Reply {
        let step = self.script.lock().expect("script lock poisoned").pop_front();
        self.calls.lock().expect("calls lock poisoned").push(call);
        self.call_made.notify_waiters();
        match step {
            None => Ok(()),
            Some(Step::Now(reply)) => reply,
            Some(Step::After(delay, reply)) => {
                tokio::time::sleep(delay).await;
                reply
            }
            Some(Step::Later(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(AuthFlowError::http(0, "reply sender dropped"))),
        }
    }
}

#[async_trait]
impl AuthApi for ScriptedAuthApi {
    async fn register(&self, auth_data: &AuthData) -> Result<(), AuthFlowError> {
        self.answer(Call::Register(auth_data.email.clone())).await
    }

    async fn login(&self, auth_data: &AuthData) -> Result<(), AuthFlowError> {
        self.answer(Call::Login(auth_data.email.clone())).await
    }

    async fn logout(&self) -> Result<(), AuthFlowError> {
        self.answer(Call::Logout).await
    }
}

/// A started runtime wired to in-memory collaborators.
pub struct Harness {
    pub api: Arc<ScriptedAuthApi>,
    pub navigator: Arc<RecordingNavigator>,
    pub notifier: Arc<RecordingNotifier>,
    pub spinners: Arc<SpinnerRegistry>,
    pub runtime: EffectRuntime,
    pub actions: broadcast::Receiver<AuthAction>,
}

impl Harness {
    pub fn start() -> Self {
        Self::start_with(|ctx| ctx)
    }

    /// Start with a customized context (e.g. a different redirect URL).
    pub fn start_with(customize: impl FnOnce(EffectContext) -> EffectContext) -> Self {
        let api = Arc::new(ScriptedAuthApi::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let spinners = Arc::new(SpinnerRegistry::new());
        let ctx = customize(
            EffectContext::builder()
                .api(api.clone())
                .navigator(navigator.clone())
                .notifier(notifier.clone())
                .progress(spinners.clone())
                .build(),
        );
        let runtime = EffectRuntime::start(auth_effects(&ctx));
        let actions = runtime.subscribe();
        Self {
            api,
            navigator,
            notifier,
            spinners,
            runtime,
            actions,
        }
    }

    pub fn dispatch(&self, action: AuthAction) {
        self.runtime.dispatch(action).expect("runtime is running");
    }

    pub async fn settle(&self) {
        tokio::time::timeout(Duration::from_secs(5), self.runtime.wait_for_idle())
            .await
            .expect("runtime did not go idle");
    }

    /// Every action observed since the last call.
    pub fn observed(&mut self) -> Vec<AuthAction> {
        let mut seen = Vec::new();
        while let Ok(action) = self.actions.try_recv() {
            seen.push(action);
        }
        seen
    }

    pub fn observed_kinds(&mut self) -> Vec<ActionKind> {
        self.observed().iter().map(AuthAction::kind).collect()
    }
}

pub fn credentials(email: &str) -> AuthData {
    AuthData::new(email, "correct horse battery staple")
}
