//! Action stream and effect scheduling.
//!
//! A single dispatch loop drains the action channel, republishes every
//! action to subscribers, and starts the effects whose trigger matches.
//! Effect runs execute as spawned tasks, so a pending network call never
//! blocks unrelated actions. Follow-up actions re-enter the same channel.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot, Notify};
use tokio::task::{JoinHandle, JoinSet};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::action::AuthAction;
use crate::effects::{Concurrency, Effect};
use crate::error::AuthFlowError;

const BROADCAST_CAPACITY: usize = 256;

/// Counts queued actions plus running effect tasks so callers can wait for
/// the runtime to go quiet.
#[derive(Debug, Default)]
struct WorkTracker {
    outstanding: AtomicUsize,
    idle: Notify,
}

impl WorkTracker {
    fn begin(&self) {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
    }

    fn end(&self) {
        if self.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}

/// Decrements the tracker when a task finishes or is aborted.
struct WorkGuard(Arc<WorkTracker>);

impl WorkGuard {
    fn new(tracker: Arc<WorkTracker>) -> Self {
        tracker.begin();
        Self(tracker)
    }
}

impl Drop for WorkGuard {
    fn drop(&mut self) {
        self.0.end();
    }
}

/// The switch-to-latest run a follow-up came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Origin {
    slot: usize,
    generation: u64,
}

#[derive(Debug)]
struct Queued {
    action: AuthAction,
    origin: Option<Origin>,
}

/// Cloneable handle for putting actions on the stream.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<Queued>,
    work: Arc<WorkTracker>,
}

impl Dispatcher {
    pub fn dispatch(&self, action: AuthAction) -> Result<(), AuthFlowError> {
        self.send(action, None)
    }

    fn send(&self, action: AuthAction, origin: Option<Origin>) -> Result<(), AuthFlowError> {
        self.work.begin();
        self.tx.send(Queued { action, origin }).map_err(|err| {
            self.work.end();
            AuthFlowError::InvalidState(format!(
                "effect runtime stopped; dropped {} action",
                err.0.action.kind()
            ))
        })
    }
}

/// Per-effect scheduling state, owned by the dispatch loop.
struct EffectSlot {
    index: usize,
    effect: Arc<dyn Effect>,
    /// Bumped on every switch-to-latest trigger; a run only dispatches its
    /// follow-up if the generation it started with is still current.
    generation: Arc<AtomicU64>,
    latest: Option<JoinHandle<()>>,
    merged: JoinSet<()>,
}

impl EffectSlot {
    fn new(index: usize, effect: Arc<dyn Effect>) -> Self {
        Self {
            index,
            effect,
            generation: Arc::new(AtomicU64::new(0)),
            latest: None,
            merged: JoinSet::new(),
        }
    }

    fn start(&mut self, action: AuthAction, dispatcher: &Dispatcher) {
        let effect = self.effect.clone();
        let dispatcher = dispatcher.clone();
        let guard = WorkGuard::new(dispatcher.work.clone());

        match effect.concurrency() {
            Concurrency::SwitchToLatest => {
                let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(previous) = self.latest.take() {
                    if !previous.is_finished() {
                        tracing::debug!(effect = effect.name(), "switching to latest; aborting pending run");
                        previous.abort();
                    }
                }
                let current = self.generation.clone();
                let origin = Origin {
                    slot: self.index,
                    generation,
                };
                self.latest = Some(tokio::spawn(async move {
                    let _guard = guard;
                    let follow_up = effect.run(action).await;
                    if current.load(Ordering::SeqCst) != generation {
                        tracing::debug!(effect = effect.name(), "discarding superseded result");
                        return;
                    }
                    forward(effect.name(), follow_up, Some(origin), &dispatcher);
                }));
            }
            Concurrency::Merge => {
                // Reap finished runs so the set does not grow unbounded.
                while self.merged.try_join_next().is_some() {}
                self.merged.spawn(async move {
                    let _guard = guard;
                    let follow_up = effect.run(action).await;
                    forward(effect.name(), follow_up, None, &dispatcher);
                });
            }
        }
    }

    /// A newer trigger has started since `generation` was handed out.
    fn is_superseded(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }

    fn abort(&mut self) {
        if let Some(handle) = self.latest.take() {
            handle.abort();
        }
        self.merged.abort_all();
    }
}

impl Drop for EffectSlot {
    fn drop(&mut self) {
        self.abort();
    }
}

fn forward(
    effect: &'static str,
    follow_up: Option<AuthAction>,
    origin: Option<Origin>,
    dispatcher: &Dispatcher,
) {
    let Some(action) = follow_up else {
        return;
    };
    tracing::debug!(effect, action = %action.kind(), "effect emitted follow-up");
    if let Err(e) = dispatcher.send(action, origin) {
        tracing::debug!(effect, error = %e, "follow-up dropped");
    }
}

/// Runs a set of effects against one action stream.
///
/// # Example
/// ```no_run
/// use auth_effects::action::AuthAction;
/// use auth_effects::effects::auth_effects;
/// use auth_effects::runtime::EffectRuntime;
/// # async fn example(ctx: auth_effects::context::EffectContext) -> auth_effects::error::Result<()> {
/// let runtime = EffectRuntime::start(auth_effects(&ctx));
/// runtime.dispatch(AuthAction::ClearUser)?;
/// runtime.wait_for_idle().await;
/// runtime.shutdown().await;
/// # Ok(())
/// # }
/// ```
pub struct EffectRuntime {
    dispatcher: Dispatcher,
    events: broadcast::Sender<AuthAction>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    loop_handle: Option<JoinHandle<()>>,
}

impl EffectRuntime {
    /// Spawn the dispatch loop. Must be called inside a tokio runtime.
    pub fn start(effects: impl IntoIterator<Item = Arc<dyn Effect>>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(BROADCAST_CAPACITY);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let dispatcher = Dispatcher {
            tx,
            work: Arc::new(WorkTracker::default()),
        };
        let slots: Vec<EffectSlot> = effects
            .into_iter()
            .enumerate()
            .map(|(index, effect)| EffectSlot::new(index, effect))
            .collect();
        tracing::debug!(effects = slots.len(), "starting effect runtime");

        let loop_handle = tokio::spawn(dispatch_loop(
            rx,
            slots,
            dispatcher.clone(),
            events.clone(),
            shutdown_rx,
        ));

        Self {
            dispatcher,
            events,
            shutdown_tx: Some(shutdown_tx),
            loop_handle: Some(loop_handle),
        }
    }

    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    pub fn dispatch(&self, action: AuthAction) -> Result<(), AuthFlowError> {
        self.dispatcher.dispatch(action)
    }

    /// Receive every action the loop processes, inbound and follow-ups alike,
    /// from the moment of subscription.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthAction> {
        self.events.subscribe()
    }

    /// [`subscribe`](Self::subscribe) as a stream; lagged gaps are skipped.
    pub fn actions(&self) -> impl Stream<Item = AuthAction> + Send + 'static {
        BroadcastStream::new(self.events.subscribe()).filter_map(|item| match item {
            Ok(action) => Some(action),
            Err(e) => {
                tracing::warn!(error = %e, "action subscriber lagged");
                None
            }
        })
    }

    /// Wait until no actions are queued and no effect run is pending.
    pub async fn wait_for_idle(&self) {
        let work = &self.dispatcher.work;
        loop {
            let notified = work.idle.notified();
            if work.outstanding.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Stop the loop and abort every pending effect run.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.loop_handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "dispatch loop ended abnormally");
            }
        }
    }
}

impl Drop for EffectRuntime {
    fn drop(&mut self) {
        if let Some(handle) = self.loop_handle.take() {
            handle.abort();
        }
    }
}

async fn dispatch_loop(
    mut rx: mpsc::UnboundedReceiver<Queued>,
    mut slots: Vec<EffectSlot>,
    dispatcher: Dispatcher,
    events: broadcast::Sender<AuthAction>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = &mut shutdown_rx => break,
            received = rx.recv() => {
                let Some(Queued { action, origin }) = received else { break };
                let kind = action.kind();
                // A run can pass its own generation check just before the
                // loop starts a newer trigger; catch that here.
                if let Some(origin) = origin {
                    if slots.get(origin.slot).is_some_and(|s| s.is_superseded(origin.generation)) {
                        tracing::debug!(action = %kind, "dropping superseded follow-up");
                        dispatcher.work.end();
                        continue;
                    }
                }
                tracing::debug!(action = %kind, "action dispatched");
                // No subscribers is fine.
                let _ = events.send(action.clone());
                for slot in slots.iter_mut().filter(|s| s.effect.trigger() == kind) {
                    slot.start(action.clone(), &dispatcher);
                }
                dispatcher.work.end();
            }
        }
    }

    // Dropping the slots aborts every pending run.
    drop(slots);
    tracing::debug!("effect runtime stopped");
}
