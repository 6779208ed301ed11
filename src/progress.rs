//! Named progress indicators (spinners) held while a call is in flight.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::types::SpinnerName;

/// Receives begin/end notifications for named spinners.
///
/// Every `begin` is matched by exactly one `end` when driven through
/// [`ProgressGuard`].
pub trait ProgressTracker: Send + Sync {
    fn begin(&self, name: &SpinnerName);
    fn end(&self, name: &SpinnerName);
}

/// Holds a spinner active until dropped.
///
/// Dropping happens on success, on error, and when the owning task is
/// aborted by a newer request, so the spinner can never be left on.
#[must_use = "the spinner ends as soon as the guard is dropped"]
pub struct ProgressGuard {
    tracker: Arc<dyn ProgressTracker>,
    name: SpinnerName,
}

impl ProgressGuard {
    pub fn begin(tracker: Arc<dyn ProgressTracker>, name: SpinnerName) -> Self {
        tracker.begin(&name);
        Self { tracker, name }
    }
}

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        self.tracker.end(&self.name);
    }
}

/// In-memory spinner state with per-name reference counts.
///
/// Overlapping calls on the same name keep it active until the last one
/// finishes.
#[derive(Debug, Default)]
pub struct SpinnerRegistry {
    active: Mutex<HashMap<SpinnerName, usize>>,
}

impl SpinnerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, name: &SpinnerName) -> bool {
        self.lock().get(name).is_some_and(|count| *count > 0)
    }

    /// Names of all currently active spinners, sorted.
    pub fn active(&self) -> Vec<SpinnerName> {
        let mut names: Vec<_> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SpinnerName, usize>> {
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProgressTracker for SpinnerRegistry {
    fn begin(&self, name: &SpinnerName) {
        *self.lock().entry(name.clone()).or_insert(0) += 1;
    }

    fn end(&self, name: &SpinnerName) {
        let mut active = self.lock();
        if let Some(count) = active.get_mut(name) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                active.remove(name);
            }
        } else {
            tracing::debug!(spinner = %name, "end for spinner that was not active");
        }
    }
}
