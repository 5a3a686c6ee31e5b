//! Stage change notifications.

use std::sync::{Arc, Mutex};

use super::stage::ServiceStage;

/// Receives every stage the controller emits.
///
/// Called on the thread running the lifecycle operation; implementations
/// should hand the value off rather than block.
pub trait StageListener: Send + Sync {
    fn on_stage(&self, stage: ServiceStage);
}

impl<F> StageListener for F
where
    F: Fn(ServiceStage) + Send + Sync,
{
    fn on_stage(&self, stage: ServiceStage) {
        self(stage)
    }
}

/// Holds at most one listener. Registering replaces the current one.
#[derive(Default)]
pub(crate) struct ListenerSlot {
    listener: Mutex<Option<Arc<dyn StageListener>>>,
}

impl ListenerSlot {
    pub(crate) fn set(&self, listener: Option<Arc<dyn StageListener>>) {
        let mut slot = self.listener.lock().unwrap_or_else(|e| e.into_inner());
        *slot = listener;
    }

    pub(crate) fn get(&self) -> Option<Arc<dyn StageListener>> {
        self.listener
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Deliver `stage` to the listener, if any. Dropped otherwise.
    pub(crate) fn emit(&self, stage: ServiceStage) {
        // Clone out so the listener runs without the lock held.
        if let Some(listener) = self.get() {
            listener.on_stage(stage);
        }
    }
}
