use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RefreshEvent {
    Favorites,
    Blacklist,
}

pub type RefreshCallback = Arc<dyn Fn(RefreshEvent) + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Subscription list for refresh signals. Clones share the same list.
#[derive(Clone, Default)]
pub struct Notifier {
    next_id: Arc<AtomicU64>,
    subscribers: Arc<Mutex<Vec<(SubscriptionId, RefreshCallback)>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, callback: RefreshCallback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, callback));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    /// Calls every subscriber on the current thread. A panicking subscriber is
    /// logged and skipped.
    pub fn notify(&self, event: RefreshEvent) {
        let subscribers: Vec<RefreshCallback> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in subscribers {
            if catch_unwind(AssertUnwindSafe(|| callback(event))).is_err() {
                warn!(?event, "refresh subscriber panicked");
            }
        }
    }
}
