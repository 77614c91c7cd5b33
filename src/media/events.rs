//! Observer registry used by media elements to fan out notifications.
//!
//! Each subscriber gets its own channel. The registry is shared between the
//! element (which adds and removes observers) and whatever produces events,
//! typically the audio thread.

use std::sync::mpsc::{self, Receiver, Sender, TryIter};
use std::sync::{Arc, Mutex, MutexGuard};

use super::types::{MediaEvent, MediaEventKind, SubscriptionId};

struct Observer {
    id: SubscriptionId,
    kind: MediaEventKind,
    tx: Sender<MediaEvent>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    observers: Vec<Observer>,
}

/// Shared, cloneable set of observers.
#[derive(Clone, Default)]
pub struct Observers {
    inner: Arc<Mutex<Registry>>,
}

/// Receiving end of one registration.
pub struct Subscription {
    id: SubscriptionId,
    rx: Receiver<MediaEvent>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Drain everything delivered so far without blocking.
    pub fn pending(&self) -> TryIter<'_, MediaEvent> {
        self.rx.try_iter()
    }
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking emitter must not silence everyone else.
    fn registry(&self) -> MutexGuard<'_, Registry> {
        match self.inner.lock() {
            Ok(r) => r,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn subscribe(&self, kind: MediaEventKind) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let mut reg = self.registry();
        reg.next_id += 1;
        let id = SubscriptionId(reg.next_id);
        reg.observers.push(Observer { id, kind, tx });
        Subscription { id, rx }
    }

    /// Remove an observer. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.registry().observers.retain(|o| o.id != id);
    }

    /// Deliver `event` to every observer of its kind.
    ///
    /// Observers whose receiver was dropped are pruned.
    pub fn emit(&self, event: MediaEvent) {
        let kind = event.kind();
        self.registry()
            .observers
            .retain(|o| o.kind != kind || o.tx.send(event).is_ok());
    }

    pub fn len(&self) -> usize {
        self.registry().observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
