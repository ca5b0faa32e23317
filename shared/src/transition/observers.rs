/// Notifications a transition machine dispatches to its observers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionEvent {
    /// The overlay started fading in.
    LoadingStarted,
    /// The scene load finished, or the local sequence reached its hold.
    LoadingCompleted,
    /// The authority released the readiness barrier for this epoch.
    AllPeersReady,
}

/// Handle returned by [`TransitionObservers::subscribe`].
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct ObserverKey(u64);

struct Observer {
    key: ObserverKey,
    event: TransitionEvent,
    callback: Box<dyn FnMut()>,
}

/// Registration list of transition observers.
///
/// Dispatch is synchronous and follows registration order.
#[derive(Default)]
pub struct TransitionObservers {
    observers: Vec<Observer>,
    next_key: u64,
}

impl TransitionObservers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F: FnMut() + 'static>(
        &mut self,
        event: TransitionEvent,
        callback: F,
    ) -> ObserverKey {
        let key = ObserverKey(self.next_key);
        self.next_key += 1;
        self.observers.push(Observer {
            key,
            event,
            callback: Box::new(callback),
        });
        key
    }

    /// Returns whether an observer was removed.
    pub fn unsubscribe(&mut self, key: &ObserverKey) -> bool {
        let before = self.observers.len();
        self.observers.retain(|observer| observer.key != *key);
        self.observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub(crate) fn dispatch(&mut self, event: TransitionEvent) {
        for observer in self
            .observers
            .iter_mut()
            .filter(|observer| observer.event == event)
        {
            (observer.callback)();
        }
    }
}
