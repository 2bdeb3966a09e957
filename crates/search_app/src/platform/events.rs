//! Typed event sources with scoped subscriptions.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;
type Listeners<E> = Mutex<BTreeMap<u64, Listener<E>>>;

struct Registry<E> {
    next_id: AtomicU64,
    listeners: Listeners<E>,
}

/// Emits events of one type to every current subscriber.
pub struct EventSource<E> {
    registry: Arc<Registry<E>>,
}

impl<E: 'static> Default for EventSource<E> {
    fn default() -> Self {
        Self {
            registry: Arc::new(Registry {
                next_id: AtomicU64::new(1),
                listeners: Mutex::new(BTreeMap::new()),
            }),
        }
    }
}

impl<E: 'static> EventSource<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` until the returned handle is dropped.
    pub fn subscribe(&self, listener: impl Fn(&E) + Send + Sync + 'static) -> Subscription {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, Arc::new(listener));

        let registry: Weak<Registry<E>> = Arc::downgrade(&self.registry);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    registry
                        .listeners
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .remove(&id);
                }
            })),
        }
    }

    /// Listeners run on a snapshot taken before the first call, so they may
    /// subscribe or unsubscribe on this source.
    pub fn emit(&self, event: &E) {
        let listeners: Vec<Listener<E>> = self
            .registry
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    #[cfg(test)]
    pub fn listener_count(&self) -> usize {
        self.registry
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

/// Removes its listener when dropped.
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn dropping_subscription_stops_delivery() {
        let source = EventSource::<u32>::new();
        let (tx, rx) = mpsc::channel();
        let subscription = source.subscribe(move |value| {
            let _ = tx.send(*value);
        });

        source.emit(&1);
        drop(subscription);
        source.emit(&2);

        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![1]);
        assert_eq!(source.listener_count(), 0);
    }

    #[test]
    fn listener_can_drop_its_own_subscription() {
        let source = EventSource::<u32>::new();
        let (tx, rx) = mpsc::channel();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let own = Arc::clone(&slot);
        let subscription = source.subscribe(move |value| {
            let _ = tx.send(*value);
            drop(own.lock().unwrap().take());
        });
        *slot.lock().unwrap() = Some(subscription);

        source.emit(&1);
        source.emit(&2);

        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![1]);
        assert_eq!(source.listener_count(), 0);
    }

    #[test]
    fn subscription_outliving_source_is_harmless() {
        let source = EventSource::<u32>::new();
        let subscription = source.subscribe(|_| {});
        drop(source);
        drop(subscription);
    }
}
