//! Event emitter - the concrete publish/subscribe implementation
//!
//! Every built-in event source (the client, the handler subsystems) is an
//! `Emitter`. Subscriptions are matched by `Arc` pointer identity of the
//! callback, so one callback clone subscribes and the same clone removes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::domain::traits::{Callback, EventPayload, EventSource};

struct Subscription {
    callback: Callback,
    once: bool,
}

/// Mutex-guarded event emitter.
///
/// Callbacks run outside the lock, so a callback may subscribe, remove, or
/// emit on the same emitter without deadlocking.
#[derive(Default)]
pub struct Emitter {
    subscriptions: Mutex<HashMap<String, Vec<Subscription>>>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `event` to every current subscriber, in subscription order.
    /// One-shot subscriptions are dropped before their callback runs.
    pub fn emit(&self, event: &str, payload: &EventPayload) {
        let to_fire: Vec<Callback> = {
            let mut subscriptions = self.subscriptions.lock().unwrap();
            match subscriptions.get_mut(event) {
                Some(entries) => {
                    let callbacks = entries.iter().map(|s| s.callback.clone()).collect();
                    entries.retain(|s| !s.once);
                    if entries.is_empty() {
                        subscriptions.remove(event);
                    }
                    callbacks
                }
                None => return,
            }
        };

        for callback in to_fire {
            callback(payload);
        }
    }

    /// Number of live subscriptions for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.subscriptions
            .lock()
            .unwrap()
            .get(event)
            .map(|entries| entries.len())
            .unwrap_or(0)
    }

    fn subscribe(&self, event: &str, callback: Callback, once: bool) {
        self.subscriptions
            .lock()
            .unwrap()
            .entry(event.to_string())
            .or_default()
            .push(Subscription { callback, once });
    }
}

impl EventSource for Emitter {
    fn on(&self, event: &str, callback: Callback) {
        self.subscribe(event, callback, false);
    }

    fn once(&self, event: &str, callback: Callback) {
        self.subscribe(event, callback, true);
    }

    fn remove_listener(&self, event: &str, callback: &Callback) {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        if let Some(entries) = subscriptions.get_mut(event) {
            if let Some(pos) = entries
                .iter()
                .position(|s| Arc::ptr_eq(&s.callback, callback))
            {
                entries.remove(pos);
            }
            if entries.is_empty() {
                subscriptions.remove(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_callback(counter: Arc<AtomicUsize>) -> Callback {
        Arc::new(move |_payload| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn on_fires_every_emit() {
        let emitter = Emitter::new();
        let counter = Arc::new(AtomicUsize::new(0));
        emitter.on("tick", counting_callback(counter.clone()));

        emitter.emit("tick", &json!({}));
        emitter.emit("tick", &json!({}));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn once_fires_exactly_once() {
        let emitter = Emitter::new();
        let counter = Arc::new(AtomicUsize::new(0));
        emitter.once("tick", counting_callback(counter.clone()));

        emitter.emit("tick", &json!({}));
        emitter.emit("tick", &json!({}));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(emitter.listener_count("tick"), 0);
    }

    #[test]
    fn remove_listener_matches_pointer_identity() {
        let emitter = Emitter::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let kept = counting_callback(counter.clone());
        let removed = counting_callback(counter.clone());

        emitter.on("tick", kept);
        emitter.on("tick", removed.clone());
        assert_eq!(emitter.listener_count("tick"), 2);

        emitter.remove_listener("tick", &removed);
        assert_eq!(emitter.listener_count("tick"), 1);

        // Removing again is a no-op.
        emitter.remove_listener("tick", &removed);
        assert_eq!(emitter.listener_count("tick"), 1);

        emitter.emit("tick", &json!({}));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn callback_may_reenter_the_emitter() {
        let emitter = Arc::new(Emitter::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let inner = emitter.clone();
        let inner_counter = counter.clone();
        emitter.once("outer", Arc::new(move |_payload| {
            inner.on("inner", counting_callback(inner_counter.clone()));
        }));

        emitter.emit("outer", &json!({}));
        emitter.emit("inner", &json!({}));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn emit_without_subscribers_is_harmless() {
        let emitter = Emitter::new();
        emitter.emit("nothing", &json!({"ignored": true}));
        assert_eq!(emitter.listener_count("nothing"), 0);
    }
}
