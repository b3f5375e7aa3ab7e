//! In-process event bus between the gateway and the bot
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;

/// Callback invoked synchronously for every matching event
pub type Listener = Arc<dyn Fn(Value) + Send + Sync>;

#[derive(Default)]
struct Inner {
    listeners: HashMap<String, Vec<Listener>>,
    waiters: HashMap<String, Vec<oneshot::Sender<Value>>>,
}

/// Routes named events to listeners and one-shot waiters.
///
/// Listeners run inline on the dispatching task and must not block; anything
/// long-running should be spawned.
#[derive(Default)]
pub struct EventDispatcher {
    inner: Mutex<Inner>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panicking listener never holds the lock, so poisoning is recoverable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_listener<F>(&self, event_name: &str, listener: F)
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.lock()
            .listeners
            .entry(event_name.to_string())
            .or_default()
            .push(Arc::new(listener));
    }

    pub fn listener_count(&self, event_name: &str) -> usize {
        self.lock().listeners.get(event_name).map_or(0, Vec::len)
    }

    /// Deliver `payload` to every listener and pending waiter of `event_name`.
    ///
    /// Each waiter resolves once and is then discarded.
    pub fn dispatch(&self, event_name: &str, payload: Value) {
        let (listeners, waiters) = {
            let mut inner = self.lock();
            let listeners = inner.listeners.get(event_name).cloned().unwrap_or_default();
            let waiters = inner.waiters.remove(event_name).unwrap_or_default();
            (listeners, waiters)
        };

        for listener in listeners {
            listener(payload.clone());
        }
        for waiter in waiters {
            // The waiting side may have given up.
            let _ = waiter.send(payload.clone());
        }
    }

    /// Wait for the next `event_name` dispatch.
    ///
    /// The waiter is registered when this is called, not when the returned
    /// future is first polled, so a dispatch in between is not missed. The
    /// future yields `None` if the dispatcher is dropped first.
    pub fn wait_for(&self, event_name: &str) -> impl Future<Output = Option<Value>> {
        let (tx, rx) = oneshot::channel();
        self.lock()
            .waiters
            .entry(event_name.to_string())
            .or_default()
            .push(tx);
        async move { rx.await.ok() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_listener_receives_payload() {
        let events = EventDispatcher::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        events.add_listener("READY", move |payload| sink.lock().unwrap().push(payload));

        events.dispatch("READY", json!({"v": 10}));
        events.dispatch("OTHER", json!({"v": 11}));

        assert_eq!(*seen.lock().unwrap(), vec![json!({"v": 10})]);
    }

    #[test]
    fn test_listeners_fire_every_time() {
        let events = EventDispatcher::new();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        events.add_listener("tick", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        events.dispatch("tick", Value::Null);
        events.dispatch("tick", Value::Null);
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(events.listener_count("tick"), 1);
        assert_eq!(events.listener_count("tock"), 0);
    }

    #[tokio::test]
    async fn test_wait_for_resolves_once() {
        let events = EventDispatcher::new();
        let waiter = events.wait_for("critical");

        events.dispatch("critical", json!("first"));
        events.dispatch("critical", json!("second"));

        assert_eq!(waiter.await, Some(json!("first")));
    }

    #[tokio::test]
    async fn test_wait_for_registered_before_poll() {
        let events = Arc::new(EventDispatcher::new());
        let waiter = events.wait_for("critical");
        let sender = Arc::clone(&events);
        tokio::spawn(async move { sender.dispatch("critical", json!("stop")) })
            .await
            .unwrap();
        assert_eq!(waiter.await, Some(json!("stop")));
    }

    #[tokio::test]
    async fn test_wait_for_none_when_dropped() {
        let events = EventDispatcher::new();
        let waiter = events.wait_for("critical");
        drop(events);
        assert_eq!(waiter.await, None);
    }
}
